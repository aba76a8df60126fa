mod audio_concatenation;
mod audio_publication;
mod chunk_retrieval;
mod document_generation;
mod finalization;
mod transcription_submission;

use std::path::PathBuf;

use async_trait::async_trait;
use tempfile::TempDir;

use crate::domain::{JobId, PipelineStage, SessionRecord, TrackingId};

use super::PipelineError;
use super::timeout_supervisor::TimeoutGuard;

pub use audio_concatenation::{AudioConcatenation, concatenate_wav};
pub use audio_publication::AudioPublication;
pub use chunk_retrieval::ChunkRetrieval;
pub use document_generation::DocumentGeneration;
pub use finalization::Finalizer;
pub use transcription_submission::TranscriptionSubmission;

/// What the orchestrator should do once a stage returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageFlow {
    Continue,
    Suspend,
}

/// Mutable state threaded through the stages of a single run.
pub struct RunContext {
    pub job_id: JobId,
    pub session: SessionRecord,
    pub workspace: Option<TempDir>,
    pub chunk_paths: Vec<PathBuf>,
    pub merged_audio: Option<PathBuf>,
    pub tracking_id: Option<TrackingId>,
    pub deadline: Option<TimeoutGuard>,
}

impl RunContext {
    pub fn new(job_id: JobId, session: SessionRecord, deadline: Option<TimeoutGuard>) -> Self {
        Self {
            job_id,
            session,
            workspace: None,
            chunk_paths: Vec::new(),
            merged_audio: None,
            tracking_id: None,
            deadline,
        }
    }

    pub fn deadline_fired(&self) -> Option<u64> {
        self.deadline
            .as_ref()
            .filter(|d| d.has_fired())
            .map(|d| d.limit_secs())
    }

    /// Removes the local workspace. Failures are logged and ignored.
    pub fn cleanup(&mut self) {
        self.chunk_paths.clear();
        self.merged_audio = None;
        if let Some(dir) = self.workspace.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove workspace");
            } else {
                tracing::debug!(path = %path.display(), "Workspace removed");
            }
        }
    }
}

#[async_trait]
pub trait StageHandler: Send + Sync {
    async fn execute(&self, ctx: &mut RunContext) -> Result<StageFlow, PipelineError>;
}

/// Fixed mapping from stage tag to its handler.
pub struct StageTable {
    pub retrieval: ChunkRetrieval,
    pub concatenation: AudioConcatenation,
    pub publication: AudioPublication,
    pub submission: TranscriptionSubmission,
    pub generation: DocumentGeneration,
}

impl StageTable {
    pub fn handler(&self, stage: PipelineStage) -> &dyn StageHandler {
        match stage {
            PipelineStage::Downloading => &self.retrieval,
            PipelineStage::Concatenating => &self.concatenation,
            PipelineStage::Uploading => &self.publication,
            PipelineStage::Transcribing => &self.submission,
            PipelineStage::GeneratingDocs => &self.generation,
        }
    }
}
