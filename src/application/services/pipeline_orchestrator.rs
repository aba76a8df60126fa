use std::sync::Arc;

use tracing::Instrument;

use crate::application::ports::{
    DocumentRepository, JobRepository, ObjectStorage, SessionRepository, TranscriptStatus,
    TranscriptionProvider,
};
use crate::domain::{JobId, PipelineStage, SessionId, SessionRecord, TrackingId};

use super::stages::{
    AudioConcatenation, AudioPublication, ChunkRetrieval, DocumentGeneration, Finalizer,
    RunContext, StageFlow, StageTable, TranscriptionSubmission,
};
use super::{FaultInjector, LlmClientRegistry, PipelineError, PipelineOptions, TimeoutSupervisor};

/// Ports the orchestrator drives.
#[derive(Clone)]
pub struct PipelineDependencies {
    pub jobs: Arc<dyn JobRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub documents: Arc<dyn DocumentRepository>,
    pub storage: Arc<dyn ObjectStorage>,
    pub transcription: Arc<dyn TranscriptionProvider>,
    pub llm: LlmClientRegistry,
}

/// How a run or resume ended. Errors never escape the orchestrator; they are
/// recorded on the job and reported here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Suspended(TrackingId),
    Completed,
    Failed(String),
    /// The job was finalized by someone else (timeout, recovery) mid-run.
    Superseded,
}

pub struct PipelineOrchestrator {
    jobs: Arc<dyn JobRepository>,
    sessions: Arc<dyn SessionRepository>,
    transcription: Arc<dyn TranscriptionProvider>,
    stages: StageTable,
    finalizer: Finalizer,
    timeouts: TimeoutSupervisor,
}

impl PipelineOrchestrator {
    pub fn new(
        deps: PipelineDependencies,
        options: &PipelineOptions,
    ) -> Result<Self, PipelineError> {
        let stages = StageTable {
            retrieval: ChunkRetrieval::new(
                Arc::clone(&deps.storage),
                options.temp_dir.clone(),
                options.merged_file_name.clone(),
            ),
            concatenation: AudioConcatenation::new(options.merged_file_name.clone()),
            publication: AudioPublication::new(
                Arc::clone(&deps.storage),
                Arc::clone(&deps.sessions),
                options.merged_file_name.clone(),
            ),
            submission: TranscriptionSubmission::new(
                Arc::clone(&deps.storage),
                Arc::clone(&deps.transcription),
                Arc::clone(&deps.jobs),
                options.signed_url_expiry,
                options.callback_url()?,
            ),
            generation: DocumentGeneration::new(
                Arc::clone(&deps.documents),
                Arc::clone(&deps.jobs),
                deps.llm.clone(),
                options.document_timeout,
            ),
        };

        Ok(Self {
            finalizer: Finalizer::new(
                Arc::clone(&deps.storage),
                Arc::clone(&deps.jobs),
                options.merged_file_name.clone(),
            ),
            timeouts: TimeoutSupervisor::new(Arc::clone(&deps.jobs), options.pre_webhook_timeout),
            jobs: deps.jobs,
            sessions: deps.sessions,
            transcription: deps.transcription,
            stages,
        })
    }

    /// Runs a freshly created job from the entry point implied by the
    /// session's checkpoints.
    pub async fn run(
        &self,
        job_id: JobId,
        session_id: &SessionId,
        faults: &dyn FaultInjector,
    ) -> RunOutcome {
        let span = tracing::info_span!(
            "pipeline_job",
            job_id = %job_id,
            session_id = %session_id,
        );
        self.run_inner(job_id, session_id, faults)
            .instrument(span)
            .await
    }

    /// Continues a suspended job after the transcription provider called back.
    pub async fn resume(
        &self,
        job_id: JobId,
        session_id: &SessionId,
        tracking_id: &TrackingId,
        reported: TranscriptStatus,
        faults: &dyn FaultInjector,
    ) -> RunOutcome {
        let span = tracing::info_span!(
            "pipeline_resume",
            job_id = %job_id,
            session_id = %session_id,
            tracking_id = %tracking_id,
        );
        self.resume_inner(job_id, session_id, tracking_id, reported, faults)
            .instrument(span)
            .await
    }

    async fn run_inner(
        &self,
        job_id: JobId,
        session_id: &SessionId,
        faults: &dyn FaultInjector,
    ) -> RunOutcome {
        let session = match self.load_session(session_id).await {
            Ok(session) => session,
            Err(e) => return self.settle(job_id, Err(e)).await,
        };

        let entry = entry_stage(&session);
        tracing::info!(
            entry = %entry,
            has_merged_audio = session.merged_audio_path.is_some(),
            has_transcript = session.has_transcript(),
            "Pipeline started"
        );

        let deadline = (entry == PipelineStage::Downloading).then(|| self.timeouts.arm(job_id));
        let mut ctx = RunContext::new(job_id, session, deadline);

        let result = self.drive(&mut ctx, entry, faults).await;
        let result = self.finish(&ctx, result).await;
        ctx.cleanup();
        self.settle(job_id, result).await
    }

    async fn resume_inner(
        &self,
        job_id: JobId,
        session_id: &SessionId,
        tracking_id: &TrackingId,
        reported: TranscriptStatus,
        faults: &dyn FaultInjector,
    ) -> RunOutcome {
        let session = match self.load_session(session_id).await {
            Ok(session) => session,
            Err(e) => return self.settle(job_id, Err(e)).await,
        };
        let mut ctx = RunContext::new(job_id, session, None);

        let result = match self.accept_transcript(&mut ctx, tracking_id, reported).await {
            Ok(()) => self.drive(&mut ctx, PipelineStage::GeneratingDocs, faults).await,
            Err(e) => Err(e),
        };
        let result = self.finish(&ctx, result).await;
        ctx.cleanup();
        self.settle(job_id, result).await
    }

    async fn accept_transcript(
        &self,
        ctx: &mut RunContext,
        tracking_id: &TrackingId,
        reported: TranscriptStatus,
    ) -> Result<(), PipelineError> {
        let transcript = self.transcription.fetch(tracking_id).await?;

        if reported == TranscriptStatus::Error || transcript.status == TranscriptStatus::Error {
            let detail = transcript
                .error
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(PipelineError::ProviderReportedError(detail));
        }
        if transcript.status != TranscriptStatus::Completed {
            return Err(PipelineError::TranscriptNotReady(
                transcript.status.as_str().to_string(),
            ));
        }

        let text = transcript
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or(PipelineError::EmptyTranscript)?;

        self.sessions
            .set_raw_transcript(&ctx.session.id, &text)
            .await?;
        tracing::info!(chars = text.len(), "Transcript saved");
        ctx.session.raw_transcript = Some(text);
        Ok(())
    }

    async fn drive(
        &self,
        ctx: &mut RunContext,
        entry: PipelineStage,
        faults: &dyn FaultInjector,
    ) -> Result<StageFlow, PipelineError> {
        for stage in PipelineStage::sequence_from(entry) {
            if let Some(status) = stage.job_status() {
                if !self.jobs.advance(ctx.job_id, status).await? {
                    return Err(PipelineError::Superseded(ctx.job_id));
                }
                tracing::debug!(status = %status, "Job status transition");
            }
            if let Some(limit) = ctx.deadline_fired() {
                return Err(PipelineError::Aborted(limit));
            }
            faults.check(ctx.job_id, stage)?;

            tracing::debug!(stage = %stage, "Stage started");
            if self.stages.handler(stage).execute(ctx).await? == StageFlow::Suspend {
                return Ok(StageFlow::Suspend);
            }
        }
        Ok(StageFlow::Continue)
    }

    async fn finish(
        &self,
        ctx: &RunContext,
        result: Result<StageFlow, PipelineError>,
    ) -> Result<RunOutcome, PipelineError> {
        match result? {
            StageFlow::Suspend => ctx
                .tracking_id
                .clone()
                .map(RunOutcome::Suspended)
                .ok_or(PipelineError::MissingArtifact("tracking id")),
            StageFlow::Continue => {
                self.finalizer.finalize(ctx).await?;
                Ok(RunOutcome::Completed)
            }
        }
    }

    async fn settle(&self, job_id: JobId, result: Result<RunOutcome, PipelineError>) -> RunOutcome {
        match result {
            Ok(outcome) => outcome,
            Err(PipelineError::Superseded(_)) => {
                tracing::info!("Job finalized elsewhere, stopping run");
                RunOutcome::Superseded
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!(error = %message, "Pipeline failed");
                self.mark_failed(job_id, &message).await;
                RunOutcome::Failed(message)
            }
        }
    }

    /// Records `message` on the job unless it is already terminal.
    pub async fn mark_failed(&self, job_id: JobId, message: &str) {
        match self.jobs.fail(job_id, message).await {
            Ok(true) => {}
            Ok(false) => tracing::debug!(job_id = %job_id, "Job already terminal, failure not recorded"),
            Err(e) => tracing::error!(job_id = %job_id, error = %e, "Failed to mark job as failed"),
        }
    }

    async fn load_session(&self, session_id: &SessionId) -> Result<SessionRecord, PipelineError> {
        self.sessions
            .get(session_id)
            .await?
            .ok_or_else(|| PipelineError::SessionNotFound(session_id.to_string()))
    }
}

/// Picks where a run starts from the checkpoints already on the session.
pub fn entry_stage(session: &SessionRecord) -> PipelineStage {
    if session.has_transcript() {
        PipelineStage::GeneratingDocs
    } else if session.merged_audio_path.is_some() {
        PipelineStage::Transcribing
    } else {
        PipelineStage::Downloading
    }
}
