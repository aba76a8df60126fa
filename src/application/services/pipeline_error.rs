use crate::application::ports::{
    ObjectStorageError, RepositoryError, TranscriptionError,
};
use crate::domain::{JobId, PipelineStage, WavHeaderError};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("storage: {0}")]
    Storage(#[from] ObjectStorageError),
    #[error("transcription: {0}")]
    Transcription(#[from] TranscriptionError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("No audio chunks found under {0}")]
    NoChunks(String),
    #[error("Invalid WAV header in {file}: {source}")]
    InvalidWavHeader {
        file: String,
        #[source]
        source: WavHeaderError,
    },
    #[error("No usable audio chunks to concatenate")]
    NoUsableChunks,
    #[error("invalid callback URL {0}")]
    InvalidCallbackUrl(String),
    #[error("missing artifact: {0}")]
    MissingArtifact(&'static str),
    #[error("[FAULT INJECTION] Simulated failure at stage: {0}")]
    InjectedFault(PipelineStage),
    #[error("Pipeline timeout: pre-webhook stages exceeded {0}s")]
    TimedOut(u64),
    #[error("Pipeline aborted: timeout exceeded ({0}s)")]
    Aborted(u64),
    #[error("AssemblyAI transcription failed: {0}")]
    ProviderReportedError(String),
    #[error("AssemblyAI transcription completed but returned empty text")]
    EmptyTranscript,
    #[error("AssemblyAI transcript not finished: {0}")]
    TranscriptNotReady(String),
    #[error("No document templates configured")]
    NoTemplates,
    #[error("{0}")]
    DocumentGeneration(String),
    #[error("job {0} was finalized elsewhere")]
    Superseded(JobId),
}
