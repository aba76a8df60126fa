mod document_repository;
mod job_repository;
mod llm_client;
mod object_storage;
mod repository_error;
mod session_repository;
mod transcription_provider;

pub use document_repository::DocumentRepository;
pub use job_repository::JobRepository;
pub use llm_client::{LlmClient, LlmClientError};
pub use object_storage::{ObjectStorage, ObjectStorageError, StoredObject};
pub use repository_error::RepositoryError;
pub use session_repository::SessionRepository;
pub use transcription_provider::{
    ProviderTranscript, TranscriptStatus, TranscriptionError, TranscriptionProvider,
};
