mod ai_provider;
mod document;
mod job;
mod job_status;
mod pipeline_stage;
mod session;
mod storage_path;
mod wav_header;

pub use ai_provider::AiProvider;
pub use document::{Document, DocumentId, DocumentTemplate, TemplateId};
pub use job::{Job, JobId, TrackingId};
pub use job_status::JobStatus;
pub use pipeline_stage::PipelineStage;
pub use session::{SessionId, SessionRecord, SessionStatus, StorageLocation};
pub use storage_path::StoragePath;
pub use wav_header::{WAV_HEADER_LEN, WavHeader, WavHeaderError};
