mod error_response;
mod health;
mod job_status;
mod process_session;
mod transcription_webhook;

pub use error_response::{ErrorResponse, error_response};
pub use health::health_handler;
pub use job_status::{DocumentResponse, JobStatusResponse, job_status_handler};
pub use process_session::{ProcessRequest, ProcessResponse, process_session_handler};
pub use transcription_webhook::{WebhookAck, transcription_webhook_handler};
