use std::sync::Arc;

use crate::application::ports::{JobRepository, RepositoryError, TranscriptStatus};
use crate::domain::{JobId, JobStatus, TrackingId};

use super::{PipelineMessage, PipelineQueue, QueueError};

/// Callback payload posted by the transcription provider.
#[derive(Debug, Clone, Default)]
pub struct TranscriptionCallback {
    pub transcript_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Unauthorized,
    MissingTranscriptId,
    Ignored { reason: String },
    Unmatched,
    AlreadyProcessed { job_id: JobId, status: JobStatus },
    Accepted { job_id: JobId },
}

/// Validates provider callbacks and hands matching suspended jobs to the worker.
pub struct TranscriptionWebhookService {
    jobs: Arc<dyn JobRepository>,
    queue: PipelineQueue,
    expected_token: String,
}

impl TranscriptionWebhookService {
    pub fn new(jobs: Arc<dyn JobRepository>, queue: PipelineQueue, expected_token: String) -> Self {
        Self {
            jobs,
            queue,
            expected_token,
        }
    }

    #[tracing::instrument(skip_all, fields(transcript_id = ?callback.transcript_id, status = ?callback.status))]
    pub async fn handle(
        &self,
        token: Option<&str>,
        callback: TranscriptionCallback,
    ) -> Result<WebhookOutcome, WebhookError> {
        if !self.token_matches(token) {
            tracing::warn!("Invalid or missing webhook token");
            return Ok(WebhookOutcome::Unauthorized);
        }

        let Some(transcript_id) = callback.transcript_id.filter(|id| !id.is_empty()) else {
            tracing::warn!("Missing transcript_id in payload");
            return Ok(WebhookOutcome::MissingTranscriptId);
        };

        let status_text = callback.status.unwrap_or_default();
        let status = match TranscriptStatus::parse(&status_text) {
            Some(s @ (TranscriptStatus::Completed | TranscriptStatus::Error)) => s,
            _ => {
                tracing::warn!(status = %status_text, "Unexpected status, ignoring webhook");
                return Ok(WebhookOutcome::Ignored {
                    reason: format!("unexpected status: {}", status_text),
                });
            }
        };

        let tracking_id = TrackingId::new(transcript_id);
        let Some(job) = self.jobs.find_by_tracking_id(&tracking_id).await? else {
            tracing::warn!(tracking_id = %tracking_id, "No job found for transcript");
            return Ok(WebhookOutcome::Unmatched);
        };

        if job.status != JobStatus::Transcribing {
            tracing::info!(job_id = %job.id, status = %job.status, "Duplicate webhook ignored");
            return Ok(WebhookOutcome::AlreadyProcessed {
                job_id: job.id,
                status: job.status,
            });
        }

        self.queue
            .enqueue(PipelineMessage::Resume {
                job_id: job.id,
                session_id: job.session_id.clone(),
                tracking_id,
                status,
            })
            .await?;

        tracing::info!(job_id = %job.id, "Resume dispatched");
        Ok(WebhookOutcome::Accepted { job_id: job.id })
    }

    fn token_matches(&self, token: Option<&str>) -> bool {
        match token {
            Some(token) if !self.expected_token.is_empty() => {
                constant_time_eq(token.as_bytes(), self.expected_token.as_bytes())
            }
            _ => false,
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("queue: {0}")]
    Queue(#[from] QueueError),
}
