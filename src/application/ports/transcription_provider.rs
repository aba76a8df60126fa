use async_trait::async_trait;

use crate::domain::TrackingId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

impl TranscriptStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(TranscriptStatus::Queued),
            "processing" => Some(TranscriptStatus::Processing),
            "completed" => Some(TranscriptStatus::Completed),
            "error" => Some(TranscriptStatus::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptStatus::Queued => "queued",
            TranscriptStatus::Processing => "processing",
            TranscriptStatus::Completed => "completed",
            TranscriptStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderTranscript {
    pub status: TranscriptStatus,
    pub text: Option<String>,
    pub error: Option<String>,
}

/// Asynchronous speech-to-text service that reports completion via webhook.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    async fn submit(
        &self,
        audio_url: &str,
        webhook_url: &str,
    ) -> Result<TrackingId, TranscriptionError>;

    async fn fetch(&self, tracking_id: &TrackingId)
    -> Result<ProviderTranscript, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
