use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    ProviderTranscript, TranscriptStatus, TranscriptionError, TranscriptionProvider,
};
use crate::domain::TrackingId;
use crate::infrastructure::observability::redact_secrets;

pub struct AssemblyAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    language_code: String,
}

impl AssemblyAiClient {
    pub fn new(api_key: String, base_url: Option<String>, language_code: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| "https://api.assemblyai.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            language_code,
        }
    }
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    audio_url: &'a str,
    language_code: &'a str,
    webhook_url: &'a str,
}

#[derive(Deserialize)]
struct TranscriptResponse {
    id: Option<String>,
    status: String,
    text: Option<String>,
    error: Option<String>,
}

async fn error_body(response: reqwest::Response) -> TranscriptionError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    TranscriptionError::ApiRequestFailed(format!("status {}: {}", status, body))
}

#[async_trait]
impl TranscriptionProvider for AssemblyAiClient {
    async fn submit(
        &self,
        audio_url: &str,
        webhook_url: &str,
    ) -> Result<TrackingId, TranscriptionError> {
        let url = format!("{}/v2/transcript", self.base_url);

        tracing::debug!(
            audio_url = %redact_secrets(audio_url),
            webhook_url = %redact_secrets(webhook_url),
            language_code = %self.language_code,
            "Submitting transcription to AssemblyAI"
        );

        let response = self
            .client
            .post(&url)
            .header("authorization", &self.api_key)
            .json(&SubmitRequest {
                audio_url,
                language_code: &self.language_code,
                webhook_url,
            })
            .send()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_body(response).await);
        }

        let body: TranscriptResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::InvalidResponse(format!("body: {}", e)))?;

        let id = body
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| TranscriptionError::InvalidResponse("no transcript id".to_string()))?;

        tracing::info!(transcript_id = %id, status = %body.status, "AssemblyAI submission accepted");
        Ok(TrackingId::new(id))
    }

    async fn fetch(
        &self,
        tracking_id: &TrackingId,
    ) -> Result<ProviderTranscript, TranscriptionError> {
        let url = format!("{}/v2/transcript/{}", self.base_url, tracking_id);

        let response = self
            .client
            .get(&url)
            .header("authorization", &self.api_key)
            .send()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_body(response).await);
        }

        let body: TranscriptResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::InvalidResponse(format!("body: {}", e)))?;

        let status = TranscriptStatus::parse(&body.status).ok_or_else(|| {
            TranscriptionError::InvalidResponse(format!("unknown status: {}", body.status))
        })?;

        tracing::info!(
            transcript_id = %tracking_id,
            status = %body.status,
            chars = body.text.as_deref().map_or(0, str::len),
            "AssemblyAI transcript fetched"
        );

        Ok(ProviderTranscript {
            status,
            text: body.text,
            error: body.error,
        })
    }
}
