use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::application::services::{TranscriptionCallback, WebhookError, WebhookOutcome};
use crate::presentation::state::AppState;

use super::error_response;

#[derive(Debug, Deserialize)]
pub struct WebhookQuery {
    pub token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WebhookPayload {
    transcript_id: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_processed: Option<bool>,
}

/// The body is parsed only after the token is checked so that an
/// unauthenticated caller always gets 401.
#[tracing::instrument(skip_all)]
pub async fn transcription_webhook_handler(
    State(state): State<AppState>,
    Query(query): Query<WebhookQuery>,
    body: Bytes,
) -> impl IntoResponse {
    let payload: WebhookPayload = serde_json::from_slice(&body).unwrap_or_default();
    let callback = TranscriptionCallback {
        transcript_id: payload.transcript_id,
        status: payload.status,
    };

    let received = WebhookAck {
        received: true,
        ..Default::default()
    };

    match state
        .webhook_service
        .handle(query.token.as_deref(), callback)
        .await
    {
        Ok(WebhookOutcome::Unauthorized) => error_response(StatusCode::UNAUTHORIZED, "Unauthorized"),
        Ok(WebhookOutcome::MissingTranscriptId) => {
            error_response(StatusCode::BAD_REQUEST, "Missing transcript_id")
        }
        Ok(WebhookOutcome::Ignored { reason }) => (
            StatusCode::OK,
            Json(WebhookAck {
                ignored: Some(true),
                reason: Some(reason),
                ..received
            }),
        )
            .into_response(),
        Ok(WebhookOutcome::Unmatched) => (
            StatusCode::OK,
            Json(WebhookAck {
                matched: Some(false),
                ..received
            }),
        )
            .into_response(),
        Ok(WebhookOutcome::AlreadyProcessed { .. }) => (
            StatusCode::OK,
            Json(WebhookAck {
                already_processed: Some(true),
                ..received
            }),
        )
            .into_response(),
        Ok(WebhookOutcome::Accepted { .. }) => (StatusCode::OK, Json(received)).into_response(),
        Err(WebhookError::Queue(e)) => {
            tracing::error!(error = %e, "Failed to hand off resume");
            error_response(StatusCode::SERVICE_UNAVAILABLE, "Pipeline unavailable")
        }
        Err(WebhookError::Repository(e)) => {
            tracing::error!(error = %e, "Job lookup failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Job lookup failed")
        }
    }
}
