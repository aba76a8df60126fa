use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::application::services::{ProcessingError, StartOutcome};
use crate::domain::{PipelineStage, SessionId};
use crate::presentation::state::AppState;

use super::error_response;

#[derive(Debug, Default, Deserialize)]
pub struct ProcessRequest {
    /// Forces the named stage to fail for this run.
    pub fail_at_stage: Option<PipelineStage>,
}

#[derive(Serialize)]
pub struct ProcessResponse {
    pub job_id: String,
    pub status: String,
}

#[derive(Serialize)]
pub struct SessionNotReadyResponse {
    pub error: String,
    pub current_status: String,
}

#[tracing::instrument(skip(state, body))]
pub async fn process_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Option<Json<ProcessRequest>>,
) -> impl IntoResponse {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let session_id = SessionId::new(session_id);

    match state
        .processing_service
        .start_processing(&session_id, request.fail_at_stage)
        .await
    {
        Ok(StartOutcome::Created(job)) => (
            StatusCode::ACCEPTED,
            Json(ProcessResponse {
                job_id: job.id.to_string(),
                status: job.status.to_string(),
            }),
        )
            .into_response(),
        Ok(StartOutcome::Existing(job)) => (
            StatusCode::OK,
            Json(ProcessResponse {
                job_id: job.id.to_string(),
                status: job.status.to_string(),
            }),
        )
            .into_response(),
        Err(ProcessingError::SessionNotFound(id)) => {
            error_response(StatusCode::NOT_FOUND, format!("Session not found: {}", id))
        }
        Err(ProcessingError::SessionNotReady(current_status)) => (
            StatusCode::CONFLICT,
            Json(SessionNotReadyResponse {
                error: "Session is not ready for processing".to_string(),
                current_status,
            }),
        )
            .into_response(),
        Err(ProcessingError::Dispatch(e)) => {
            tracing::error!(error = %e, "Failed to dispatch pipeline job");
            error_response(StatusCode::SERVICE_UNAVAILABLE, "Pipeline unavailable")
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to start processing");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to start processing: {}", e),
            )
        }
    }
}
