use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use uuid::Uuid;

use crate::application::services::{JobReport, ProcessingError};
use crate::domain::{Document, JobId};
use crate::presentation::state::AppState;

use super::error_response;

#[derive(Serialize)]
pub struct DocumentResponse {
    pub id: String,
    pub template_id: String,
    pub title: String,
    pub text: String,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id.as_uuid().to_string(),
            template_id: doc.template_id.as_uuid().to_string(),
            title: doc.title,
            text: doc.text,
        }
    }
}

#[derive(Serialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub session_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<DocumentResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents_error: Option<String>,
}

impl From<JobReport> for JobStatusResponse {
    fn from(report: JobReport) -> Self {
        let job = report.job;
        Self {
            job_id: job.id.to_string(),
            session_id: job.session_id.to_string(),
            status: job.status.to_string(),
            error: job.error_message,
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
            completed_at: job.completed_at.map(|t| t.to_rfc3339()),
            documents: report
                .documents
                .map(|docs| docs.into_iter().map(DocumentResponse::from).collect()),
            documents_error: report.documents_error,
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn job_status_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    let Ok(uuid) = Uuid::parse_str(&job_id) else {
        return error_response(StatusCode::BAD_REQUEST, format!("Invalid job ID: {}", job_id));
    };

    match state
        .processing_service
        .job_report(JobId::from_uuid(uuid))
        .await
    {
        Ok(report) => (StatusCode::OK, Json(JobStatusResponse::from(report))).into_response(),
        Err(ProcessingError::JobNotFound(_)) => {
            error_response(StatusCode::NOT_FOUND, format!("Job not found: {}", job_id))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch job status");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to fetch job: {}", e),
            )
        }
    }
}
