use std::sync::Arc;

use crate::application::ports::{DocumentRepository, JobRepository, RepositoryError, SessionRepository};
use crate::domain::{Document, Job, JobId, JobStatus, PipelineStage, SessionId, SessionStatus};

use super::{PipelineMessage, PipelineQueue};

#[derive(Debug)]
pub enum StartOutcome {
    Created(Job),
    Existing(Job),
}

#[derive(Debug)]
pub struct JobReport {
    pub job: Job,
    pub documents: Option<Vec<Document>>,
    pub documents_error: Option<String>,
}

/// Entry point for clients: starts processing for a session and reports on jobs.
pub struct ProcessingService {
    jobs: Arc<dyn JobRepository>,
    sessions: Arc<dyn SessionRepository>,
    documents: Arc<dyn DocumentRepository>,
    queue: PipelineQueue,
}

impl ProcessingService {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        sessions: Arc<dyn SessionRepository>,
        documents: Arc<dyn DocumentRepository>,
        queue: PipelineQueue,
    ) -> Self {
        Self {
            jobs,
            sessions,
            documents,
            queue,
        }
    }

    #[tracing::instrument(skip(self), fields(session_id = %session_id))]
    pub async fn start_processing(
        &self,
        session_id: &SessionId,
        fail_at_stage: Option<PipelineStage>,
    ) -> Result<StartOutcome, ProcessingError> {
        let session = self
            .sessions
            .get(session_id)
            .await?
            .ok_or_else(|| ProcessingError::SessionNotFound(session_id.to_string()))?;

        if session.status != SessionStatus::Synced {
            return Err(ProcessingError::SessionNotReady(session.status.to_string()));
        }

        if let Some(latest) = self.jobs.latest_for_session(session_id).await? {
            if latest.is_active() || latest.status == JobStatus::Completed {
                tracing::info!(job_id = %latest.id, status = %latest.status, "Reusing existing job");
                return Ok(StartOutcome::Existing(latest));
            }
        }

        let job = Job::new(session_id.clone());
        self.jobs.create(&job).await?;

        if let Some(stage) = fail_at_stage {
            tracing::warn!(stage = %stage, "Fault injection requested");
        }

        let message = PipelineMessage::Run {
            job_id: job.id,
            session_id: session_id.clone(),
            fail_at_stage,
        };
        if let Err(e) = self.queue.enqueue(message).await {
            let reason = format!("Internal: failed to dispatch pipeline: {}", e);
            if let Err(fail_err) = self.jobs.fail(job.id, &reason).await {
                tracing::error!(job_id = %job.id, error = %fail_err, "Failed to mark undispatched job");
            }
            return Err(ProcessingError::Dispatch(e.to_string()));
        }

        tracing::info!(job_id = %job.id, "Job created and dispatched");
        Ok(StartOutcome::Created(job))
    }

    #[tracing::instrument(skip(self), fields(job_id = %job_id))]
    pub async fn job_report(&self, job_id: JobId) -> Result<JobReport, ProcessingError> {
        let job = self
            .jobs
            .get_by_id(job_id)
            .await?
            .ok_or_else(|| ProcessingError::JobNotFound(job_id.to_string()))?;

        let mut report = JobReport {
            job,
            documents: None,
            documents_error: None,
        };
        if report.job.status == JobStatus::Completed {
            match self.documents.list_documents(&report.job.session_id).await {
                Ok(mut docs) => {
                    docs.sort_by(|a, b| a.title.cmp(&b.title));
                    report.documents = Some(docs);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to fetch documents");
                    report.documents_error = Some(e.to_string());
                }
            }
        }
        Ok(report)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("session is not ready for processing: {0}")]
    SessionNotReady(String),
    #[error("job not found: {0}")]
    JobNotFound(String),
    #[error("dispatch failed: {0}")]
    Dispatch(String),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
