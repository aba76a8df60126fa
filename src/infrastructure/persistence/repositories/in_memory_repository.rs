use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::application::ports::{
    DocumentRepository, JobRepository, RepositoryError, SessionRepository,
};
use crate::domain::{
    Document, DocumentTemplate, Job, JobId, JobStatus, SessionId, SessionRecord, SessionStatus,
    StoragePath, TrackingId,
};

/// Job store kept in insertion order, with the same guards as the SQL one.
#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: RwLock<Vec<Job>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn update_where<F>(&self, id: JobId, guard: F, apply: impl FnOnce(&mut Job)) -> bool
    where
        F: FnOnce(&Job) -> bool,
    {
        let mut jobs = self.jobs.write().await;
        match jobs.iter_mut().find(|j| j.id == id) {
            Some(job) if guard(job) => {
                apply(job);
                job.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }
}

#[async_trait::async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, job: &Job) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        if jobs.iter().any(|j| j.id == job.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "duplicate job id {}",
                job.id
            )));
        }
        jobs.push(job.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.jobs.read().await.iter().find(|j| j.id == id).cloned())
    }

    async fn find_by_tracking_id(
        &self,
        tracking_id: &TrackingId,
    ) -> Result<Option<Job>, RepositoryError> {
        Ok(self
            .jobs
            .read()
            .await
            .iter()
            .rev()
            .find(|j| j.tracking_id.as_ref() == Some(tracking_id))
            .cloned())
    }

    async fn latest_for_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<Job>, RepositoryError> {
        Ok(self
            .jobs
            .read()
            .await
            .iter()
            .rev()
            .find(|j| &j.session_id == session_id)
            .cloned())
    }

    async fn list_active(&self) -> Result<Vec<Job>, RepositoryError> {
        Ok(self
            .jobs
            .read()
            .await
            .iter()
            .filter(|j| j.is_active())
            .cloned()
            .collect())
    }

    async fn advance(&self, id: JobId, status: JobStatus) -> Result<bool, RepositoryError> {
        Ok(self
            .update_where(
                id,
                |job| job.status.can_transition_to(status),
                |job| job.status = status,
            )
            .await)
    }

    async fn fail(&self, id: JobId, error_message: &str) -> Result<bool, RepositoryError> {
        Ok(self
            .update_where(
                id,
                |job| job.is_active(),
                |job| {
                    job.status = JobStatus::Failed;
                    job.error_message = Some(error_message.to_string());
                },
            )
            .await)
    }

    async fn complete(
        &self,
        id: JobId,
        completed_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .update_where(
                id,
                |job| job.status.can_transition_to(JobStatus::Completed),
                |job| {
                    job.status = JobStatus::Completed;
                    job.completed_at = Some(completed_at);
                },
            )
            .await)
    }

    async fn set_tracking_id(
        &self,
        id: JobId,
        tracking_id: &TrackingId,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .update_where(
                id,
                |job| job.status == JobStatus::Transcribing,
                |job| job.tracking_id = Some(tracking_id.clone()),
            )
            .await)
    }

    async fn set_error_message(
        &self,
        id: JobId,
        error_message: &str,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .update_where(
                id,
                |job| job.is_active(),
                |job| job.error_message = Some(error_message.to_string()),
            )
            .await)
    }
}

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<Vec<SessionRecord>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn with_session<T>(
        &self,
        id: &SessionId,
        apply: impl FnOnce(&mut SessionRecord) -> T,
    ) -> Result<T, RepositoryError> {
        let mut sessions = self.sessions.write().await;
        sessions
            .iter_mut()
            .find(|s| &s.id == id)
            .map(apply)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }
}

#[async_trait::async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: &SessionRecord) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.write().await;
        if sessions.iter().any(|s| s.id == session.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "duplicate session id {}",
                session.id
            )));
        }
        sessions.push(session.clone());
        Ok(())
    }

    async fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError> {
        Ok(self
            .sessions
            .read()
            .await
            .iter()
            .find(|s| &s.id == id)
            .cloned())
    }

    async fn set_merged_audio_path(
        &self,
        id: &SessionId,
        path: &StoragePath,
    ) -> Result<(), RepositoryError> {
        self.with_session(id, |s| s.merged_audio_path = Some(path.clone()))
            .await
    }

    async fn set_raw_transcript(
        &self,
        id: &SessionId,
        transcript: &str,
    ) -> Result<(), RepositoryError> {
        self.with_session(id, |s| s.raw_transcript = Some(transcript.to_string()))
            .await
    }

    async fn reset_to_synced(&self, ids: &[SessionId]) -> Result<u64, RepositoryError> {
        let mut sessions = self.sessions.write().await;
        let mut changed = 0;
        for session in sessions
            .iter_mut()
            .filter(|s| ids.contains(&s.id) && s.status != SessionStatus::Completed)
        {
            session.status = SessionStatus::Synced;
            changed += 1;
        }
        Ok(changed)
    }
}

#[derive(Default)]
pub struct InMemoryDocumentRepository {
    templates: RwLock<Vec<DocumentTemplate>>,
    documents: RwLock<Vec<Document>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn list_templates(&self) -> Result<Vec<DocumentTemplate>, RepositoryError> {
        Ok(self.templates.read().await.clone())
    }

    async fn create_template(&self, template: &DocumentTemplate) -> Result<(), RepositoryError> {
        self.templates.write().await.push(template.clone());
        Ok(())
    }

    async fn insert_document(&self, document: &Document) -> Result<(), RepositoryError> {
        self.documents.write().await.push(document.clone());
        Ok(())
    }

    async fn list_documents(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<Document>, RepositoryError> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .filter(|d| &d.session_id == session_id)
            .cloned()
            .collect())
    }
}
