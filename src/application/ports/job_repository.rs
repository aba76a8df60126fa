use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Job, JobId, JobStatus, SessionId, TrackingId};

use super::RepositoryError;

/// Persistence for processing jobs.
///
/// Every mutating method is guarded: it only writes when the stored job is in
/// a state that allows the change, and returns `false` when the guard rejected
/// the write. Callers treat `false` as "someone else already finalized this job".
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &Job) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;

    async fn find_by_tracking_id(
        &self,
        tracking_id: &TrackingId,
    ) -> Result<Option<Job>, RepositoryError>;

    async fn latest_for_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<Job>, RepositoryError>;

    async fn list_active(&self) -> Result<Vec<Job>, RepositoryError>;

    /// Moves the job to `status` if it currently sits in one of
    /// `status.predecessors()`.
    async fn advance(&self, id: JobId, status: JobStatus) -> Result<bool, RepositoryError>;

    async fn fail(&self, id: JobId, error_message: &str) -> Result<bool, RepositoryError>;

    /// Marks the job completed, preserving any partial-failure summary already
    /// stored in the error field.
    async fn complete(&self, id: JobId, completed_at: DateTime<Utc>)
    -> Result<bool, RepositoryError>;

    async fn set_tracking_id(
        &self,
        id: JobId,
        tracking_id: &TrackingId,
    ) -> Result<bool, RepositoryError>;

    async fn set_error_message(
        &self,
        id: JobId,
        error_message: &str,
    ) -> Result<bool, RepositoryError>;
}
