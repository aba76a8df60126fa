use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{Job, JobId, JobStatus, SessionId, TrackingId};

const JOB_COLUMNS: &str =
    "id, session_id, status, error_message, tracking_id, created_at, updated_at, completed_at";

pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn status_names(statuses: &[JobStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

fn job_from_row(row: &PgRow) -> Result<Job, RepositoryError> {
    let get_err = |e: sqlx::Error| RepositoryError::QueryFailed(e.to_string());

    let status: String = row.try_get("status").map_err(get_err)?;
    let status = status
        .parse::<JobStatus>()
        .map_err(RepositoryError::QueryFailed)?;
    let session_id: String = row.try_get("session_id").map_err(get_err)?;
    let tracking_id: Option<String> = row.try_get("tracking_id").map_err(get_err)?;

    Ok(Job {
        id: JobId::from_uuid(row.try_get("id").map_err(get_err)?),
        session_id: SessionId::new(session_id),
        status,
        error_message: row.try_get("error_message").map_err(get_err)?,
        tracking_id: tracking_id.map(TrackingId::new),
        created_at: row.try_get("created_at").map_err(get_err)?,
        updated_at: row.try_get("updated_at").map_err(get_err)?,
        completed_at: row.try_get("completed_at").map_err(get_err)?,
    })
}

#[async_trait]
impl JobRepository for PgJobRepository {
    #[instrument(skip(self, job), fields(job_id = %job.id.as_uuid()))]
    async fn create(&self, job: &Job) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO jobs (id, session_id, status, error_message, tracking_id, created_at, updated_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(job.session_id.as_str())
        .bind(job.status.as_str())
        .bind(job.error_message.as_deref())
        .bind(job.tracking_id.as_ref().map(|t| t.as_str()))
        .bind(job.created_at)
        .bind(job.updated_at)
        .bind(job.completed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(job_id = %id.as_uuid()))]
    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(job_from_row).transpose()
    }

    #[instrument(skip(self), fields(tracking_id = %tracking_id))]
    async fn find_by_tracking_id(
        &self,
        tracking_id: &TrackingId,
    ) -> Result<Option<Job>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM jobs WHERE tracking_id = $1 ORDER BY created_at DESC LIMIT 1",
            JOB_COLUMNS
        ))
        .bind(tracking_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(job_from_row).transpose()
    }

    #[instrument(skip(self), fields(session_id = %session_id))]
    async fn latest_for_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<Job>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM jobs WHERE session_id = $1 ORDER BY created_at DESC LIMIT 1",
            JOB_COLUMNS
        ))
        .bind(session_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(job_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn list_active(&self) -> Result<Vec<Job>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM jobs WHERE status = ANY($1) ORDER BY created_at ASC",
            JOB_COLUMNS
        ))
        .bind(status_names(&JobStatus::ACTIVE))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.iter().map(job_from_row).collect()
    }

    #[instrument(skip(self), fields(job_id = %id.as_uuid(), status = %status))]
    async fn advance(&self, id: JobId, status: JobStatus) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = $1, updated_at = $2
            WHERE id = $3 AND status = ANY($4)
            "#,
        )
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id.as_uuid())
        .bind(status_names(&status.predecessors()))
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, error_message), fields(job_id = %id.as_uuid()))]
    async fn fail(&self, id: JobId, error_message: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = $1, error_message = $2, updated_at = $3
            WHERE id = $4 AND status = ANY($5)
            "#,
        )
        .bind(JobStatus::Failed.as_str())
        .bind(error_message)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .bind(status_names(&JobStatus::ACTIVE))
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(job_id = %id.as_uuid()))]
    async fn complete(
        &self,
        id: JobId,
        completed_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = $1, completed_at = $2, updated_at = $2
            WHERE id = $3 AND status = ANY($4)
            "#,
        )
        .bind(JobStatus::Completed.as_str())
        .bind(completed_at)
        .bind(id.as_uuid())
        .bind(status_names(&JobStatus::Completed.predecessors()))
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(job_id = %id.as_uuid(), tracking_id = %tracking_id))]
    async fn set_tracking_id(
        &self,
        id: JobId,
        tracking_id: &TrackingId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET tracking_id = $1, updated_at = $2
            WHERE id = $3 AND status = $4
            "#,
        )
        .bind(tracking_id.as_str())
        .bind(Utc::now())
        .bind(id.as_uuid())
        .bind(JobStatus::Transcribing.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, error_message), fields(job_id = %id.as_uuid()))]
    async fn set_error_message(
        &self,
        id: JobId,
        error_message: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET error_message = $1, updated_at = $2
            WHERE id = $3 AND status = ANY($4)
            "#,
        )
        .bind(error_message)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .bind(status_names(&JobStatus::ACTIVE))
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
