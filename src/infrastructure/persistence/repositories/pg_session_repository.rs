use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{RepositoryError, SessionRepository};
use crate::domain::{SessionId, SessionRecord, SessionStatus, StorageLocation, StoragePath};

pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn session_from_row(row: &PgRow) -> Result<SessionRecord, RepositoryError> {
    let get_err = |e: sqlx::Error| RepositoryError::QueryFailed(e.to_string());

    let id: String = row.try_get("id").map_err(get_err)?;
    let bucket: String = row.try_get("storage_bucket").map_err(get_err)?;
    let prefix: String = row.try_get("storage_prefix").map_err(get_err)?;
    let chunk_count: i32 = row.try_get("chunk_count").map_err(get_err)?;
    let merged: Option<String> = row.try_get("full_audio_path").map_err(get_err)?;
    let status: String = row.try_get("status").map_err(get_err)?;

    Ok(SessionRecord {
        id: SessionId::new(id),
        location: StorageLocation::new(bucket, prefix),
        expected_chunks: u32::try_from(chunk_count).unwrap_or(0),
        merged_audio_path: merged.map(StoragePath::from_raw),
        raw_transcript: row.try_get("raw_transcript").map_err(get_err)?,
        status: SessionStatus::parse(&status),
        created_at: row.try_get("created_at").map_err(get_err)?,
    })
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    #[instrument(skip(self, session), fields(session_id = %session.id))]
    async fn create(&self, session: &SessionRecord) -> Result<(), RepositoryError> {
        let chunk_count = i32::try_from(session.expected_chunks)
            .map_err(|e| RepositoryError::ConstraintViolation(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO sessions (id, storage_bucket, storage_prefix, chunk_count, full_audio_path, raw_transcript, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(session.id.as_str())
        .bind(&session.location.bucket)
        .bind(&session.location.prefix)
        .bind(chunk_count)
        .bind(session.merged_audio_path.as_ref().map(|p| p.as_str()))
        .bind(session.raw_transcript.as_deref())
        .bind(session.status.as_str())
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(session_id = %id))]
    async fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, storage_bucket, storage_prefix, chunk_count, full_audio_path, raw_transcript, status, created_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(session_from_row).transpose()
    }

    #[instrument(skip(self), fields(session_id = %id, path = %path))]
    async fn set_merged_audio_path(
        &self,
        id: &SessionId,
        path: &StoragePath,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE sessions SET full_audio_path = $1 WHERE id = $2")
            .bind(path.as_str())
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self, transcript), fields(session_id = %id, chars = transcript.len()))]
    async fn set_raw_transcript(
        &self,
        id: &SessionId,
        transcript: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE sessions SET raw_transcript = $1 WHERE id = $2")
            .bind(transcript)
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn reset_to_synced(&self, ids: &[SessionId]) -> Result<u64, RepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();

        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET status = $1
            WHERE id = ANY($2) AND status <> $3
            "#,
        )
        .bind(SessionStatus::Synced.as_str())
        .bind(ids)
        .bind(SessionStatus::Completed.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
