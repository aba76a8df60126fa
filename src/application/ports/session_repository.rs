use async_trait::async_trait;

use crate::domain::{SessionId, SessionRecord, StoragePath};

use super::RepositoryError;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &SessionRecord) -> Result<(), RepositoryError>;

    async fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError>;

    async fn set_merged_audio_path(
        &self,
        id: &SessionId,
        path: &StoragePath,
    ) -> Result<(), RepositoryError>;

    async fn set_raw_transcript(
        &self,
        id: &SessionId,
        transcript: &str,
    ) -> Result<(), RepositoryError>;

    /// Resets the given sessions to `synced` unless they are already
    /// `completed`. Returns the number of sessions changed.
    async fn reset_to_synced(&self, ids: &[SessionId]) -> Result<u64, RepositoryError>;
}
