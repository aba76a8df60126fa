use std::io;
use std::path::Path;
use std::time::Duration;

use crate::domain::StoragePath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub path: StoragePath,
    pub size: u64,
}

#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Objects directly under `prefix`, sorted by key.
    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<StoredObject>, ObjectStorageError>;

    /// Streams the object to `dest`, returning the number of bytes written.
    async fn download_to(
        &self,
        bucket: &str,
        path: &StoragePath,
        dest: &Path,
    ) -> Result<u64, ObjectStorageError>;

    async fn upload_file(
        &self,
        bucket: &str,
        path: &StoragePath,
        source: &Path,
        content_type: &str,
    ) -> Result<u64, ObjectStorageError>;

    async fn delete(&self, bucket: &str, path: &StoragePath) -> Result<(), ObjectStorageError>;

    async fn signed_url(
        &self,
        bucket: &str,
        path: &StoragePath,
        expires_in: Duration,
    ) -> Result<String, ObjectStorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ObjectStorageError {
    #[error("list failed: {0}")]
    ListFailed(String),
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("signing failed: {0}")]
    SigningFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
