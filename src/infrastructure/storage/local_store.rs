use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use object_store::local::LocalFileSystem;

use crate::application::ports::{ObjectStorage, ObjectStorageError, StoredObject};
use crate::domain::StoragePath;

use super::object_store_ops;

/// Buckets are top-level folders under `base_path`. Signed URLs point at the
/// configured public base URL, which is expected to serve that folder.
pub struct LocalObjectStorage {
    inner: Arc<LocalFileSystem>,
    public_base_url: String,
}

impl LocalObjectStorage {
    pub fn new(base_path: PathBuf, public_base_url: String) -> Result<Self, ObjectStorageError> {
        std::fs::create_dir_all(&base_path).map_err(ObjectStorageError::Io)?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| ObjectStorageError::UploadFailed(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
            public_base_url,
        })
    }
}

#[async_trait::async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<StoredObject>, ObjectStorageError> {
        object_store_ops::list(self.inner.as_ref(), Some(bucket), prefix).await
    }

    async fn download_to(
        &self,
        bucket: &str,
        path: &StoragePath,
        dest: &Path,
    ) -> Result<u64, ObjectStorageError> {
        let location = object_store_ops::store_path(Some(bucket), path.as_str());
        object_store_ops::download_to(self.inner.as_ref(), &location, dest).await
    }

    async fn upload_file(
        &self,
        bucket: &str,
        path: &StoragePath,
        source: &Path,
        _content_type: &str,
    ) -> Result<u64, ObjectStorageError> {
        let location = object_store_ops::store_path(Some(bucket), path.as_str());
        object_store_ops::upload_file(self.inner.as_ref(), &location, source, None).await
    }

    async fn delete(&self, bucket: &str, path: &StoragePath) -> Result<(), ObjectStorageError> {
        let location = object_store_ops::store_path(Some(bucket), path.as_str());
        object_store_ops::delete(self.inner.as_ref(), &location).await
    }

    async fn signed_url(
        &self,
        bucket: &str,
        path: &StoragePath,
        expires_in: Duration,
    ) -> Result<String, ObjectStorageError> {
        let expires_at = Utc::now().timestamp() + expires_in.as_secs() as i64;
        Ok(format!(
            "{}/{}/{}?expires={}",
            self.public_base_url.trim_end_matches('/'),
            bucket,
            path.as_str(),
            expires_at
        ))
    }
}
