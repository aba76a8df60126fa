use std::path::Path;
use std::time::Duration;

use object_store::memory::InMemory;

use crate::application::ports::{ObjectStorage, ObjectStorageError, StoredObject};
use crate::domain::StoragePath;

use super::object_store_ops;

/// Process-local storage for tests and scaffolding.
#[derive(Default)]
pub struct InMemoryObjectStorage {
    inner: InMemory,
}

impl InMemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_bytes(
        &self,
        bucket: &str,
        path: &StoragePath,
        data: Vec<u8>,
    ) -> Result<(), ObjectStorageError> {
        use object_store::ObjectStore;

        let location = object_store_ops::store_path(Some(bucket), path.as_str());
        self.inner
            .put(&location, data.into())
            .await
            .map_err(|e| ObjectStorageError::UploadFailed(e.to_string()))?;
        Ok(())
    }

    pub async fn get_bytes(
        &self,
        bucket: &str,
        path: &StoragePath,
    ) -> Result<Vec<u8>, ObjectStorageError> {
        use object_store::ObjectStore;

        let location = object_store_ops::store_path(Some(bucket), path.as_str());
        let result = self
            .inner
            .get(&location)
            .await
            .map_err(|e| ObjectStorageError::NotFound(e.to_string()))?;
        let bytes = result
            .bytes()
            .await
            .map_err(|e| ObjectStorageError::DownloadFailed(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<StoredObject>, ObjectStorageError> {
        object_store_ops::list(&self.inner, Some(bucket), prefix).await
    }

    async fn download_to(
        &self,
        bucket: &str,
        path: &StoragePath,
        dest: &Path,
    ) -> Result<u64, ObjectStorageError> {
        let location = object_store_ops::store_path(Some(bucket), path.as_str());
        object_store_ops::download_to(&self.inner, &location, dest).await
    }

    async fn upload_file(
        &self,
        bucket: &str,
        path: &StoragePath,
        source: &Path,
        content_type: &str,
    ) -> Result<u64, ObjectStorageError> {
        let location = object_store_ops::store_path(Some(bucket), path.as_str());
        object_store_ops::upload_file(&self.inner, &location, source, Some(content_type)).await
    }

    async fn delete(&self, bucket: &str, path: &StoragePath) -> Result<(), ObjectStorageError> {
        let location = object_store_ops::store_path(Some(bucket), path.as_str());
        object_store_ops::delete(&self.inner, &location).await
    }

    async fn signed_url(
        &self,
        bucket: &str,
        path: &StoragePath,
        expires_in: Duration,
    ) -> Result<String, ObjectStorageError> {
        Ok(format!(
            "memory://{}/{}?expires_in={}",
            bucket,
            path.as_str(),
            expires_in.as_secs()
        ))
    }
}
