use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::Method;
use object_store::azure::{MicrosoftAzure, MicrosoftAzureBuilder};
use object_store::signer::Signer;

use crate::application::ports::{ObjectStorage, ObjectStorageError, StoredObject};
use crate::domain::StoragePath;

use super::object_store_ops;

/// Azure Blob storage where each bucket is a container of the account.
pub struct AzureObjectStorage {
    account: String,
    access_key: String,
    containers: Mutex<HashMap<String, Arc<MicrosoftAzure>>>,
}

impl AzureObjectStorage {
    pub fn new(account: &str, access_key: &str) -> Self {
        Self {
            account: account.to_string(),
            access_key: access_key.to_string(),
            containers: Mutex::new(HashMap::new()),
        }
    }

    fn container(&self, bucket: &str) -> Result<Arc<MicrosoftAzure>, ObjectStorageError> {
        let mut containers = self
            .containers
            .lock()
            .map_err(|e| ObjectStorageError::ListFailed(e.to_string()))?;
        if let Some(store) = containers.get(bucket) {
            return Ok(Arc::clone(store));
        }

        let store = MicrosoftAzureBuilder::new()
            .with_account(&self.account)
            .with_access_key(&self.access_key)
            .with_container_name(bucket)
            .build()
            .map_err(|e| ObjectStorageError::ListFailed(e.to_string()))?;
        let store = Arc::new(store);
        containers.insert(bucket.to_string(), Arc::clone(&store));
        Ok(store)
    }
}

#[async_trait::async_trait]
impl ObjectStorage for AzureObjectStorage {
    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<StoredObject>, ObjectStorageError> {
        let store = self.container(bucket)?;
        object_store_ops::list(store.as_ref(), None, prefix).await
    }

    async fn download_to(
        &self,
        bucket: &str,
        path: &StoragePath,
        dest: &Path,
    ) -> Result<u64, ObjectStorageError> {
        let store = self.container(bucket)?;
        let location = object_store_ops::store_path(None, path.as_str());
        object_store_ops::download_to(store.as_ref(), &location, dest).await
    }

    async fn upload_file(
        &self,
        bucket: &str,
        path: &StoragePath,
        source: &Path,
        content_type: &str,
    ) -> Result<u64, ObjectStorageError> {
        let store = self.container(bucket)?;
        let location = object_store_ops::store_path(None, path.as_str());
        object_store_ops::upload_file(store.as_ref(), &location, source, Some(content_type)).await
    }

    async fn delete(&self, bucket: &str, path: &StoragePath) -> Result<(), ObjectStorageError> {
        let store = self.container(bucket)?;
        let location = object_store_ops::store_path(None, path.as_str());
        object_store_ops::delete(store.as_ref(), &location).await
    }

    async fn signed_url(
        &self,
        bucket: &str,
        path: &StoragePath,
        expires_in: Duration,
    ) -> Result<String, ObjectStorageError> {
        let store = self.container(bucket)?;
        let location = object_store_ops::store_path(None, path.as_str());
        let url = store
            .signed_url(Method::GET, &location, expires_in)
            .await
            .map_err(|e| ObjectStorageError::SigningFailed(e.to_string()))?;
        Ok(url.to_string())
    }
}
