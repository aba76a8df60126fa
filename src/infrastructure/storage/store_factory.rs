use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{ObjectStorage, ObjectStorageError};
use crate::presentation::config::{StorageProviderSetting, StorageSettings};

use super::azure_store::AzureObjectStorage;
use super::local_store::LocalObjectStorage;

pub struct ObjectStorageFactory;

impl ObjectStorageFactory {
    pub fn create(settings: &StorageSettings) -> Result<Arc<dyn ObjectStorage>, ObjectStorageError> {
        match settings.provider {
            StorageProviderSetting::Local => {
                let path = PathBuf::from(&settings.local_path);
                let store = LocalObjectStorage::new(path, settings.public_base_url.clone())?;
                Ok(Arc::new(store))
            }
            StorageProviderSetting::Azure => {
                let account = settings.azure_account.as_deref().ok_or_else(|| {
                    ObjectStorageError::UploadFailed("azure_account required".into())
                })?;
                let key = settings.azure_access_key.as_deref().ok_or_else(|| {
                    ObjectStorageError::UploadFailed("azure_access_key required".into())
                })?;
                Ok(Arc::new(AzureObjectStorage::new(account, key)))
            }
        }
    }
}
