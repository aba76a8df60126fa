use std::path::Path;

use futures::StreamExt;
use object_store::path::Path as StorePath;
use object_store::{
    Attribute, Attributes, MultipartUpload, ObjectStore, PutMultipartOpts, PutPayload,
};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};

use crate::application::ports::{ObjectStorageError, StoredObject};
use crate::domain::StoragePath;

const PART_SIZE: usize = 8 * 1024 * 1024;

/// Location of `key` inside a store, optionally nested under a root folder.
pub(super) fn store_path(root: Option<&str>, key: &str) -> StorePath {
    match root {
        Some(root) => StorePath::from(format!("{}/{}", root, key.trim_start_matches('/'))),
        None => StorePath::from(key),
    }
}

pub(super) async fn list(
    store: &dyn ObjectStore,
    root: Option<&str>,
    prefix: &str,
) -> Result<Vec<StoredObject>, ObjectStorageError> {
    let prefix_path = store_path(root, prefix.trim_end_matches('/'));
    let listing = match store.list_with_delimiter(Some(&prefix_path)).await {
        Ok(listing) => listing,
        Err(object_store::Error::NotFound { .. }) => return Ok(Vec::new()),
        Err(e) => return Err(ObjectStorageError::ListFailed(e.to_string())),
    };

    let strip = root.map(|r| format!("{}/", r));
    let mut objects: Vec<StoredObject> = listing
        .objects
        .into_iter()
        .map(|meta| {
            let full = meta.location.as_ref();
            let key = strip
                .as_deref()
                .and_then(|s| full.strip_prefix(s))
                .unwrap_or(full);
            StoredObject {
                path: StoragePath::from_raw(key),
                size: meta.size,
            }
        })
        .collect();
    objects.sort_by(|a, b| a.path.as_str().cmp(b.path.as_str()));
    Ok(objects)
}

pub(super) async fn download_to(
    store: &dyn ObjectStore,
    location: &StorePath,
    dest: &Path,
) -> Result<u64, ObjectStorageError> {
    let result = store.get(location).await.map_err(|e| match e {
        object_store::Error::NotFound { .. } => ObjectStorageError::NotFound(location.to_string()),
        other => ObjectStorageError::DownloadFailed(other.to_string()),
    })?;

    let mut writer = BufWriter::new(File::create(dest).await?);
    let mut stream = result.into_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk.map_err(|e| ObjectStorageError::DownloadFailed(e.to_string()))?;
        writer.write_all(&bytes).await?;
        written += bytes.len() as u64;
    }
    writer.flush().await?;
    Ok(written)
}

pub(super) async fn upload_file(
    store: &dyn ObjectStore,
    location: &StorePath,
    source: &Path,
    content_type: Option<&str>,
) -> Result<u64, ObjectStorageError> {
    let mut attributes = Attributes::new();
    if let Some(content_type) = content_type {
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
    }
    let opts = PutMultipartOpts {
        attributes,
        ..Default::default()
    };

    let mut file = File::open(source).await?;
    let mut upload = store
        .put_multipart_opts(location, opts)
        .await
        .map_err(|e| ObjectStorageError::UploadFailed(e.to_string()))?;

    let mut total_bytes: u64 = 0;
    loop {
        let part = match read_part(&mut file).await {
            Ok(part) => part,
            Err(e) => {
                let _ = upload.abort().await;
                return Err(ObjectStorageError::Io(e));
            }
        };
        if part.is_empty() {
            break;
        }
        total_bytes += part.len() as u64;
        if let Err(e) = upload.put_part(PutPayload::from(part)).await {
            let _ = upload.abort().await;
            return Err(ObjectStorageError::UploadFailed(e.to_string()));
        }
    }

    upload
        .complete()
        .await
        .map_err(|e| ObjectStorageError::UploadFailed(e.to_string()))?;

    Ok(total_bytes)
}

pub(super) async fn delete(
    store: &dyn ObjectStore,
    location: &StorePath,
) -> Result<(), ObjectStorageError> {
    store
        .delete(location)
        .await
        .map_err(|e| ObjectStorageError::DeleteFailed(e.to_string()))
}

async fn read_part(file: &mut File) -> std::io::Result<Vec<u8>> {
    let mut buf = vec![0u8; PART_SIZE];
    let mut filled = 0;
    while filled < PART_SIZE {
        let n = file.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    buf.truncate(filled);
    Ok(buf)
}
