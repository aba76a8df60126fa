use std::time::Duration;

use tempfile::TempDir;

use scribe_pipeline::application::ports::{ObjectStorage, ObjectStorageError};
use scribe_pipeline::domain::{StorageLocation, StoragePath};
use scribe_pipeline::infrastructure::storage::{InMemoryObjectStorage, LocalObjectStorage};

const BUCKET: &str = "recordings";

fn create_local_store() -> (TempDir, LocalObjectStorage) {
    let dir = TempDir::new().unwrap();
    let store = LocalObjectStorage::new(
        dir.path().join("storage"),
        "http://localhost:3000/storage/".to_string(),
    )
    .unwrap();
    (dir, store)
}

async fn upload(store: &dyn ObjectStorage, dir: &TempDir, path: &StoragePath, data: &[u8]) -> u64 {
    let source = dir.path().join("upload.bin");
    tokio::fs::write(&source, data).await.unwrap();
    store
        .upload_file(BUCKET, path, &source, "audio/wav")
        .await
        .unwrap()
}

#[tokio::test]
async fn given_uploaded_file_when_downloading_then_bytes_match_original() {
    let (dir, store) = create_local_store();
    let path = StoragePath::new("sessions/s-1", "full.wav");

    let size = upload(&store, &dir, &path, b"riff-bytes").await;
    let dest = dir.path().join("copy.wav");
    let written = store.download_to(BUCKET, &path, &dest).await.unwrap();

    assert_eq!(size, 10);
    assert_eq!(written, 10);
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"riff-bytes");
}

#[tokio::test]
async fn given_objects_under_prefix_when_listing_then_keys_are_sorted_and_bucket_relative() {
    let (dir, store) = create_local_store();
    let location = StorageLocation::new(BUCKET, "sessions/s-2");
    for name in ["chunk_002.wav", "chunk_001.wav", "chunk_003.wav"] {
        upload(&store, &dir, &location.object(name), name.as_bytes()).await;
    }
    upload(&store, &dir, &StoragePath::new("sessions/other", "x.wav"), b"x").await;

    let objects = store.list(BUCKET, &location.prefix).await.unwrap();

    let keys: Vec<_> = objects.iter().map(|o| o.path.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "sessions/s-2/chunk_001.wav",
            "sessions/s-2/chunk_002.wav",
            "sessions/s-2/chunk_003.wav"
        ]
    );
    assert_eq!(objects[0].size, 13);
}

#[tokio::test]
async fn given_deleted_object_when_downloading_then_not_found_is_returned() {
    let (dir, store) = create_local_store();
    let path = StoragePath::new("sessions/s-3", "chunk_001.wav");
    upload(&store, &dir, &path, b"data").await;

    store.delete(BUCKET, &path).await.unwrap();
    let result = store
        .download_to(BUCKET, &path, &dir.path().join("gone.wav"))
        .await;

    assert!(matches!(result, Err(ObjectStorageError::NotFound(_))));
}

#[tokio::test]
async fn given_local_store_when_signing_then_url_points_at_public_base() {
    let (_dir, store) = create_local_store();
    let path = StoragePath::new("sessions/s-4", "full.wav");

    let url = store
        .signed_url(BUCKET, &path, Duration::from_secs(3600))
        .await
        .unwrap();

    assert!(
        url.starts_with("http://localhost:3000/storage/recordings/sessions/s-4/full.wav?expires="),
        "{url}"
    );
}

#[tokio::test]
async fn given_empty_prefix_when_listing_memory_store_then_returns_empty() {
    let store = InMemoryObjectStorage::new();

    let objects = store.list(BUCKET, "sessions/none").await.unwrap();

    assert!(objects.is_empty());
}

#[tokio::test]
async fn given_memory_store_when_uploading_file_then_bytes_are_readable() {
    let dir = TempDir::new().unwrap();
    let store = InMemoryObjectStorage::new();
    let path = StoragePath::new("sessions/s-5", "full.wav");

    upload(&store, &dir, &path, b"merged audio").await;

    assert_eq!(store.get_bytes(BUCKET, &path).await.unwrap(), b"merged audio");
}
