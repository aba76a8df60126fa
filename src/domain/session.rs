use std::fmt;

use chrono::{DateTime, Utc};

use super::StoragePath;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bucket and key prefix under which a session's audio chunks were uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocation {
    pub bucket: String,
    pub prefix: String,
}

impl StorageLocation {
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn object(&self, file_name: &str) -> StoragePath {
        StoragePath::new(&self.prefix, file_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Synced,
    Processing,
    Completed,
    Other(String),
}

impl SessionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SessionStatus::Synced => "synced",
            SessionStatus::Processing => "processing",
            SessionStatus::Completed => "completed",
            SessionStatus::Other(s) => s.as_str(),
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "synced" => SessionStatus::Synced,
            "processing" => SessionStatus::Processing,
            "completed" => SessionStatus::Completed,
            other => SessionStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable record of a recording session.
///
/// `merged_audio_path` and `raw_transcript` are the resume checkpoints: each is
/// written once its producing stage has succeeded and is never cleared by the
/// pipeline.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: SessionId,
    pub location: StorageLocation,
    pub expected_chunks: u32,
    pub merged_audio_path: Option<StoragePath>,
    pub raw_transcript: Option<String>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(id: SessionId, location: StorageLocation, expected_chunks: u32) -> Self {
        Self {
            id,
            location,
            expected_chunks,
            merged_audio_path: None,
            raw_transcript: None,
            status: SessionStatus::Synced,
            created_at: Utc::now(),
        }
    }

    pub fn has_transcript(&self) -> bool {
        self.raw_transcript
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }
}
