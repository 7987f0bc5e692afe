use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::clipboard::{ClipboardContent, ClipboardEntry, DataType};
use crate::ids::EntryId;

/// Payload read back from the side-store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub content: ClipboardContent,
    pub timestamp: DateTime<Utc>,
}

/// Per-entry auxiliary payload files.
#[async_trait]
pub trait BlobSideStorePort: Send + Sync {
    /// Writes the payload file and its timestamp sidecar.
    async fn save(&self, entry: &ClipboardEntry) -> Result<()>;

    /// `Ok(None)` when either the payload or the sidecar is missing.
    async fn load(&self, id: &EntryId, data_type: DataType) -> Result<Option<StoredBlob>>;

    /// Removes the payload, the sidecar and the entry's file cache folder.
    async fn delete(&self, id: &EntryId, data_type: DataType) -> Result<()>;

    /// Copies regular files of at most `max_bytes` into the entry's cache
    /// folder and returns the paths of the copies.
    async fn cache_files(&self, id: &EntryId, paths: &[String], max_bytes: u64)
        -> Result<Vec<PathBuf>>;
}
