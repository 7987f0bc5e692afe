use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::{ClipboardContent, DataType};
use super::timestamp::{is_pinned_timestamp, pinned_timestamp};
use crate::ids::EntryId;

/// One captured clipboard payload plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardEntry {
    pub id: EntryId,
    /// Capture instant; doubles as sort key and pin marker.
    pub timestamp: DateTime<Utc>,
    pub content: ClipboardContent,
    /// Per-machine history file the entry was read from. `None` means local.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

impl ClipboardEntry {
    pub fn new(id: EntryId, timestamp: DateTime<Utc>, content: ClipboardContent) -> Self {
        Self {
            id,
            timestamp,
            content,
            source_file: None,
        }
    }

    pub fn new_text(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(
            EntryId::new(),
            timestamp,
            ClipboardContent::Text(text.into()),
        )
    }

    pub fn new_image(bytes: impl Into<Bytes>, timestamp: DateTime<Utc>) -> Self {
        Self::new(
            EntryId::new(),
            timestamp,
            ClipboardContent::Image(bytes.into()),
        )
    }

    pub fn new_file_paths(paths: Vec<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(EntryId::new(), timestamp, ClipboardContent::FilePaths(paths))
    }

    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    pub fn data_type(&self) -> DataType {
        self.content.data_type()
    }

    pub fn plain_text(&self) -> Option<&str> {
        match &self.content {
            ClipboardContent::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn image_bytes(&self) -> Option<&Bytes> {
        match &self.content {
            ClipboardContent::Image(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn file_paths(&self) -> Option<&[String]> {
        match &self.content {
            ClipboardContent::FilePaths(paths) => Some(paths),
            _ => None,
        }
    }

    pub fn is_local(&self) -> bool {
        self.source_file.is_none()
    }

    pub fn is_pinned(&self) -> bool {
        is_pinned_timestamp(&self.timestamp)
    }

    pub fn pin(&mut self) {
        self.timestamp = pinned_timestamp();
    }

    pub fn unpin(&mut self, now: DateTime<Utc>) {
        self.timestamp = now;
    }
}

/// Sorts newest first. Equal timestamps keep their relative order.
pub fn sort_newest_first(entries: &mut [ClipboardEntry]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
