use bytes::Bytes;

use super::equality::file_paths_equal;
use crate::clipboard::{ClipboardContent, ClipboardEntry};

/// Remembers the last processed payload of each data type.
///
/// Used to drop the second notification of a copy that the OS reports twice.
#[derive(Debug, Default)]
pub struct ConsecutiveDuplicateFilter {
    last_text: Option<String>,
    last_image: Option<Bytes>,
    last_file_paths: Option<Vec<String>>,
}

impl ConsecutiveDuplicateFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `entry` repeats the last recorded entry of its type.
    pub fn is_repeat(&self, entry: &ClipboardEntry) -> bool {
        match &entry.content {
            ClipboardContent::Text(text) => self.last_text.as_deref() == Some(text.as_str()),
            ClipboardContent::Image(bytes) => self
                .last_image
                .as_ref()
                .is_some_and(|last| last.len() == bytes.len() && last == bytes),
            ClipboardContent::FilePaths(paths) => self
                .last_file_paths
                .as_deref()
                .is_some_and(|last| file_paths_equal(last, paths)),
        }
    }

    /// Makes `entry` the last entry of its type.
    pub fn record(&mut self, entry: &ClipboardEntry) {
        match &entry.content {
            ClipboardContent::Text(text) => self.last_text = Some(text.clone()),
            ClipboardContent::Image(bytes) => self.last_image = Some(bytes.clone()),
            ClipboardContent::FilePaths(paths) => self.last_file_paths = Some(paths.clone()),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
