//! Captured entries on their way into the history store.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use ck_core::clipboard::{ClipboardContent, ClipboardEntry};
use ck_core::dedup::ConsecutiveDuplicateFilter;
use ck_core::ports::{BlobSideStorePort, HistoryStorePort};
use ck_core::Settings;
use tracing::{debug, warn};

/// What happened to one captured entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Stored,
    /// Same payload as the previous capture of its type.
    ConsecutiveDuplicate,
    /// Equal content is already in history.
    AlreadyInHistory,
    /// Image above the configured size limit.
    TooLarge,
}

/// Applies size limits and duplicate suppression, then writes the entry and
/// mirrors large payloads to the side-store.
pub struct IngestPipeline {
    store: Arc<dyn HistoryStorePort>,
    blobs: Arc<dyn BlobSideStorePort>,
    settings: Settings,
    consecutive: Mutex<ConsecutiveDuplicateFilter>,
}

/// Cuts `text` to at most `max_bytes`, on a character boundary.
fn truncate_on_char_boundary(text: &mut String, max_bytes: usize) -> bool {
    if text.len() <= max_bytes {
        return false;
    }
    let mut cut = max_bytes;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    true
}

impl IngestPipeline {
    pub fn new(
        store: Arc<dyn HistoryStorePort>,
        blobs: Arc<dyn BlobSideStorePort>,
        settings: Settings,
    ) -> Self {
        Self {
            store,
            blobs,
            settings,
            consecutive: Mutex::new(ConsecutiveDuplicateFilter::new()),
        }
    }

    fn consecutive(&self) -> MutexGuard<'_, ConsecutiveDuplicateFilter> {
        self.consecutive
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Forgets the previous capture of every type.
    pub fn reset(&self) {
        self.consecutive().reset();
    }

    fn should_mirror(&self, entry: &ClipboardEntry) -> bool {
        matches!(entry.content, ClipboardContent::Image(_))
            || entry.content.size_bytes() >= self.settings.blobs.min_side_store_bytes
    }

    pub async fn ingest(&self, mut entry: ClipboardEntry) -> Result<IngestOutcome> {
        let limits = &self.settings.limits;

        match &mut entry.content {
            ClipboardContent::Image(bytes)
                if limits.ignore_large_images && bytes.len() > limits.max_image_bytes() =>
            {
                debug!(entry_id = %entry.id, size = bytes.len(), "Ignoring image above size limit");
                return Ok(IngestOutcome::TooLarge);
            }
            ClipboardContent::Text(text) if limits.truncate_large_text => {
                if truncate_on_char_boundary(text, limits.max_text_bytes()) {
                    debug!(entry_id = %entry.id, kept = text.len(), "Truncated large text");
                }
            }
            _ => {}
        }

        if self.settings.history.ignore_duplicates && self.consecutive().is_repeat(&entry) {
            debug!(entry_id = %entry.id, "Dropping consecutive duplicate");
            return Ok(IngestOutcome::ConsecutiveDuplicate);
        }

        // A failed add leaves the filter alone so the next copy is retried.
        let added = self.store.add(entry.clone()).await?;
        self.consecutive().record(&entry);
        if !added {
            return Ok(IngestOutcome::AlreadyInHistory);
        }

        if let (true, Some(paths)) = (self.settings.files.cache_files, entry.file_paths()) {
            let max_bytes = self.settings.files.max_file_cache_bytes();
            match self.blobs.cache_files(&entry.id, paths, max_bytes).await {
                Ok(copied) => debug!(entry_id = %entry.id, copied = copied.len(), "Cached referenced files"),
                Err(e) => warn!(entry_id = %entry.id, error = %e, "Failed to cache referenced files"),
            }
        }

        if self.should_mirror(&entry) {
            if let Err(e) = self.blobs.save(&entry).await {
                warn!(entry_id = %entry.id, error = %e, "Failed to mirror payload to side-store");
            }
        }

        Ok(IngestOutcome::Stored)
    }
}
