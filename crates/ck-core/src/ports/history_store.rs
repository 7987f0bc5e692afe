use crate::clipboard::ClipboardEntry;
use crate::ids::EntryId;

use super::errors::HistoryStoreError;

pub type StoreResult<T> = Result<T, HistoryStoreError>;

/// Durable clipboard history.
///
/// Implemented by the embedded database store and the synchronized folder
/// store. Every mutation publishes the matching `HistoryEvent`.
#[async_trait::async_trait]
pub trait HistoryStorePort: Send + Sync {
    /// Inserts `entry` and trims history to its size bound.
    ///
    /// Returns `false` without writing when duplicate suppression is enabled
    /// and equal content already exists.
    async fn add(&self, entry: ClipboardEntry) -> StoreResult<bool>;

    /// Newest `limit` entries, newest first.
    async fn get_recent(&self, limit: usize) -> StoreResult<Vec<ClipboardEntry>>;

    async fn get(&self, id: &EntryId) -> StoreResult<Option<ClipboardEntry>>;

    /// Returns `true` when an entry was removed.
    async fn delete(&self, id: &EntryId) -> StoreResult<bool>;

    /// Pins (timestamp set to the sentinel) or unpins (timestamp set to now).
    /// Returns the updated entry, or `None` if `id` is unknown.
    async fn set_pinned(&self, id: &EntryId, pinned: bool) -> StoreResult<Option<ClipboardEntry>>;

    /// Removes all but the newest entry of every duplicate group.
    async fn cleanup_duplicates(&self) -> StoreResult<usize>;

    async fn count(&self) -> StoreResult<usize>;

    /// Releases handles and background watchers.
    async fn shutdown(&self) -> StoreResult<()>;
}
