use tokio::sync::broadcast;

use crate::clipboard::{ClipboardEntry, DataType};
use crate::ids::EntryId;

const DEFAULT_CAPACITY: usize = 256;

/// Notifications surfaced to the embedding application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEvent {
    EntryAdded(ClipboardEntry),
    /// Explicit delete, eviction or duplicate cleanup. `source_file` names the
    /// sibling history file owning the entry, `None` for local entries.
    EntryRemoved {
        id: EntryId,
        data_type: DataType,
        source_file: Option<String>,
    },
    PinChanged { id: EntryId, pinned: bool },
    DuplicatesCleaned(usize),
    /// A sibling machine's history file was merged into the local view.
    ExternallyUpdated { source_file: String },
}

/// Broadcast hub for [`HistoryEvent`]s. Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct HistoryEvents {
    tx: broadcast::Sender<HistoryEvent>,
}

impl HistoryEvents {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HistoryEvent> {
        self.tx.subscribe()
    }

    /// Publishing with no subscribers is not an error.
    pub fn publish(&self, event: HistoryEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for HistoryEvents {
    fn default() -> Self {
        Self::new()
    }
}
