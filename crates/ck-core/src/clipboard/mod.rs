//! Clipboard entry model.
mod content;
mod entry;
mod timestamp;

pub use content::{ClipboardContent, DataType};
pub use entry::{sort_newest_first, ClipboardEntry};
pub use timestamp::{from_millis, is_pinned_timestamp, pinned_timestamp, PINNED_TIMESTAMP_MS};
