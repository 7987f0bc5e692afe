//! History shared through a synchronized folder.
//!
//! Each machine owns `History/history-<machine>.xml` and never writes any
//! other file. Sibling files are merged into a single view on startup and
//! whenever the folder watcher reports a change.
mod codec;
mod local_file;
mod store;
mod watcher;

pub use codec::{decode_history, encode_history};
pub use local_file::{history_file_name, HISTORY_DIR_NAME};
pub use store::{SyncFolderHistoryStore, SyncFolderOptions};
