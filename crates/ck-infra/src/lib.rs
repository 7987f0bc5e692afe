//! # ck-infra
//!
//! Storage backends for clipkeep: the embedded SQLite store, the synchronized
//! folder store and the blob side-store, plus the clock and the maintenance
//! janitor they share.

pub mod db;
pub mod fs;
pub mod maintenance;
pub mod sync_folder;
pub mod time;

pub use db::{EmbeddedHistoryStore, StoreOptions};
pub use fs::blob_side_store::FsBlobSideStore;
pub use maintenance::DuplicateJanitor;
pub use sync_folder::{SyncFolderHistoryStore, SyncFolderOptions};
pub use time::{MonotonicClock, SystemClock};
