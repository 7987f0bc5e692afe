//! # ck-core
//!
//! Core domain models and deduplication rules for clipkeep.
//!
//! This crate contains pure logic without any infrastructure dependencies:
//! the clipboard entry model, duplicate detection, settings and the ports
//! storage and platform adapters implement.

pub mod clipboard;
pub mod dedup;
pub mod ids;
pub mod ports;
pub mod settings;

// Re-export commonly used types at the crate root
pub use clipboard::{ClipboardContent, ClipboardEntry, DataType};
pub use ids::EntryId;
pub use settings::Settings;
