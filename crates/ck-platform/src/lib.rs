//! # ck-platform
//!
//! Operating system clipboard capture for clipkeep. The `clipboard-rs`
//! watcher runs on a dedicated thread and feeds typed entries into the
//! engine's ingest channel.

pub mod capture;

pub use capture::{ClipboardAccess, ClipboardCapture, ClipboardReader, ClipboardRsAccess};
