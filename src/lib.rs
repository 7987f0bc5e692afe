//! # clipkeep
//!
//! Clipboard history engine. Captures system clipboard changes, filters
//! duplicates and keeps a bounded history in an embedded database or in a
//! folder shared between machines.

pub mod bootstrap;
pub mod engine;
pub mod ingest;

pub use engine::{Engine, EngineDeps};
pub use ingest::{IngestOutcome, IngestPipeline};
