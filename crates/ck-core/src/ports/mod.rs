//! Port interfaces between the engine and its storage/platform adapters.
//!
//! Ports define the contract that infrastructure implementations fulfil, so
//! the ingest pipeline and maintenance tasks stay independent of whether the
//! history lives in an embedded database or a synchronized folder.

mod blob_side_store;
mod clock;
pub mod errors;
mod events;
mod history_store;

pub use blob_side_store::{BlobSideStorePort, StoredBlob};
pub use clock::ClockPort;
pub use errors::HistoryStoreError;
pub use events::{HistoryEvent, HistoryEvents};
pub use history_store::{HistoryStorePort, StoreResult};
