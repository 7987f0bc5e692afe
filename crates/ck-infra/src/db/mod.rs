//! Embedded SQLite history backend.
pub mod connection;
pub mod executor;
pub mod mapper;
pub mod models;
pub mod repository;
pub mod schema;

pub use executor::{RetryPolicy, RetryingExecutor};
pub use repository::{EmbeddedHistoryStore, StoreOptions, DATABASE_FILE_NAME};
