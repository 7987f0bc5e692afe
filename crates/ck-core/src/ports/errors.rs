use thiserror::Error;

/// Failures surfaced by history store adapters.
///
/// Contention is retried inside the adapters; callers only ever see
/// [`HistoryStoreError::StorageUnavailable`] after the retry budget is spent.
#[derive(Debug, Error)]
pub enum HistoryStoreError {
    #[error("storage unavailable after {attempts} attempts")]
    StorageUnavailable { attempts: u32 },

    #[error("database error: {0}")]
    Database(String),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("history codec error: {0}")]
    Codec(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HistoryStoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, HistoryStoreError::StorageUnavailable { .. })
    }
}
