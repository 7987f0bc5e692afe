//! Periodic duplicate cleanup.

use std::sync::Arc;
use std::time::Duration;

use ck_core::ports::{HistoryStorePort, StoreResult};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct DuplicateJanitor {
    store: Arc<dyn HistoryStorePort>,
}

impl DuplicateJanitor {
    pub fn new(store: Arc<dyn HistoryStorePort>) -> Self {
        Self { store }
    }

    pub async fn run_once(&self) -> StoreResult<usize> {
        let removed = self.store.cleanup_duplicates().await?;
        debug!(removed, "Duplicate sweep finished");
        Ok(removed)
    }

    /// Sweeps every `interval`, starting one interval from now. Failures are
    /// logged and the next tick retries.
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(err) = self.run_once().await {
                    warn!(error = %err, "Duplicate sweep failed");
                }
            }
        })
    }
}
