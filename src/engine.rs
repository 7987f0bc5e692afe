//! Running engine: capture, ingest, blob mirror and maintenance tied together.

use std::sync::Arc;

use anyhow::Result;
use ck_core::clipboard::ClipboardEntry;
use ck_core::ports::{BlobSideStorePort, ClockPort, HistoryEvent, HistoryEvents, HistoryStorePort};
use ck_core::Settings;
use ck_infra::DuplicateJanitor;
use ck_platform::{ClipboardAccess, ClipboardCapture};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::ingest::{IngestOutcome, IngestPipeline};

const CAPTURE_QUEUE_DEPTH: usize = 64;

/// Adapters the engine runs on.
pub struct EngineDeps {
    pub store: Arc<dyn HistoryStorePort>,
    pub blobs: Arc<dyn BlobSideStorePort>,
    pub clock: Arc<dyn ClockPort>,
    pub events: HistoryEvents,
    pub clipboard: Arc<dyn ClipboardAccess>,
}

pub struct Engine {
    store: Arc<dyn HistoryStorePort>,
    events: HistoryEvents,
    capture: ClipboardCapture,
    ingest_tx: mpsc::Sender<ClipboardEntry>,
    tasks: Vec<JoinHandle<()>>,
}

impl Engine {
    /// Spawns the background tasks and, if enabled, starts clipboard capture.
    pub fn start(settings: Settings, deps: EngineDeps) -> Result<Self> {
        let EngineDeps {
            store,
            blobs,
            clock,
            events,
            clipboard,
        } = deps;

        let mut tasks = Vec::new();
        tasks.push(spawn_blob_mirror(events.subscribe(), blobs.clone()));
        tasks.push(DuplicateJanitor::new(store.clone()).spawn(settings.maintenance.interval()));

        let (ingest_tx, ingest_rx) = mpsc::channel(CAPTURE_QUEUE_DEPTH);
        let capture = ClipboardCapture::new(
            clipboard,
            clock,
            settings.capture.settle_delay(),
            ingest_tx.clone(),
        );
        let capture_enabled = settings.capture.enabled;
        let pipeline = IngestPipeline::new(store.clone(), blobs, settings);
        tasks.push(spawn_ingest_loop(ingest_rx, pipeline));

        if capture_enabled {
            capture.start()?;
        }
        info!(capture = capture_enabled, "Engine started");

        Ok(Self {
            store,
            events,
            capture,
            ingest_tx,
            tasks,
        })
    }

    pub fn store(&self) -> Arc<dyn HistoryStorePort> {
        self.store.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HistoryEvent> {
        self.events.subscribe()
    }

    /// Channel the capture thread feeds. Hosts may push entries directly.
    pub fn ingest_sender(&self) -> mpsc::Sender<ClipboardEntry> {
        self.ingest_tx.clone()
    }

    pub fn capture(&self) -> &ClipboardCapture {
        &self.capture
    }

    /// Stops capture, aborts background tasks and closes the store.
    pub async fn shutdown(self) -> Result<()> {
        let Self {
            store,
            capture,
            tasks,
            ..
        } = self;
        // Stopping joins the watch thread.
        tokio::task::spawn_blocking(move || capture.stop()).await??;
        for task in &tasks {
            task.abort();
        }
        store.shutdown().await?;
        info!("Engine stopped");
        Ok(())
    }
}

/// Deletes side-store files of every removed local entry.
fn spawn_blob_mirror(
    mut rx: broadcast::Receiver<HistoryEvent>,
    blobs: Arc<dyn BlobSideStorePort>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(HistoryEvent::EntryRemoved {
                    id,
                    data_type,
                    source_file,
                }) => {
                    // Side-store files of sibling entries belong to their machine.
                    if let Some(source_file) = source_file {
                        debug!(entry_id = %id, file = %source_file, "Keeping side-store files of sibling entry");
                        continue;
                    }
                    if let Err(e) = blobs.delete(&id, data_type).await {
                        warn!(entry_id = %id, error = %e, "Failed to delete side-store files");
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Blob mirror lagged behind history events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn spawn_ingest_loop(
    mut rx: mpsc::Receiver<ClipboardEntry>,
    pipeline: IngestPipeline,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(entry) = rx.recv().await {
            let id = entry.id.clone();
            match pipeline.ingest(entry).await {
                Ok(IngestOutcome::Stored) => debug!(entry_id = %id, "Stored clipboard entry"),
                Ok(outcome) => debug!(entry_id = %id, ?outcome, "Clipboard entry not stored"),
                Err(e) => warn!(entry_id = %id, error = %e, "Failed to store clipboard entry"),
            }
        }
    })
}
