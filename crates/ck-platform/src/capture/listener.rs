use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{anyhow, Result};
use ck_core::clipboard::ClipboardEntry;
use ck_core::ids::EntryId;
use ck_core::ports::ClockPort;
use clipboard_rs::{
    ClipboardHandler, ClipboardWatcher, ClipboardWatcherContext, WatcherShutdown,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::access::ClipboardAccess;
use super::classify::classify;

/// Handles one change notification: settle, acquire, classify, release.
///
/// Returns `None` when access was refused, the clipboard held nothing usable
/// or reading failed.
pub fn capture_once(
    access: &dyn ClipboardAccess,
    clock: &dyn ClockPort,
    settle_delay: Duration,
) -> Option<ClipboardEntry> {
    if !settle_delay.is_zero() {
        std::thread::sleep(settle_delay);
    }

    let mut reader = match access.acquire() {
        Ok(reader) => reader,
        Err(e) => {
            debug!(error = %e, "Clipboard busy, dropping change notification");
            return None;
        }
    };
    let classified = classify(reader.as_mut());
    drop(reader);

    match classified {
        Ok(Some(content)) => Some(ClipboardEntry::new(EntryId::new(), clock.now(), content)),
        Ok(None) => {
            debug!("Clipboard change carried no supported content");
            None
        }
        Err(e) => {
            warn!(error = %e, "Failed to read clipboard contents");
            None
        }
    }
}

struct CaptureHandler {
    access: Arc<dyn ClipboardAccess>,
    clock: Arc<dyn ClockPort>,
    settle_delay: Duration,
    sink: mpsc::Sender<ClipboardEntry>,
}

impl ClipboardHandler for CaptureHandler {
    fn on_clipboard_change(&mut self) {
        let Some(entry) = capture_once(self.access.as_ref(), self.clock.as_ref(), self.settle_delay)
        else {
            return;
        };
        debug!(entry_id = %entry.id, data_type = %entry.data_type(), "Captured clipboard entry");
        if self.sink.blocking_send(entry).is_err() {
            debug!("Capture sink closed, dropping entry");
        }
    }
}

struct RunningWatcher {
    shutdown: WatcherShutdown,
    thread: JoinHandle<()>,
}

/// Listens for system clipboard changes on a dedicated thread.
///
/// `start`, `stop` and `toggle` are idempotent.
pub struct ClipboardCapture {
    access: Arc<dyn ClipboardAccess>,
    clock: Arc<dyn ClockPort>,
    settle_delay: Duration,
    sink: mpsc::Sender<ClipboardEntry>,
    running: Mutex<Option<RunningWatcher>>,
}

impl ClipboardCapture {
    pub fn new(
        access: Arc<dyn ClipboardAccess>,
        clock: Arc<dyn ClockPort>,
        settle_delay: Duration,
        sink: mpsc::Sender<ClipboardEntry>,
    ) -> Self {
        Self {
            access,
            clock,
            settle_delay,
            sink,
            running: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .map(|running| running.is_some())
            .unwrap_or(false)
    }

    pub fn start(&self) -> Result<()> {
        let mut running = self
            .running
            .lock()
            .map_err(|_| anyhow!("capture state lock poisoned"))?;
        if running.is_some() {
            debug!("Clipboard capture already running, skipping start");
            return Ok(());
        }

        let mut watcher_ctx = ClipboardWatcherContext::new()
            .map_err(|e| anyhow!("Failed to create watcher context: {}", e))?;
        let handler = CaptureHandler {
            access: self.access.clone(),
            clock: self.clock.clone(),
            settle_delay: self.settle_delay,
            sink: self.sink.clone(),
        };
        let shutdown = watcher_ctx.add_handler(handler).get_shutdown_channel();

        let thread = std::thread::Builder::new()
            .name("clipkeep-capture".into())
            .spawn(move || {
                info!("start clipboard watch");
                watcher_ctx.start_watch();
                info!("clipboard watch stopped");
            })?;

        *running = Some(RunningWatcher { shutdown, thread });
        Ok(())
    }

    pub fn stop(&self) -> Result<()> {
        let watcher = self
            .running
            .lock()
            .map_err(|_| anyhow!("capture state lock poisoned"))?
            .take();
        let Some(watcher) = watcher else {
            debug!("Clipboard capture not running, skipping stop");
            return Ok(());
        };

        watcher.shutdown.stop();
        if watcher.thread.join().is_err() {
            warn!("Clipboard watch thread panicked");
        }
        Ok(())
    }

    /// Flips capture on or off and returns the new state.
    pub fn toggle(&self) -> Result<bool> {
        if self.is_running() {
            self.stop()?;
            Ok(false)
        } else {
            self.start()?;
            Ok(true)
        }
    }
}

impl Drop for ClipboardCapture {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!(error = %e, "Failed to stop clipboard capture");
        }
    }
}
