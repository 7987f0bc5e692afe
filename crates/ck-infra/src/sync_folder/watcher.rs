use std::path::Path;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::warn;

use super::local_file::is_history_file_name;

/// Watches the history folder and yields the names of sibling history files
/// that were created or modified.
///
/// The own file and temp files never show up on the channel. Dropping the
/// returned watcher stops the stream.
pub fn watch_siblings(
    dir: &Path,
    own_file_name: &str,
) -> notify::Result<(RecommendedWatcher, mpsc::UnboundedReceiver<String>)> {
    let (tx, rx) = mpsc::unbounded_channel();
    let own = own_file_name.to_string();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "History folder watch error");
                return;
            }
        };
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            return;
        }
        for path in &event.paths {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name == own || !is_history_file_name(name) {
                continue;
            }
            let _ = tx.send(name.to_string());
        }
    })?;

    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    Ok((watcher, rx))
}
