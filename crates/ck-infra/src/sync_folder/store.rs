use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use ck_core::clipboard::{sort_newest_first, ClipboardEntry};
use ck_core::dedup::{find_history_duplicate, plan_cleanup, unique_newest};
use ck_core::ids::EntryId;
use ck_core::ports::{
    ClockPort, HistoryEvent, HistoryEvents, HistoryStoreError, HistoryStorePort, StoreResult,
};
use ck_core::Settings;
use notify::RecommendedWatcher;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use super::codec::{decode_history, encode_history};
use super::local_file::{
    history_file_name, is_history_file_name, read_with_retry, replace_file, set_aside_corrupt,
    HISTORY_DIR_NAME,
};
use super::watcher::watch_siblings;

const READ_ATTEMPTS: u32 = 5;
const READ_RETRY_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFolderOptions {
    /// The history files live in `<cache_folder>/History`.
    pub cache_folder: PathBuf,
    pub machine_name: String,
    pub max_history_size: usize,
    pub ignore_duplicates: bool,
    /// Delay between a sibling file change and its reload.
    pub settle_delay: Duration,
    pub watch: bool,
}

impl SyncFolderOptions {
    pub fn from_settings(settings: &Settings, cache_folder: PathBuf, machine_name: String) -> Self {
        Self {
            cache_folder,
            machine_name,
            max_history_size: settings.history.max_history_size,
            ignore_duplicates: settings.history.ignore_duplicates,
            settle_delay: settings.sync.settle_delay(),
            watch: settings.sync.watch,
        }
    }
}

struct WatchHandle {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

struct Inner {
    history_dir: PathBuf,
    own_file_name: String,
    options: SyncFolderOptions,
    /// Merged view of every machine's history, newest first.
    view: Mutex<Vec<ClipboardEntry>>,
    /// Serializes rewrites of the own history file.
    write_gate: tokio::sync::Mutex<()>,
    /// Sibling files with a reload pending or running.
    reloading: Mutex<HashSet<String>>,
    clock: Arc<dyn ClockPort>,
    events: HistoryEvents,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Removes the oldest non-pinned local entries until at most `max` local
/// entries remain. `view` must be sorted newest first.
fn evict_local_overflow(view: &mut Vec<ClipboardEntry>, max: usize) -> Vec<ClipboardEntry> {
    let mut local = view.iter().filter(|e| e.is_local()).count();
    let mut evicted = Vec::new();
    while local > max {
        let Some(idx) = view.iter().rposition(|e| e.is_local() && !e.is_pinned()) else {
            break;
        };
        evicted.push(view.remove(idx));
        local -= 1;
    }
    evicted
}

impl Inner {
    fn own_path(&self) -> PathBuf {
        self.history_dir.join(&self.own_file_name)
    }

    fn view(&self) -> MutexGuard<'_, Vec<ClipboardEntry>> {
        lock(&self.view)
    }

    fn find(&self, id: &EntryId) -> Option<ClipboardEntry> {
        self.view().iter().find(|e| &e.id == id).cloned()
    }

    fn local_entries(&self) -> Vec<ClipboardEntry> {
        self.view().iter().filter(|e| e.is_local()).cloned().collect()
    }

    /// Writes `local` as the own file. The caller holds `write_gate` and
    /// commits `local` to the view only once this succeeded.
    async fn write_own_file(&self, local: &[ClipboardEntry]) -> StoreResult<()> {
        let xml = encode_history(&self.options.machine_name, local)?;
        replace_file(&self.own_path(), xml.as_bytes()).await?;
        debug!(entries = local.len(), file = %self.own_file_name, "Rewrote history file");
        Ok(())
    }

    /// Replaces the local part of the view with `local`.
    fn commit_local(&self, local: Vec<ClipboardEntry>) {
        let mut view = self.view();
        view.retain(|e| !e.is_local());
        view.extend(local);
        sort_newest_first(&mut view);
    }

    fn publish_removed(&self, removed: &[ClipboardEntry]) {
        for entry in removed {
            self.events.publish(HistoryEvent::EntryRemoved {
                id: entry.id.clone(),
                data_type: entry.data_type(),
                source_file: entry.source_file.clone(),
            });
        }
    }

    async fn load_file(&self, name: &str) -> Option<Vec<ClipboardEntry>> {
        let path = self.history_dir.join(name);
        let contents = match read_with_retry(&path, READ_ATTEMPTS, READ_RETRY_DELAY).await {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                debug!(file = name, "History file vanished before reload");
                return None;
            }
            Err(e) => {
                warn!(file = name, error = %e, "Could not read history file, skipping");
                return None;
            }
        };
        match decode_history(&contents) {
            Ok(entries) => Some(entries),
            Err(e) => {
                warn!(file = name, error = %e, "Could not parse history file, skipping");
                None
            }
        }
    }

    async fn reconcile_file(&self, name: &str) -> bool {
        let Some(parsed) = self.load_file(name).await else {
            return false;
        };
        let merged = parsed.len();

        {
            let mut view = self.view();
            view.retain(|e| e.source_file.as_deref() != Some(name));
            view.extend(parsed.into_iter().map(|e| e.with_source_file(name)));
            sort_newest_first(&mut view);
        }

        info!(file = name, entries = merged, "Merged sibling history file");
        self.events.publish(HistoryEvent::ExternallyUpdated {
            source_file: name.to_string(),
        });
        true
    }

    /// Marks `name` as reloading. `false` if a reload is already queued.
    fn begin_reload(&self, name: &str) -> bool {
        lock(&self.reloading).insert(name.to_string())
    }

    fn finish_reload(&self, name: &str) {
        lock(&self.reloading).remove(name);
    }
}

/// History shared through a synchronized folder, one file per machine.
///
/// Only the own file is ever written. Sibling files are merged into the view
/// and attributed through `source_file`.
pub struct SyncFolderHistoryStore {
    inner: Arc<Inner>,
    watch: Mutex<Option<WatchHandle>>,
}

impl SyncFolderHistoryStore {
    pub async fn open(
        options: SyncFolderOptions,
        clock: Arc<dyn ClockPort>,
        events: HistoryEvents,
    ) -> StoreResult<Self> {
        let history_dir = options.cache_folder.join(HISTORY_DIR_NAME);
        tokio::fs::create_dir_all(&history_dir).await?;
        let own_file_name = history_file_name(&options.machine_name);

        let inner = Arc::new(Inner {
            history_dir,
            own_file_name,
            options,
            view: Mutex::new(Vec::new()),
            write_gate: tokio::sync::Mutex::new(()),
            reloading: Mutex::new(HashSet::new()),
            clock,
            events,
        });

        let mut merged = match tokio::fs::read_to_string(inner.own_path()).await {
            Ok(xml) => match decode_history(&xml) {
                Ok(entries) => entries,
                Err(e) => {
                    set_aside_own_file(&inner.own_path(), &e).await;
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(HistoryStoreError::Io(e)),
        };

        for name in sibling_file_names(&inner.history_dir, &inner.own_file_name).await? {
            if let Some(entries) = inner.load_file(&name).await {
                merged.extend(entries.into_iter().map(|e| e.with_source_file(name.as_str())));
            }
        }
        sort_newest_first(&mut merged);
        info!(
            dir = %inner.history_dir.display(),
            file = %inner.own_file_name,
            entries = merged.len(),
            "Opened synchronized folder history store"
        );
        *inner.view() = merged;

        let store = Self {
            inner,
            watch: Mutex::new(None),
        };
        if store.inner.options.watch {
            store.start_watching()?;
        }
        Ok(store)
    }

    pub fn own_file_path(&self) -> PathBuf {
        self.inner.own_path()
    }

    /// Reloads one sibling file into the merged view. Returns `false` when the
    /// file could not be read or parsed; the prior view is kept then.
    pub async fn reconcile_file(&self, name: &str) -> bool {
        self.inner.reconcile_file(name).await
    }

    fn start_watching(&self) -> StoreResult<()> {
        let (watcher, mut rx) = watch_siblings(&self.inner.history_dir, &self.inner.own_file_name)
            .map_err(|e| HistoryStoreError::Io(std::io::Error::other(e)))?;

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        // Dropping `reloads` with the task aborts reloads still settling.
        let task = tokio::spawn(async move {
            let mut reloads = JoinSet::new();
            loop {
                tokio::select! {
                    Some(_) = reloads.join_next(), if !reloads.is_empty() => {}
                    changed = rx.recv() => {
                        let Some(name) = changed else {
                            break;
                        };
                        let Some(inner) = weak.upgrade() else {
                            break;
                        };
                        if !inner.begin_reload(&name) {
                            debug!(file = %name, "Reload already pending, skipping trigger");
                            continue;
                        }
                        reloads.spawn(async move {
                            tokio::time::sleep(inner.options.settle_delay).await;
                            inner.reconcile_file(&name).await;
                            inner.finish_reload(&name);
                        });
                    }
                }
            }
        });

        *lock(&self.watch) = Some(WatchHandle {
            _watcher: watcher,
            task,
        });
        debug!(dir = %self.inner.history_dir.display(), "Watching history folder");
        Ok(())
    }
}

/// Keeps a copy of an unparsable own file and lets the store start empty.
async fn set_aside_own_file(path: &Path, error: &HistoryStoreError) {
    match set_aside_corrupt(path).await {
        Ok(backup) => warn!(
            file = %path.display(),
            backup = %backup.display(),
            error = %error,
            "Own history file unreadable, starting with empty local history"
        ),
        Err(e) => warn!(
            file = %path.display(),
            error = %error,
            backup_error = %e,
            "Own history file unreadable and could not be moved aside"
        ),
    }
}

async fn sibling_file_names(dir: &Path, own: &str) -> StoreResult<Vec<String>> {
    let mut names = Vec::new();
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    while let Some(item) = read_dir.next_entry().await? {
        let Ok(name) = item.file_name().into_string() else {
            continue;
        };
        if name != own && is_history_file_name(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

#[async_trait::async_trait]
impl HistoryStorePort for SyncFolderHistoryStore {
    async fn add(&self, mut entry: ClipboardEntry) -> StoreResult<bool> {
        let inner = &self.inner;
        entry.source_file = None;
        let _gate = inner.write_gate.lock().await;

        let (local, evicted) = {
            let view = inner.view();
            if inner.options.ignore_duplicates {
                if let Some(existing) = find_history_duplicate(&entry.content, view.iter()) {
                    debug!(existing_id = %existing.id, "Skipped entry already in history");
                    return Ok(false);
                }
            }
            let mut local: Vec<ClipboardEntry> =
                view.iter().filter(|e| e.is_local()).cloned().collect();
            local.push(entry.clone());
            sort_newest_first(&mut local);
            let evicted = evict_local_overflow(&mut local, inner.options.max_history_size);
            (local, evicted)
        };

        inner.write_own_file(&local).await?;
        inner.commit_local(local);

        if !evicted.is_empty() {
            debug!(count = evicted.len(), "Evicted oldest entries");
        }
        inner.events.publish(HistoryEvent::EntryAdded(entry));
        inner.publish_removed(&evicted);
        Ok(true)
    }

    async fn get_recent(&self, limit: usize) -> StoreResult<Vec<ClipboardEntry>> {
        let snapshot = self.inner.view().clone();
        if self.inner.options.ignore_duplicates {
            Ok(unique_newest(snapshot, limit))
        } else {
            Ok(snapshot.into_iter().take(limit).collect())
        }
    }

    async fn get(&self, id: &EntryId) -> StoreResult<Option<ClipboardEntry>> {
        Ok(self.inner.find(id))
    }

    async fn delete(&self, id: &EntryId) -> StoreResult<bool> {
        let inner = &self.inner;
        let _gate = inner.write_gate.lock().await;
        let Some(removed) = inner.find(id) else {
            return Ok(false);
        };

        if removed.is_local() {
            let local: Vec<ClipboardEntry> = inner
                .local_entries()
                .into_iter()
                .filter(|e| &e.id != id)
                .collect();
            inner.write_own_file(&local).await?;
            inner.commit_local(local);
        } else {
            inner.view().retain(|e| &e.id != id);
        }

        debug!(entry_id = %id, local = removed.is_local(), "Deleted entry");
        inner.publish_removed(std::slice::from_ref(&removed));
        Ok(true)
    }

    async fn set_pinned(&self, id: &EntryId, pinned: bool) -> StoreResult<Option<ClipboardEntry>> {
        let inner = &self.inner;
        let now = inner.clock.now();
        let _gate = inner.write_gate.lock().await;
        let Some(mut updated) = inner.find(id) else {
            return Ok(None);
        };
        if pinned {
            updated.pin();
        } else {
            updated.unpin(now);
        }

        if updated.is_local() {
            let local: Vec<ClipboardEntry> = inner
                .local_entries()
                .into_iter()
                .map(|e| if &e.id == id { updated.clone() } else { e })
                .collect();
            inner.write_own_file(&local).await?;
            inner.commit_local(local);
        } else {
            let mut view = inner.view();
            if let Some(slot) = view.iter_mut().find(|e| &e.id == id) {
                *slot = updated.clone();
            }
            sort_newest_first(&mut view);
        }

        debug!(entry_id = %id, pinned, local = updated.is_local(), "Changed pin state");
        inner.events.publish(HistoryEvent::PinChanged {
            id: id.clone(),
            pinned,
        });
        Ok(Some(updated))
    }

    async fn cleanup_duplicates(&self) -> StoreResult<usize> {
        let inner = &self.inner;
        let _gate = inner.write_gate.lock().await;
        let doomed: HashSet<EntryId> = plan_cleanup(&inner.view()).into_iter().collect();
        let removed: Vec<ClipboardEntry> = inner
            .view()
            .iter()
            .filter(|e| doomed.contains(&e.id))
            .cloned()
            .collect();

        if removed.iter().any(|e| e.is_local()) {
            let local: Vec<ClipboardEntry> = inner
                .local_entries()
                .into_iter()
                .filter(|e| !doomed.contains(&e.id))
                .collect();
            inner.write_own_file(&local).await?;
            inner.commit_local(local);
        }
        inner.view().retain(|e| !doomed.contains(&e.id));

        let count = removed.len();
        if count > 0 {
            info!(count, "Removed duplicate entries");
        }
        inner.publish_removed(&removed);
        inner.events.publish(HistoryEvent::DuplicatesCleaned(count));
        Ok(count)
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.inner.view().len())
    }

    async fn shutdown(&self) -> StoreResult<()> {
        if let Some(handle) = lock(&self.watch).take() {
            handle.task.abort();
        }
        info!("Synchronized folder history store closed");
        Ok(())
    }
}
