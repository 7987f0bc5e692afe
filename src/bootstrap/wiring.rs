//! Dependency assembly.
//!
//! The only place that picks concrete adapters. It resolves the cache folder
//! and machine name and opens the configured history backend.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ck_core::ports::{ClockPort, HistoryEvents, HistoryStoreError, HistoryStorePort};
use ck_core::settings::StorageBackend;
use ck_core::Settings;
use ck_infra::db::DATABASE_FILE_NAME;
use ck_infra::{EmbeddedHistoryStore, StoreOptions, SyncFolderHistoryStore, SyncFolderOptions};
use tracing::info;

const APP_DIR_NAME: &str = "clipkeep";

pub type WiringResult<T> = Result<T, WiringError>;

/// Startup failures while assembling the engine.
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("no cache folder configured and no local data directory available")]
    NoCacheFolder,

    #[error("cache folder {path} could not be created: {source}")]
    CacheFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history store initialization failed: {0}")]
    StoreInit(#[from] HistoryStoreError),
}

/// Configured cache folder, or `<local data dir>/clipkeep`.
pub fn resolve_cache_folder(settings: &Settings) -> WiringResult<PathBuf> {
    settings
        .storage
        .cache_folder_path
        .clone()
        .or_else(|| dirs::data_local_dir().map(|dir| dir.join(APP_DIR_NAME)))
        .ok_or(WiringError::NoCacheFolder)
}

/// Creates the cache folder if it does not exist.
pub fn ensure_cache_folder(path: &Path) -> WiringResult<()> {
    std::fs::create_dir_all(path).map_err(|source| WiringError::CacheFolder {
        path: path.to_path_buf(),
        source,
    })
}

/// Configured machine name, or the host name.
pub fn resolve_machine_name(settings: &Settings) -> String {
    settings
        .storage
        .machine_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| gethostname::gethostname().to_string_lossy().into_owned())
}

/// Opens the history backend selected in `settings`.
pub async fn build_store(
    settings: &Settings,
    cache_folder: PathBuf,
    clock: Arc<dyn ClockPort>,
    events: HistoryEvents,
) -> WiringResult<Arc<dyn HistoryStorePort>> {
    match settings.storage.backend {
        StorageBackend::Embedded => {
            let path = cache_folder.join(DATABASE_FILE_NAME);
            info!(path = %path.display(), "Using embedded history store");
            let store = EmbeddedHistoryStore::open(
                &path,
                StoreOptions::from_settings(settings),
                clock,
                events,
            )
            .await?;
            Ok(Arc::new(store))
        }
        StorageBackend::SyncFolder => {
            let machine_name = resolve_machine_name(settings);
            info!(folder = %cache_folder.display(), machine = %machine_name, "Using synchronized folder history store");
            let options = SyncFolderOptions::from_settings(settings, cache_folder, machine_name);
            let store = SyncFolderHistoryStore::open(options, clock, events).await?;
            Ok(Arc::new(store))
        }
    }
}
