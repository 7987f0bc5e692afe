use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Values pushed into the engine by the surrounding application.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub storage: StorageSettings,
    pub history: HistorySettings,
    pub limits: LimitSettings,
    pub files: FileCacheSettings,
    pub blobs: BlobSettings,
    pub maintenance: MaintenanceSettings,
    pub capture: CaptureSettings,
    pub sync: SyncSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Single SQLite file at `<cache_folder>/history.db`.
    Embedded,
    /// One history file per machine in `<cache_folder>/History`.
    SyncFolder,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageSettings {
    /// Root of all on-disk state. Resolved by the caller when absent.
    pub cache_folder_path: Option<PathBuf>,
    pub backend: StorageBackend,
    /// Names the local history file. Defaults to the host name.
    pub machine_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HistorySettings {
    pub max_history_size: usize,
    pub ignore_duplicates: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LimitSettings {
    pub truncate_large_text: bool,
    pub max_text_length_kb: u32,
    pub ignore_large_images: bool,
    pub max_image_size_mb: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileCacheSettings {
    pub cache_files: bool,
    pub max_file_cache_size_mb: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BlobSettings {
    /// Payloads at least this large are mirrored to the side-store. Images
    /// are always mirrored.
    pub min_side_store_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MaintenanceSettings {
    pub interval_minutes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CaptureSettings {
    pub enabled: bool,
    pub settle_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncSettings {
    pub watch: bool,
    pub settle_delay_ms: u64,
}

impl LimitSettings {
    pub fn max_text_bytes(&self) -> usize {
        self.max_text_length_kb as usize * 1024
    }

    pub fn max_image_bytes(&self) -> usize {
        self.max_image_size_mb as usize * 1024 * 1024
    }
}

impl FileCacheSettings {
    pub fn max_file_cache_bytes(&self) -> u64 {
        u64::from(self.max_file_cache_size_mb) * 1024 * 1024
    }
}

impl MaintenanceSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.max(1) * 60)
    }
}

impl CaptureSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl SyncSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
