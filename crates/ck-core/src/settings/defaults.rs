use super::model::*;

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            cache_folder_path: None,
            backend: StorageBackend::Embedded,
            machine_name: None,
        }
    }
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_history_size: 500,
            ignore_duplicates: true,
        }
    }
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            truncate_large_text: false,
            max_text_length_kb: 512,
            ignore_large_images: false,
            max_image_size_mb: 10,
        }
    }
}

impl Default for FileCacheSettings {
    fn default() -> Self {
        Self {
            cache_files: false,
            max_file_cache_size_mb: 50,
        }
    }
}

impl Default for BlobSettings {
    fn default() -> Self {
        Self {
            min_side_store_bytes: 4 * 1024,
        }
    }
}

impl Default for MaintenanceSettings {
    fn default() -> Self {
        Self {
            interval_minutes: 30,
        }
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            settle_delay_ms: 50,
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            watch: true,
            settle_delay_ms: 500,
        }
    }
}
