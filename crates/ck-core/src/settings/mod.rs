//! Engine configuration.
//!
//! Pure data: every section deserializes with defaults so a partial TOML file
//! (or none at all) yields a usable configuration. Resolving the cache folder
//! and machine name is left to the caller.
mod defaults;
mod model;

pub use model::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.history.max_history_size, 500);
        assert!(settings.history.ignore_duplicates);
        assert_eq!(settings.storage.backend, StorageBackend::Embedded);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [storage]
            backend = "sync_folder"
            cache_folder_path = "/data/clips"

            [history]
            max_history_size = 20
            "#,
        )
        .unwrap();

        assert_eq!(settings.storage.backend, StorageBackend::SyncFolder);
        assert_eq!(
            settings.storage.cache_folder_path.as_deref(),
            Some(std::path::Path::new("/data/clips"))
        );
        assert_eq!(settings.history.max_history_size, 20);
        assert!(settings.history.ignore_duplicates);
        assert_eq!(settings.sync.settle_delay_ms, 500);
    }

    #[test]
    fn size_limits_convert_to_bytes() {
        let limits = LimitSettings {
            max_text_length_kb: 2,
            max_image_size_mb: 1,
            ..LimitSettings::default()
        };
        assert_eq!(limits.max_text_bytes(), 2048);
        assert_eq!(limits.max_image_bytes(), 1024 * 1024);
    }
}
