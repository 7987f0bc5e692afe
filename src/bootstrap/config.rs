//! Configuration loading.
//!
//! Pure data loading: missing keys fall back to the [`Settings`] defaults and
//! nothing is validated here.

use std::path::Path;

use anyhow::Context;
use ck_core::Settings;

/// Load settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML for
/// [`Settings`].
pub fn load_config(config_path: &Path) -> anyhow::Result<Settings> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    toml::from_str(&content).context("Failed to parse config as TOML")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ck_core::settings::StorageBackend;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_valid_toml() {
        let file = write_config(
            r#"
            [storage]
            cache_folder_path = "/data/clipkeep"
            backend = "sync_folder"
            machine_name = "desk"

            [history]
            max_history_size = 42
            ignore_duplicates = false

            [capture]
            settle_delay_ms = 10
            "#,
        );

        let settings = load_config(file.path()).unwrap();

        assert_eq!(
            settings.storage.cache_folder_path,
            Some(PathBuf::from("/data/clipkeep"))
        );
        assert_eq!(settings.storage.backend, StorageBackend::SyncFolder);
        assert_eq!(settings.storage.machine_name.as_deref(), Some("desk"));
        assert_eq!(settings.history.max_history_size, 42);
        assert!(!settings.history.ignore_duplicates);
        assert_eq!(settings.capture.settle_delay_ms, 10);
        assert_eq!(settings.sync.settle_delay_ms, 500);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let file = write_config("");
        assert_eq!(load_config(file.path()).unwrap(), Settings::default());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_config(Path::new("/this/path/does/not/exist/clipkeep.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let file = write_config("[storage]\nbackend = \"cloud\"\n");
        assert!(load_config(file.path()).is_err());
    }
}
