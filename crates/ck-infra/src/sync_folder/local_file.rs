use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

pub const HISTORY_DIR_NAME: &str = "History";

const FILE_PREFIX: &str = "history-";
const FILE_SUFFIX: &str = ".xml";
const TEMP_SUFFIX: &str = ".tmp";
const CORRUPT_SUFFIX: &str = ".corrupt";

/// `history-<machine>.xml`, with characters unsafe in file names replaced.
pub fn history_file_name(machine: &str) -> String {
    let safe: String = machine
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = if safe.is_empty() { "unknown".to_string() } else { safe };
    format!("{FILE_PREFIX}{safe}{FILE_SUFFIX}")
}

pub fn is_history_file_name(name: &str) -> bool {
    name.len() > FILE_PREFIX.len() + FILE_SUFFIX.len()
        && name.starts_with(FILE_PREFIX)
        && name.ends_with(FILE_SUFFIX)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn temp_path(path: &Path) -> PathBuf {
    with_suffix(path, TEMP_SUFFIX)
}

/// Moves an unreadable file to `<path>.corrupt`, replacing an older copy.
pub async fn set_aside_corrupt(path: &Path) -> io::Result<PathBuf> {
    let backup = with_suffix(path, CORRUPT_SUFFIX);
    match tokio::fs::remove_file(&backup).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    tokio::fs::rename(path, &backup).await?;
    Ok(backup)
}

/// Replaces `path` with `contents`: write `<path>.tmp`, delete the original,
/// rename the temp file into place.
pub async fn replace_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let tmp = temp_path(path);
    tokio::fs::write(&tmp, contents).await?;

    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }
    }

    tokio::fs::rename(&tmp, path).await
}

/// Reads `path`, retrying transient failures `attempts` times `delay` apart.
///
/// A missing file is `Ok(None)` and is not retried.
pub async fn read_with_retry(
    path: &Path,
    attempts: u32,
    delay: Duration,
) -> io::Result<Option<String>> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => return Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) if attempt < attempts => {
                debug!(path = %path.display(), attempt, error = %e, "History file busy, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_names() {
        assert_eq!(history_file_name("laptop"), "history-laptop.xml");
        assert_eq!(history_file_name("my box/1"), "history-my_box_1.xml");
        assert_eq!(history_file_name("  "), "history-unknown.xml");

        assert!(is_history_file_name("history-A.xml"));
        assert!(!is_history_file_name("history-A.xml.tmp"));
        assert!(!is_history_file_name("history-A.xml.corrupt"));
        assert!(!is_history_file_name("history-.xml"));
        assert!(!is_history_file_name("notes.xml"));
    }

    #[tokio::test]
    async fn replace_file_overwrites_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history-A.xml");

        replace_file(&path, b"first").await.unwrap();
        replace_file(&path, b"second").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_moved_aside() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history-A.xml");
        std::fs::write(&path, "<broken").unwrap();
        std::fs::write(with_suffix(&path, CORRUPT_SUFFIX), "older junk").unwrap();

        let backup = set_aside_corrupt(&path).await.unwrap();

        assert_eq!(backup, dir.path().join("history-A.xml.corrupt"));
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "<broken");
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let read = read_with_retry(&dir.path().join("nope.xml"), 5, Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(read, None);
    }
}
