use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use ck_core::clipboard::{ClipboardContent, ClipboardEntry, DataType};
use ck_core::ids::EntryId;
use ck_core::ports::{BlobSideStorePort, StoredBlob};
use tokio::fs;
use tracing::{debug, warn};

const TEXT_DIR: &str = "Text";
const IMAGES_DIR: &str = "Images";
const FILE_PATHS_DIR: &str = "FilePaths";
const FILES_DIR: &str = "Files";
const META_EXTENSION: &str = "meta";

/// Per-entry payload files under the cache folder.
///
/// ```text
/// <root>/Text/<id>.txt       <root>/Text/<id>.meta
/// <root>/Images/<id>.png     <root>/Images/<id>.meta
/// <root>/FilePaths/<id>.txt  <root>/FilePaths/<id>.meta
/// <root>/Files/<id>/<name>
/// ```
pub struct FsBlobSideStore {
    root: PathBuf,
}

impl FsBlobSideStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn payload_path(&self, id: &EntryId, data_type: DataType) -> PathBuf {
        let (dir, extension) = match data_type {
            DataType::Text => (TEXT_DIR, "txt"),
            DataType::Image => (IMAGES_DIR, "png"),
            DataType::FilePaths => (FILE_PATHS_DIR, "txt"),
        };
        self.root.join(dir).join(format!("{id}.{extension}"))
    }

    fn meta_path(&self, id: &EntryId, data_type: DataType) -> PathBuf {
        self.payload_path(id, data_type).with_extension(META_EXTENSION)
    }

    fn files_dir(&self, id: &EntryId) -> PathBuf {
        self.root.join(FILES_DIR).join(id.as_str())
    }
}

fn validate_entry_id(id: &EntryId) -> Result<()> {
    uuid::Uuid::parse_str(id.as_str()).with_context(|| format!("invalid entry id {id:?}"))?;
    Ok(())
}

/// File lists are a JSON array, so any path text survives the round trip.
fn encode_payload(content: &ClipboardContent) -> Result<Vec<u8>> {
    Ok(match content {
        ClipboardContent::Text(text) => text.as_bytes().to_vec(),
        ClipboardContent::Image(bytes) => bytes.to_vec(),
        ClipboardContent::FilePaths(paths) => serde_json::to_vec(paths)?,
    })
}

fn decode_payload(data_type: DataType, raw: Vec<u8>) -> Result<ClipboardContent> {
    Ok(match data_type {
        DataType::Text => ClipboardContent::Text(String::from_utf8(raw)?),
        DataType::Image => ClipboardContent::Image(Bytes::from(raw)),
        DataType::FilePaths => ClipboardContent::FilePaths(
            serde_json::from_slice(&raw).context("malformed file path list")?,
        ),
    })
}

async fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

async fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("failed to remove {}", path.display())),
    }
}

/// `dir/name`, or `dir/<n>-name` if that is already taken.
async fn free_target(dir: &Path, name: &str) -> PathBuf {
    let mut candidate = dir.join(name);
    let mut n = 1;
    while fs::try_exists(&candidate).await.unwrap_or(false) {
        candidate = dir.join(format!("{n}-{name}"));
        n += 1;
    }
    candidate
}

#[async_trait]
impl BlobSideStorePort for FsBlobSideStore {
    async fn save(&self, entry: &ClipboardEntry) -> Result<()> {
        validate_entry_id(&entry.id)?;
        let data_type = entry.data_type();
        let payload_path = self.payload_path(&entry.id, data_type);
        if let Some(parent) = payload_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&payload_path, encode_payload(&entry.content)?)
            .await
            .with_context(|| format!("failed to write {}", payload_path.display()))?;
        let stamp = entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
        fs::write(self.meta_path(&entry.id, data_type), stamp).await?;

        debug!(entry_id = %entry.id, data_type = %data_type, "Saved side-store blob");
        Ok(())
    }

    async fn load(&self, id: &EntryId, data_type: DataType) -> Result<Option<StoredBlob>> {
        validate_entry_id(id)?;
        let Some(raw) = read_if_exists(&self.payload_path(id, data_type)).await? else {
            return Ok(None);
        };
        let Some(meta) = read_if_exists(&self.meta_path(id, data_type)).await? else {
            return Ok(None);
        };

        let stamp = String::from_utf8(meta)?;
        let timestamp = DateTime::parse_from_rfc3339(stamp.trim())
            .with_context(|| format!("bad timestamp sidecar for {id}"))?
            .with_timezone(&Utc);
        let content = decode_payload(data_type, raw)?;

        Ok(Some(StoredBlob { content, timestamp }))
    }

    async fn delete(&self, id: &EntryId, data_type: DataType) -> Result<()> {
        validate_entry_id(id)?;
        remove_if_exists(&self.payload_path(id, data_type)).await?;
        remove_if_exists(&self.meta_path(id, data_type)).await?;

        let files_dir = self.files_dir(id);
        match fs::remove_dir_all(&files_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("failed to remove {}", files_dir.display()))
            }
        }
        debug!(entry_id = %id, data_type = %data_type, "Deleted side-store blob");
        Ok(())
    }

    async fn cache_files(&self, id: &EntryId, paths: &[String], max_bytes: u64) -> Result<Vec<PathBuf>> {
        validate_entry_id(id)?;
        let target_dir = self.files_dir(id);
        let mut copied = Vec::new();

        for source in paths {
            let source_path = Path::new(source);
            let metadata = match fs::metadata(source_path).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(path = %source, error = %e, "Skipping unreadable file");
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }
            if metadata.len() > max_bytes {
                debug!(path = %source, size = metadata.len(), max_bytes, "Skipping file above cache limit");
                continue;
            }
            let name = source_path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow!("file path {source:?} has no usable file name"))?;

            fs::create_dir_all(&target_dir).await?;
            let target = free_target(&target_dir, name).await;
            if let Err(e) = fs::copy(source_path, &target).await {
                warn!(path = %source, error = %e, "Failed to cache file");
                continue;
            }
            copied.push(target);
        }

        Ok(copied)
    }
}
