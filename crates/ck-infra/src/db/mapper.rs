use anyhow::{anyhow, Result};
use bytes::Bytes;
use ck_core::clipboard::{from_millis, ClipboardContent, ClipboardEntry, DataType};
use ck_core::ids::EntryId;

use crate::db::models::HistoryRow;

pub trait InsertMapper<D, R>: Sync + Send {
    fn to_row(&self, domain: &D) -> Result<R>;
}

pub trait RowMapper<R, D>: Sync + Send {
    fn to_domain(&self, row: &R) -> Result<D>;
}

pub struct HistoryRowMapper;

impl InsertMapper<ClipboardEntry, HistoryRow> for HistoryRowMapper {
    fn to_row(&self, domain: &ClipboardEntry) -> Result<HistoryRow> {
        let (plain_text, image_bytes, file_paths) = match &domain.content {
            ClipboardContent::Text(text) => (Some(text.clone()), None, None),
            ClipboardContent::Image(bytes) => (None, Some(bytes.to_vec()), None),
            ClipboardContent::FilePaths(paths) => (None, None, Some(serde_json::to_string(paths)?)),
        };

        Ok(HistoryRow {
            id: domain.id.to_string(),
            timestamp_ms: domain.timestamp.timestamp_millis(),
            data_type: domain.data_type().as_str().to_string(),
            plain_text,
            image_bytes,
            file_paths,
        })
    }
}

impl RowMapper<HistoryRow, ClipboardEntry> for HistoryRowMapper {
    fn to_domain(&self, row: &HistoryRow) -> Result<ClipboardEntry> {
        let data_type = DataType::parse(&row.data_type)
            .ok_or_else(|| anyhow!("row {} has unknown data type {:?}", row.id, row.data_type))?;

        let content = match data_type {
            DataType::Text => ClipboardContent::Text(
                row.plain_text
                    .clone()
                    .ok_or_else(|| anyhow!("text row {} has no plain_text", row.id))?,
            ),
            DataType::Image => ClipboardContent::Image(Bytes::from(
                row.image_bytes
                    .clone()
                    .ok_or_else(|| anyhow!("image row {} has no image_bytes", row.id))?,
            )),
            DataType::FilePaths => {
                let raw = row
                    .file_paths
                    .as_deref()
                    .ok_or_else(|| anyhow!("file path row {} has no file_paths", row.id))?;
                ClipboardContent::FilePaths(serde_json::from_str(raw)?)
            }
        };

        Ok(ClipboardEntry::new(
            EntryId::from(row.id.as_str()),
            from_millis(row.timestamp_ms),
            content,
        ))
    }
}
