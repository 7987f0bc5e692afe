//! XML encoding of a per-machine history file.
//!
//! ```xml
//! <history machine="laptop">
//!   <entry id="…" timestamp="1717000000000" type="text"><text>aGVsbG8=</text></entry>
//!   <entry id="…" timestamp="…" type="file_paths"><path>L3RtcC9h</path><path>L3RtcC9i</path></entry>
//! </history>
//! ```
//!
//! Payloads are base64 so that whitespace and control characters survive.
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use ck_core::clipboard::{from_millis, ClipboardContent, ClipboardEntry, DataType};
use ck_core::ids::EntryId;
use ck_core::ports::HistoryStoreError;
use serde::{Deserialize, Serialize};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "history")]
struct HistoryDocument {
    #[serde(rename = "@machine", default)]
    machine: String,
    #[serde(rename = "entry", default)]
    entries: Vec<EntryRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryRecord {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@timestamp")]
    timestamp: i64,
    #[serde(rename = "@type")]
    data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(rename = "path", default, skip_serializing_if = "Vec::is_empty")]
    paths: Vec<String>,
}

fn codec_error(message: impl Into<String>) -> HistoryStoreError {
    HistoryStoreError::Codec(message.into())
}

fn decode_b64(id: &str, value: &str) -> Result<Vec<u8>, HistoryStoreError> {
    STANDARD
        .decode(value.trim())
        .map_err(|e| codec_error(format!("entry {id}: bad base64 payload: {e}")))
}

fn decode_b64_string(id: &str, value: &str) -> Result<String, HistoryStoreError> {
    String::from_utf8(decode_b64(id, value)?)
        .map_err(|e| codec_error(format!("entry {id}: payload is not utf-8: {e}")))
}

impl From<&ClipboardEntry> for EntryRecord {
    fn from(entry: &ClipboardEntry) -> Self {
        let mut record = EntryRecord {
            id: entry.id.to_string(),
            timestamp: entry.timestamp.timestamp_millis(),
            data_type: entry.data_type().as_str().to_string(),
            text: None,
            image: None,
            paths: Vec::new(),
        };
        match &entry.content {
            ClipboardContent::Text(text) => record.text = Some(STANDARD.encode(text)),
            ClipboardContent::Image(bytes) => record.image = Some(STANDARD.encode(bytes)),
            ClipboardContent::FilePaths(paths) => {
                record.paths = paths.iter().map(|p| STANDARD.encode(p)).collect();
            }
        }
        record
    }
}

impl TryFrom<EntryRecord> for ClipboardEntry {
    type Error = HistoryStoreError;

    fn try_from(record: EntryRecord) -> Result<Self, Self::Error> {
        let data_type = DataType::parse(&record.data_type).ok_or_else(|| {
            codec_error(format!(
                "entry {}: unknown type {:?}",
                record.id, record.data_type
            ))
        })?;

        let content = match data_type {
            // An empty element may come back as absent.
            DataType::Text => ClipboardContent::Text(match record.text.as_deref() {
                Some(text) => decode_b64_string(&record.id, text)?,
                None => String::new(),
            }),
            DataType::Image => {
                let raw = record
                    .image
                    .as_deref()
                    .ok_or_else(|| codec_error(format!("entry {}: missing image", record.id)))?;
                ClipboardContent::Image(Bytes::from(decode_b64(&record.id, raw)?))
            }
            DataType::FilePaths => ClipboardContent::FilePaths(
                record
                    .paths
                    .iter()
                    .map(|p| decode_b64_string(&record.id, p))
                    .collect::<Result<_, _>>()?,
            ),
        };

        Ok(ClipboardEntry::new(
            EntryId::from(record.id),
            from_millis(record.timestamp),
            content,
        ))
    }
}

/// Serializes `entries` as the history file of `machine`.
pub fn encode_history(machine: &str, entries: &[ClipboardEntry]) -> Result<String, HistoryStoreError> {
    let document = HistoryDocument {
        machine: machine.to_string(),
        entries: entries.iter().map(EntryRecord::from).collect(),
    };
    let body = quick_xml::se::to_string(&document).map_err(|e| codec_error(e.to_string()))?;
    Ok(format!("{XML_DECLARATION}{body}"))
}

/// Parses a history file. Entries come back without a `source_file`.
pub fn decode_history(xml: &str) -> Result<Vec<ClipboardEntry>, HistoryStoreError> {
    let document: HistoryDocument =
        quick_xml::de::from_str(xml).map_err(|e| codec_error(e.to_string()))?;
    document
        .entries
        .into_iter()
        .map(ClipboardEntry::try_from)
        .collect()
}
