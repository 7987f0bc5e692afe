use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Discriminant of a clipboard payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Text,
    Image,
    FilePaths,
}

impl DataType {
    pub const ALL: [DataType; 3] = [DataType::Text, DataType::Image, DataType::FilePaths];

    /// Stable lowercase name used in rows and history files.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Text => "text",
            DataType::Image => "image",
            DataType::FilePaths => "file_paths",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(DataType::Text),
            "image" => Some(DataType::Image),
            "file_paths" => Some(DataType::FilePaths),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a clipboard entry. Exactly one variant is ever populated.
///
/// Image bytes are PNG encoded as produced by the capture layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ClipboardContent {
    Text(String),
    Image(Bytes),
    FilePaths(Vec<String>),
}

impl ClipboardContent {
    pub fn data_type(&self) -> DataType {
        match self {
            ClipboardContent::Text(_) => DataType::Text,
            ClipboardContent::Image(_) => DataType::Image,
            ClipboardContent::FilePaths(_) => DataType::FilePaths,
        }
    }

    /// Approximate payload size in bytes.
    pub fn size_bytes(&self) -> usize {
        match self {
            ClipboardContent::Text(text) => text.len(),
            ClipboardContent::Image(bytes) => bytes.len(),
            ClipboardContent::FilePaths(paths) => paths.iter().map(|p| p.len()).sum(),
        }
    }
}
