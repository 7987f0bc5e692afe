use std::path::Path;

use anyhow::Result;
use bytes::Bytes;
use ck_core::clipboard::ClipboardContent;

use super::access::ClipboardReader;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp", "tif", "tiff"];
const SCREENSHOT_MARKERS: &[&str] = &["screenshot", "screen shot", "snip"];

/// Turns the clipboard's current contents into a typed payload.
///
/// Priority is file list, then text, then image. Text that only names a
/// temporary screenshot file is replaced by the image next to it.
pub fn classify(reader: &mut dyn ClipboardReader) -> Result<Option<ClipboardContent>> {
    if let Some(files) = reader.file_list()? {
        return Ok(Some(ClipboardContent::FilePaths(files)));
    }

    if let Some(text) = reader.text()?.filter(|t| !t.is_empty()) {
        if looks_like_temp_screenshot_path(&text) {
            if let Some(png) = reader.image_png()? {
                return Ok(Some(ClipboardContent::Image(Bytes::from(png))));
            }
        }
        return Ok(Some(ClipboardContent::Text(text)));
    }

    Ok(reader
        .image_png()?
        .map(|png| ClipboardContent::Image(Bytes::from(png))))
}

fn strip_file_scheme(text: &str) -> &str {
    let lower_prefix = text.get(..7).map(str::to_ascii_lowercase);
    match lower_prefix.as_deref() {
        Some("file://") => &text[7..],
        _ => text,
    }
}

fn is_under_temp_dir(lower: &str) -> bool {
    let system_temp = std::env::temp_dir().to_string_lossy().to_lowercase();
    (!system_temp.is_empty() && lower.starts_with(&system_temp))
        || lower.starts_with("/tmp/")
        || lower.starts_with("/var/folders/")
        || lower.contains("/temp/")
        || lower.contains("\\temp\\")
        || lower.contains("\\tmp\\")
}

/// Whether `text` is a single path to an image file that looks like a
/// screenshot tool's temporary output.
pub fn looks_like_temp_screenshot_path(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.contains(['\n', '\r']) {
        return false;
    }

    let path = strip_file_scheme(trimmed);
    let has_image_extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    if !has_image_extension {
        return false;
    }

    let lower = path.to_lowercase();
    let file_name = lower
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(lower.as_str());
    is_under_temp_dir(&lower) || SCREENSHOT_MARKERS.iter().any(|m| file_name.contains(m))
}
