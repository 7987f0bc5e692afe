use anyhow::{anyhow, Result};
use clipboard_rs::common::RustImage;
use clipboard_rs::{Clipboard, ClipboardContext, ContentFormat};
use tracing::trace;

/// Reads the clipboard while exclusive access is held.
///
/// Access is released when the reader is dropped.
pub trait ClipboardReader {
    /// File-drop list, if the clipboard carries one.
    fn file_list(&mut self) -> Result<Option<Vec<String>>>;

    fn text(&mut self) -> Result<Option<String>>;

    /// Image encoded as PNG.
    fn image_png(&mut self) -> Result<Option<Vec<u8>>>;
}

/// Grants exclusive clipboard access.
pub trait ClipboardAccess: Send + Sync {
    fn acquire(&self) -> Result<Box<dyn ClipboardReader + '_>>;
}

fn map_clipboard_err<T>(
    result: std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>,
) -> Result<T> {
    result.map_err(|e| anyhow!(e))
}

/// [`ClipboardAccess`] backed by the system clipboard through `clipboard-rs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClipboardRsAccess;

impl ClipboardAccess for ClipboardRsAccess {
    fn acquire(&self) -> Result<Box<dyn ClipboardReader + '_>> {
        let ctx = map_clipboard_err(ClipboardContext::new())?;
        trace!("Clipboard acquired");
        Ok(Box::new(ClipboardRsReader { ctx }))
    }
}

struct ClipboardRsReader {
    ctx: ClipboardContext,
}

impl ClipboardReader for ClipboardRsReader {
    fn file_list(&mut self) -> Result<Option<Vec<String>>> {
        if !self.ctx.has(ContentFormat::Files) {
            return Ok(None);
        }
        let files = map_clipboard_err(self.ctx.get_files())?;
        Ok((!files.is_empty()).then_some(files))
    }

    fn text(&mut self) -> Result<Option<String>> {
        if !self.ctx.has(ContentFormat::Text) {
            return Ok(None);
        }
        map_clipboard_err(self.ctx.get_text()).map(Some)
    }

    fn image_png(&mut self) -> Result<Option<Vec<u8>>> {
        if !self.ctx.has(ContentFormat::Image) {
            return Ok(None);
        }
        let image = map_clipboard_err(self.ctx.get_image())?;
        let png = map_clipboard_err(image.to_png())?;
        Ok(Some(png.get_bytes().to_vec()))
    }
}

impl Drop for ClipboardRsReader {
    fn drop(&mut self) {
        trace!("Clipboard released");
    }
}
