//! Clipboard capture: platform access, classification and the change listener.
mod access;
mod classify;
mod listener;

pub use access::{ClipboardAccess, ClipboardReader, ClipboardRsAccess};
pub use classify::{classify, looks_like_temp_screenshot_path};
pub use listener::{capture_once, ClipboardCapture};
