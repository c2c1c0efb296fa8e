use anyhow::{Context, Result};
use arboard::Clipboard;

/// Largest response (in bytes) that will be placed on the clipboard
pub const MAX_CLIPBOARD_BYTES: usize = 10 * 1024 * 1024;

/// Destination for copied pane text (swapped for a recorder in tests)
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The system clipboard, opened on first use.
///
/// Kept alive for the whole session: on X11 the copied text is served by the
/// process that owns the clipboard handle.
#[derive(Default)]
pub struct SystemClipboard {
    clipboard: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let clipboard = match self.clipboard.take() {
            Some(clipboard) => clipboard,
            None => Clipboard::new().context("Failed to initialize clipboard")?,
        };
        self.clipboard
            .insert(clipboard)
            .set_text(text)
            .context("Failed to set clipboard contents")
    }
}

/// Reject text that should never reach the clipboard
pub fn validate_clipboard_text(text: &str) -> Result<()> {
    if text.is_empty() {
        anyhow::bail!("Nothing to copy: the pane is empty");
    }

    if text.len() > MAX_CLIPBOARD_BYTES {
        anyhow::bail!(
            "Response too large for clipboard ({} bytes, max {})",
            text.len(),
            MAX_CLIPBOARD_BYTES
        );
    }

    Ok(())
}

/// Validate `text`, then hand it to `sink`.
///
/// Validation runs first so an empty pane never touches the system clipboard.
pub fn copy_text(text: &str, sink: &mut dyn ClipboardSink) -> Result<()> {
    validate_clipboard_text(text)?;
    sink.set_text(text)
}
