//! System clipboard access for the terminal host.
//!
//! Tries in order:
//! 1. OSC 52 escape sequence (handled by the terminal, works over SSH)
//! 2. System clipboard via `arboard`

use std::io::Write;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use petal_core::clipboard::{ClipboardError, ClipboardSink};

#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    fn copy_osc52(text: &str) -> Result<(), ClipboardError> {
        let encoded = STANDARD.encode(text);

        // ESC ] 52 ; c ; <base64> ESC \
        let mut stdout = std::io::stdout();
        write!(stdout, "\x1b]52;c;{encoded}\x1b\\")
            .map_err(|e| ClipboardError(format!("OSC 52 clipboard failed: {e}")))?;
        stdout
            .flush()
            .map_err(|e| ClipboardError(format!("OSC 52 clipboard failed: {e}")))
    }

    fn copy_system(text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| ClipboardError(format!("system clipboard unavailable: {e}")))?;
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError(format!("system clipboard failed: {e}")))
    }
}

impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if Self::copy_osc52(text).is_ok() {
            return Ok(());
        }
        Self::copy_system(text)
    }
}
