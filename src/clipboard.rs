//! Clipboard collaborator.
//!
//! Copies are fire-and-forget: failures are logged, never surfaced as errors.

#[cfg(feature = "native")]
use copypasta::{ClipboardContext, ClipboardProvider};

pub trait Clipboard {
    /// Returns whether the text reached the clipboard
    fn copy(&mut self, text: &str) -> bool;
}

/// System clipboard via copypasta
#[cfg(feature = "native")]
#[derive(Default)]
pub struct SystemClipboard;

#[cfg(feature = "native")]
impl Clipboard for SystemClipboard {
    fn copy(&mut self, text: &str) -> bool {
        match ClipboardContext::new() {
            Ok(mut ctx) => match ctx.set_contents(text.to_string()) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("[clipboard] set_contents failed: {e}");
                    false
                }
            },
            Err(e) => {
                log::warn!("[clipboard] unavailable: {e}");
                false
            }
        }
    }
}

/// In-memory clipboard (headless runs and tests)
#[derive(Default, Debug)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn copy(&mut self, text: &str) -> bool {
        self.contents = Some(text.to_string());
        true
    }
}
