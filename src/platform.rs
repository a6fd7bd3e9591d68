//! Platform capability ports
//!
//! Clipboard and share are optional host capabilities: a front end may or
//! may not have them. Presence is feature-detected by whether the
//! corresponding [`Platform`] slot is populated, never assumed. The
//! session degrades gracefully when a capability is absent or fails:
//! share falls back to clipboard with a notice, and clipboard failures
//! are logged and simply leave the copied indicator unset.

use std::sync::{Arc, Mutex};

use crate::error::Result;

/// Write access to the host clipboard
pub trait Clipboard: Send + Sync {
    /// Places `text` on the clipboard
    fn write_text(&self, text: &str) -> Result<()>;
}

/// A host share facility (share sheet, external handler, etc.)
pub trait ShareTarget: Send + Sync {
    /// Hands `text` to the host's share facility
    fn share_text(&self, text: &str) -> Result<()>;
}

/// The set of host capabilities available to a session
///
/// `None` in a slot means the capability was not detected on this host.
#[derive(Clone, Default)]
pub struct Platform {
    /// Clipboard capability, if present
    pub clipboard: Option<Arc<dyn Clipboard>>,
    /// Share capability, if present
    pub share: Option<Arc<dyn ShareTarget>>,
}

impl Platform {
    /// A platform with no capabilities at all
    pub fn headless() -> Self {
        Self::default()
    }

    /// Attaches a clipboard capability
    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    /// Attaches a share capability
    pub fn with_share(mut self, share: Arc<dyn ShareTarget>) -> Self {
        self.share = Some(share);
        self
    }
}

/// Clipboard that records writes in memory
///
/// Used by tests and by the CLI, which has no OS clipboard of its own and
/// instead surfaces the copied text to the terminal.
#[derive(Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    /// Creates an empty clipboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last written text, if any
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().expect("clipboard lock poisoned").clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        *self.contents.lock().expect("clipboard lock poisoned") = Some(text.to_string());
        Ok(())
    }
}
