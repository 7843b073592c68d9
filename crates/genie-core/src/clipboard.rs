//! Clipboard and URL-opening seams.

use crate::{GenieError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Write-only access to the system clipboard.
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Replace the clipboard contents with `text`.
    ///
    /// Failures should be reported as [`GenieError::ClipboardDenied`].
    async fn write_text(&self, text: &str) -> Result<()>;
}

/// Opens a URL in a new browsing context.
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

/// Stand-in used when no clipboard or browser is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unavailable;

#[async_trait]
impl Clipboard for Unavailable {
    async fn write_text(&self, _text: &str) -> Result<()> {
        Err(GenieError::ClipboardDenied("no clipboard available".to_string()))
    }
}

impl UrlOpener for Unavailable {
    fn open(&self, url: &str) -> Result<()> {
        Err(GenieError::OpenFailed(format!("no browser available for {}", url)))
    }
}

/// A clipboard that records writes, or refuses them.
#[derive(Debug, Default)]
pub struct MockClipboard {
    deny: AtomicBool,
    writes: Mutex<Vec<String>>,
}

impl MockClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard that rejects every write.
    pub fn denied() -> Self {
        let clipboard = Self::default();
        clipboard.deny.store(true, Ordering::SeqCst);
        clipboard
    }

    /// Everything written so far, oldest first.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Clipboard for MockClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        if self.deny.load(Ordering::SeqCst) {
            return Err(GenieError::ClipboardDenied("permission denied".to_string()));
        }
        if let Ok(mut writes) = self.writes.lock() {
            writes.push(text.to_string());
        }
        Ok(())
    }
}

/// A URL opener that records what it was asked to open.
#[derive(Debug, Default)]
pub struct MockOpener {
    opened: Mutex<Vec<String>>,
}

impl MockOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

impl UrlOpener for MockOpener {
    fn open(&self, url: &str) -> Result<()> {
        if let Ok(mut opened) = self.opened.lock() {
            opened.push(url.to_string());
        }
        Ok(())
    }
}
