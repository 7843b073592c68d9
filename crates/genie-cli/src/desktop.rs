//! System clipboard and browser integration.

use async_trait::async_trait;
use genie_core::{Clipboard, GenieError, Result, UrlOpener};

/// The desktop clipboard, via `arboard`.
pub struct SystemClipboard;

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        let text = text.to_string();
        // arboard talks to the display server synchronously
        tokio::task::spawn_blocking(move || {
            arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text))
        })
        .await
        .map_err(|e| GenieError::ClipboardDenied(e.to_string()))?
        .map_err(|e| GenieError::ClipboardDenied(e.to_string()))
    }
}

/// Opens pages in the user's default browser.
pub struct BrowserOpener;

impl UrlOpener for BrowserOpener {
    fn open(&self, url: &str) -> Result<()> {
        open::that(url).map_err(|e| GenieError::OpenFailed(e.to_string()))
    }
}
