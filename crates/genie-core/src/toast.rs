//! Short-lived notifications and the timers that expire them.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};
use uuid::Uuid;

pub const GENERATED: &str = "Prompt generated successfully!";
pub const KEY_REQUIRED: &str = "API key is required";
pub const COPIED: &str = "Prompt copied to clipboard!";
pub const COPY_FAILED: &str = "Failed to copy prompt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToastKind {
    Success,
    Error,
}

/// A notification that disappears on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    /// Distinguishes this toast from a later one with the same text.
    pub id: Uuid,
    pub text: String,
    pub kind: ToastKind,
}

impl Toast {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            kind: ToastKind::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            kind: ToastKind::Error,
        }
    }

    pub fn opening(platform: &str) -> Self {
        Self::success(format!("Prompt copied! Opening {}...", platform))
    }
}

/// Delayed tasks owned by one controller.
///
/// Everything still pending is aborted by [`TimerSet::cancel_all`] or on drop.
#[derive(Debug, Default)]
pub struct TimerSet {
    handles: Mutex<Vec<AbortHandle>>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once `delay` has elapsed. Must be called inside a Tokio runtime.
    pub fn schedule<F, Fut, T>(&self, delay: Duration, task: F) -> JoinHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task().await
        });

        if let Ok(mut handles) = self.handles.lock() {
            handles.retain(|h| !h.is_finished());
            handles.push(handle.abort_handle());
        }
        handle
    }

    /// Number of timers that have not fired yet.
    pub fn pending(&self) -> usize {
        self.handles
            .lock()
            .map(|h| h.iter().filter(|h| !h.is_finished()).count())
            .unwrap_or(0)
    }

    /// Abort every pending timer.
    pub fn cancel_all(&self) {
        if let Ok(mut handles) = self.handles.lock() {
            for handle in handles.drain(..) {
                handle.abort();
            }
        }
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
