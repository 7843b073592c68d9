//! Generation backend trait.
//!
//! Defines the interface a transport to the PromptGenie backend must implement.

use crate::form::GenerateRequest;
use crate::{GenieError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A response the backend actually sent, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendResponse {
    /// HTTP status code.
    pub status: u16,

    /// Raw response body.
    pub body: String,
}

impl BackendResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait that generation backends must implement.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Get the backend name.
    fn name(&self) -> &str;

    /// Send one generation request.
    ///
    /// # Returns
    ///
    /// Whatever the backend answered, any status included, or
    /// [`GenieError::TransportUnreachable`] when no response arrived.
    async fn generate(&self, request: &GenerateRequest) -> Result<BackendResponse>;

    /// Check if the backend is reachable.
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

/// A scripted backend for testing.
///
/// Replies are handed out in order; once the script runs out every call
/// gets the fallback reply.
#[derive(Debug)]
pub struct MockBackend {
    script: Mutex<VecDeque<Result<BackendResponse>>>,
    fallback: BackendResponse,
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerateRequest>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: BackendResponse::new(
                200,
                r#"{"prompt":"mock prompt","explanation":"mock explanation"}"#,
            ),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }
}

impl MockBackend {
    /// Create a new mock backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply with the given status and body.
    pub fn with_response(self, status: u16, body: impl Into<String>) -> Self {
        self.push(Ok(BackendResponse::new(status, body)));
        self
    }

    /// Queue a transport failure.
    pub fn with_transport_error(self, message: impl Into<String>) -> Self {
        self.push(Err(GenieError::TransportUnreachable(message.into())));
        self
    }

    fn push(&self, reply: Result<BackendResponse>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(reply);
        }
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The payload of the most recent call.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<BackendResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}
