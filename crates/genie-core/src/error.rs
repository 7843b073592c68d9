//! Error types for PromptGenie Core.

use thiserror::Error;

/// Result type alias for PromptGenie operations.
pub type Result<T> = std::result::Result<T, GenieError>;

/// Main error type for the PromptGenie client.
#[derive(Debug, Error)]
pub enum GenieError {
    /// No API key was provided; nothing was sent.
    #[error("API key required")]
    MissingCredential,

    /// The goal field is empty; submission is disabled.
    #[error("Goal is required")]
    GoalRequired,

    /// A generation request is already outstanding.
    #[error("A generation request is already in flight")]
    AlreadyInFlight,

    /// The backend reported a quota, billing or rate-limit problem.
    #[error("Quota exceeded: {summary}")]
    QuotaExceeded { summary: String },

    /// The backend answered with a non-success status or an unusable body.
    #[error("Request failed ({status}): {summary}")]
    RequestFailed { status: u16, summary: String },

    /// No response was received from the backend.
    #[error("Backend unreachable: {0}")]
    TransportUnreachable(String),

    /// Writing to the clipboard failed.
    #[error("Clipboard error: {0}")]
    ClipboardDenied(String),

    /// Launching an external URL failed.
    #[error("Failed to open URL: {0}")]
    OpenFailed(String),

    /// The credential store could not be read or written.
    #[error("Credential store error: {0}")]
    StoreError(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO operation failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl GenieError {
    /// Whether this error came out of the quota classifier.
    pub fn is_quota(&self) -> bool {
        matches!(self, GenieError::QuotaExceeded { .. })
    }
}
