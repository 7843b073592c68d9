//! # PromptGenie Configuration
//!
//! Central configuration for the client.
//! Supports loading from environment variables and programmatic defaults.
//! A controller takes its own copy at construction; it never changes afterwards.

use crate::platform::Platform;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Global configuration for the PromptGenie client.
///
/// # Example
/// ```rust
/// use genie_core::GenieConfig;
///
/// // Load from environment
/// let config = GenieConfig::from_env();
///
/// // Or customize
/// let config = GenieConfig::default()
///     .with_backend_url("http://127.0.0.1:9000")
///     .with_toast_duration_ms(4000);
/// ```
#[derive(Debug, Clone)]
pub struct GenieConfig {
    /// Base URL of the generation backend.
    /// Default: http://localhost:8000, Env: PROMPTGENIE_BACKEND_URL
    pub backend_url: String,

    /// Path of the generation endpoint, appended to `backend_url`.
    pub generate_path: String,

    /// Key name the API key is stored under.
    /// Default: promptgenie_api_key, Env: PROMPTGENIE_CREDENTIAL_KEY
    pub credential_key: String,

    /// Location of the credential file.
    /// If None, a file under the user's config directory is used.
    /// Env: PROMPTGENIE_CREDENTIAL_PATH
    pub credential_path: Option<PathBuf>,

    /// Request timeout in seconds.
    /// Default: 60, Env: PROMPTGENIE_TIMEOUT
    pub timeout_seconds: u64,

    /// How long a toast stays visible.
    /// Default: 3000, Env: PROMPTGENIE_TOAST_MS
    pub toast_duration_ms: u64,

    /// How long the "copied" flag stays set after a copy.
    pub copied_reset_ms: u64,

    /// Delay between a successful copy and opening the platform page.
    /// Default: 500, Env: PROMPTGENIE_OPEN_DELAY_MS
    pub open_delay_ms: u64,

    /// Platforms offered for copy-and-open.
    pub platforms: Vec<Platform>,
}

impl Default for GenieConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            generate_path: "/api/generate".to_string(),
            credential_key: "promptgenie_api_key".to_string(),
            credential_path: None,
            timeout_seconds: 60,
            toast_duration_ms: 3000,
            copied_reset_ms: 2000,
            open_delay_ms: 500,
            platforms: Platform::defaults(),
        }
    }
}

impl GenieConfig {
    /// Create a new config from environment variables.
    /// Falls back to defaults for missing variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = env::var("PROMPTGENIE_BACKEND_URL") {
            config.backend_url = v;
        }
        if let Ok(v) = env::var("PROMPTGENIE_CREDENTIAL_KEY") {
            if !v.trim().is_empty() {
                config.credential_key = v;
            }
        }
        if let Ok(v) = env::var("PROMPTGENIE_CREDENTIAL_PATH") {
            config.credential_path = Some(PathBuf::from(v));
        }
        if let Ok(v) = env::var("PROMPTGENIE_TIMEOUT") {
            if let Ok(n) = v.parse() {
                config.timeout_seconds = n;
            }
        }
        if let Ok(v) = env::var("PROMPTGENIE_TOAST_MS") {
            if let Ok(n) = v.parse() {
                config.toast_duration_ms = n;
            }
        }
        if let Ok(v) = env::var("PROMPTGENIE_OPEN_DELAY_MS") {
            if let Ok(n) = v.parse() {
                config.open_delay_ms = n;
            }
        }

        config
    }

    /// Builder: Set the backend base URL.
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self
    }

    /// Builder: Set the credential key name.
    pub fn with_credential_key(mut self, key: impl Into<String>) -> Self {
        self.credential_key = key.into();
        self
    }

    /// Builder: Set the credential file location.
    pub fn with_credential_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credential_path = Some(path.into());
        self
    }

    /// Builder: Set the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Builder: Set the toast lifetime.
    pub fn with_toast_duration_ms(mut self, ms: u64) -> Self {
        self.toast_duration_ms = ms;
        self
    }

    /// Builder: Set the copied-flag reset delay.
    pub fn with_copied_reset_ms(mut self, ms: u64) -> Self {
        self.copied_reset_ms = ms;
        self
    }

    /// Builder: Set the copy-and-open delay.
    pub fn with_open_delay_ms(mut self, ms: u64) -> Self {
        self.open_delay_ms = ms;
        self
    }

    /// Builder: Replace the platform table.
    pub fn with_platforms(mut self, platforms: Vec<Platform>) -> Self {
        self.platforms = platforms;
        self
    }

    /// Full URL of the generation endpoint.
    pub fn generate_url(&self) -> String {
        format!(
            "{}{}",
            self.backend_url.trim_end_matches('/'),
            self.generate_path
        )
    }

    /// Resolve where the credential file lives.
    pub fn resolve_credential_path(&self) -> crate::Result<PathBuf> {
        if let Some(ref path) = self.credential_path {
            return Ok(path.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join("promptgenie").join("credentials.json"))
            .ok_or_else(|| {
                crate::GenieError::ConfigError(
                    "could not determine a config directory; set PROMPTGENIE_CREDENTIAL_PATH"
                        .to_string(),
                )
            })
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    pub fn copied_reset(&self) -> Duration {
        Duration::from_millis(self.copied_reset_ms)
    }

    pub fn open_delay(&self) -> Duration {
        Duration::from_millis(self.open_delay_ms)
    }
}
