//! HTTP backend implementation.
//!
//! Talks to the PromptGenie FastAPI service over plain JSON.

use async_trait::async_trait;
use genie_core::{
    BackendResponse, GenerateRequest, GenerationBackend, GenieConfig, GenieError, Result,
};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    generate_url: String,
}

/// Body of `GET /`.
#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    message: Option<String>,
}

impl HttpBackend {
    /// Create a new HTTP backend from the given configuration.
    pub fn new(config: &GenieConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| GenieError::ConfigError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            generate_url: config.generate_url(),
        })
    }

    /// Create a backend from environment variables.
    ///
    /// Reads `PROMPTGENIE_BACKEND_URL` and `PROMPTGENIE_TIMEOUT`.
    pub fn from_env() -> Result<Self> {
        Self::new(&GenieConfig::from_env())
    }

    /// The endpoint generation requests are posted to.
    pub fn generate_url(&self) -> &str {
        &self.generate_url
    }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, request), fields(url = %self.generate_url))]
    async fn generate(&self, request: &GenerateRequest) -> Result<BackendResponse> {
        debug!("Posting generation request");

        let response = self
            .client
            .post(&self.generate_url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| GenieError::TransportUnreachable(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| GenieError::TransportUnreachable(e.to_string()))?;

        debug!(status, bytes = body.len(), "Received backend response");
        Ok(BackendResponse { status, body })
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GenieError::TransportUnreachable(e.to_string()))?;

        if !response.status().is_success() {
            debug!("Health check returned {}", response.status());
            return Ok(false);
        }

        match response.json::<HealthResponse>().await {
            Ok(HealthResponse { message: Some(message) }) => debug!("Backend says: {}", message),
            Ok(_) => debug!("Backend answered without a message"),
            Err(e) => debug!("Health body was not JSON: {}", e),
        }
        Ok(true)
    }
}
