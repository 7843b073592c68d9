//! # PromptGenie Client
//!
//! HTTP transport for the PromptGenie generation backend.
//!
//! ## Example
//!
//! ```rust,ignore
//! use genie_client::FormField;
//!
//! // One-line initialization from environment
//! let controller = genie_client::controller_from_env()?;
//!
//! controller.set_field(FormField::Goal, "write a haiku");
//! let result = controller.submit().await?;
//! ```

pub mod http;

pub use http::HttpBackend;

/// Re-export core types for convenience.
pub use genie_core::{
    FormField, FormState, GenerationResult, GenieConfig, GenieError, RequestLifecycleController,
    RequestState, Result,
};

use genie_core::FileCredentialStore;
use std::sync::Arc;

/// Build a controller wired to the HTTP backend and the credential file.
pub fn controller(config: GenieConfig) -> Result<RequestLifecycleController> {
    let backend = HttpBackend::new(&config)?;
    let store = FileCredentialStore::from_config(&config)?;
    Ok(RequestLifecycleController::new(
        config,
        Arc::new(backend),
        Arc::new(store),
    ))
}

/// Build a controller from environment variables.
///
/// # Example
///
/// ```rust,ignore
/// let controller = genie_client::controller_from_env()?;
/// ```
pub fn controller_from_env() -> Result<RequestLifecycleController> {
    controller(GenieConfig::from_env())
}
