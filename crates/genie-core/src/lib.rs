//! # PromptGenie Core
//!
//! Request lifecycle core for the PromptGenie client.
//!
//! This crate owns everything between the form and the generation backend:
//! the form state, the locally stored API key, the single outstanding
//! request, response classification, toasts, and clipboard hand-off.
//!
//! ## Features
//!
//! - One-request-at-a-time state machine
//! - Quota/billing error classification with remediation text
//! - Persisted API key under a fixed key name
//! - Cancellable toast and copy timers tied to the controller's lifetime
//!
//! ## Example
//!
//! ```rust,ignore
//! use genie_core::{FormField, GenieConfig, RequestLifecycleController};
//!
//! let controller = RequestLifecycleController::new(config, backend, store);
//! controller.set_field(FormField::Goal, "write a haiku");
//!
//! match controller.submit().await {
//!     Ok(result) => println!("{}", result.prompt),
//!     Err(_) => println!("{}", controller.error().unwrap().detail),
//! }
//! ```

pub mod backend;
pub mod classify;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod credential;
pub mod error;
pub mod form;
pub mod platform;
pub mod toast;

pub use backend::{BackendResponse, GenerationBackend, MockBackend};
pub use classify::{ErrorCategory, ErrorInfo};
pub use clipboard::{Clipboard, UrlOpener};
pub use config::GenieConfig;
pub use controller::{
    enabled_to_submit, ControllerSnapshot, PendingOpen, RequestLifecycleController, RequestState,
};
pub use credential::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use error::{GenieError, Result};
pub use form::{FormField, FormState, GenerateRequest, GenerationResult};
pub use platform::Platform;
pub use toast::{Toast, ToastKind};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        ErrorCategory, ErrorInfo, FormField, FormState, GenerationBackend, GenerationResult,
        GenieConfig, GenieError, Platform, RequestLifecycleController, RequestState, Result,
    };
}
