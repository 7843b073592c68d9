//! Request lifecycle controller - owns the form, the stored API key and the
//! single outstanding generation request.
//!
//! ```text
//! Idle ──submit──▶ InFlight ──2xx──────▶ Succeeded ──submit──▶ InFlight
//!                     └──────error─────▶ Failed    ──submit──▶ InFlight
//! ```
//!
//! A submit without an API key moves straight to `Failed` without touching
//! the network. A submit while `InFlight` is rejected, never queued.

use crate::backend::GenerationBackend;
use crate::classify::{self, ErrorInfo};
use crate::clipboard::{Clipboard, Unavailable, UrlOpener};
use crate::credential::CredentialStore;
use crate::form::{FormField, FormState, GenerationResult};
use crate::platform::Platform;
use crate::toast::{self, TimerSet, Toast};
use crate::{GenieConfig, GenieError, Result};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

const MISSING_KEY_SUMMARY: &str = "API key required";
const MISSING_KEY_DETAIL: &str = "Please set your API key first.";

/// Where the single generation request stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

/// Whether the generate action should be enabled.
pub fn enabled_to_submit(form: &FormState, state: RequestState) -> bool {
    form.has_api_key() && form.has_goal() && state != RequestState::InFlight
}

/// A point-in-time copy of everything the view renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerSnapshot {
    #[serde(skip)]
    pub form: FormState,
    pub state: RequestState,
    pub result: Option<GenerationResult>,
    pub error: Option<ErrorInfo>,
    pub toast: Option<Toast>,
    pub copied: bool,
    pub key_panel_open: bool,
}

#[derive(Debug, Default)]
struct Session {
    form: FormState,
    state: RequestState,
    result: Option<GenerationResult>,
    error: Option<ErrorInfo>,
    toast: Option<Toast>,
    copied: Option<Uuid>,
    key_panel_open: bool,
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Puts the state back to `Idle` if a submit future is dropped mid-flight.
struct InFlightGuard<'a> {
    session: &'a Mutex<Session>,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut session = lock(self.session);
            if session.state == RequestState::InFlight {
                debug!("Generation request dropped before completion");
                session.state = RequestState::Idle;
            }
        }
    }
}

/// A platform page that will open once the copy toast has been shown.
#[derive(Debug)]
pub struct PendingOpen {
    handle: JoinHandle<bool>,
}

impl PendingOpen {
    /// Wait for the page to open. False if opening failed or was cancelled.
    pub async fn wait(self) -> bool {
        self.handle.await.unwrap_or(false)
    }
}

/// Drives one form through generation, copy and hand-off.
///
/// # Example
///
/// ```rust,ignore
/// use genie_core::{GenieConfig, RequestLifecycleController, FormField};
///
/// let controller = RequestLifecycleController::new(config, backend, store)
///     .with_clipboard(clipboard);
/// controller.set_field(FormField::Goal, "write a haiku");
///
/// let result = controller.submit().await?;
/// println!("{}", result.prompt);
/// ```
pub struct RequestLifecycleController {
    config: GenieConfig,
    backend: Arc<dyn GenerationBackend>,
    store: Arc<dyn CredentialStore>,
    clipboard: Arc<dyn Clipboard>,
    opener: Arc<dyn UrlOpener>,
    session: Arc<Mutex<Session>>,
    timers: TimerSet,
}

impl RequestLifecycleController {
    /// Create a controller and load the stored API key into the form.
    pub fn new(
        config: GenieConfig,
        backend: Arc<dyn GenerationBackend>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        let mut form = FormState::default();
        match store.load(&config.credential_key) {
            Ok(Some(key)) => form.api_key = key,
            Ok(None) => debug!("No stored API key under '{}'", config.credential_key),
            Err(e) => warn!("Could not load stored API key: {}", e),
        }

        Self {
            config,
            backend,
            store,
            clipboard: Arc::new(Unavailable),
            opener: Arc::new(Unavailable),
            session: Arc::new(Mutex::new(Session {
                form,
                ..Session::default()
            })),
            timers: TimerSet::new(),
        }
    }

    /// Set the clipboard used by the copy actions.
    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Set how platform pages are opened.
    pub fn with_opener(mut self, opener: Arc<dyn UrlOpener>) -> Self {
        self.opener = opener;
        self
    }

    pub fn config(&self) -> &GenieConfig {
        &self.config
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.config.platforms
    }

    // ── Form ─────────────────────────────────────────────────────────

    /// Update one field. A non-empty API key is written to the store.
    pub fn set_field(&self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        let persist = (field == FormField::ApiKey && !value.trim().is_empty())
            .then(|| value.trim().to_string());

        lock(&self.session).form.set(field, value);

        if let Some(key) = persist {
            if let Err(e) = self.store.save(&self.config.credential_key, &key) {
                warn!("Could not persist API key: {}", e);
            }
        }
    }

    pub fn form(&self) -> FormState {
        lock(&self.session).form.clone()
    }

    // ── Derived state ────────────────────────────────────────────────

    pub fn state(&self) -> RequestState {
        lock(&self.session).state
    }

    pub fn result(&self) -> Option<GenerationResult> {
        lock(&self.session).result.clone()
    }

    pub fn error(&self) -> Option<ErrorInfo> {
        lock(&self.session).error.clone()
    }

    pub fn toast(&self) -> Option<Toast> {
        lock(&self.session).toast.clone()
    }

    /// True for a short while after a successful copy.
    pub fn copied(&self) -> bool {
        lock(&self.session).copied.is_some()
    }

    pub fn enabled_to_submit(&self) -> bool {
        let session = lock(&self.session);
        enabled_to_submit(&session.form, session.state)
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        let session = lock(&self.session);
        ControllerSnapshot {
            form: session.form.clone(),
            state: session.state,
            result: session.result.clone(),
            error: session.error.clone(),
            toast: session.toast.clone(),
            copied: session.copied.is_some(),
            key_panel_open: session.key_panel_open,
        }
    }

    // ── Key panel ────────────────────────────────────────────────────

    pub fn key_panel_open(&self) -> bool {
        lock(&self.session).key_panel_open
    }

    pub fn open_key_panel(&self) {
        lock(&self.session).key_panel_open = true;
    }

    pub fn close_key_panel(&self) {
        lock(&self.session).key_panel_open = false;
    }

    pub fn toggle_key_panel(&self) {
        let mut session = lock(&self.session);
        session.key_panel_open = !session.key_panel_open;
    }

    // ── Generation ───────────────────────────────────────────────────

    /// Send the form to the backend.
    ///
    /// Every failure is also recorded as [`ErrorInfo`] and an error toast;
    /// the returned error only tells the caller which kind it was.
    #[instrument(skip(self), fields(backend = %self.backend.name()))]
    pub async fn submit(&self) -> Result<GenerationResult> {
        let request = {
            let mut session = lock(&self.session);

            if session.state == RequestState::InFlight {
                debug!("Submit ignored: request already in flight");
                return Err(GenieError::AlreadyInFlight);
            }

            if !session.form.has_api_key() {
                session.state = RequestState::Failed;
                session.result = None;
                session.error = Some(ErrorInfo::normal(MISSING_KEY_SUMMARY, MISSING_KEY_DETAIL));
                session.key_panel_open = true;
                drop(session);

                self.show_toast(Toast::error(toast::KEY_REQUIRED));
                return Err(GenieError::MissingCredential);
            }

            if !session.form.has_goal() {
                return Err(GenieError::GoalRequired);
            }

            session.error = None;
            session.result = None;
            session.copied = None;
            session.state = RequestState::InFlight;
            session.form.to_request()
        };

        let mut guard = InFlightGuard {
            session: &self.session,
            armed: true,
        };

        info!("Requesting prompt generation");
        let outcome = match self.backend.generate(&request).await {
            Ok(response) => {
                debug!(status = response.status, "Backend responded");
                classify::classify_response(&response).map_err(|f| (f.to_error(), f.info))
            }
            Err(e) => {
                let message = match e {
                    GenieError::TransportUnreachable(message) => message,
                    other => other.to_string(),
                };
                warn!("Backend unreachable: {}", message);
                let info = classify::transport_failure(&message);
                Err((GenieError::TransportUnreachable(message), info))
            }
        };
        guard.armed = false;

        match outcome {
            Ok(result) => {
                {
                    let mut session = lock(&self.session);
                    session.state = RequestState::Succeeded;
                    session.error = None;
                    session.result = Some(result.clone());
                }
                info!("Prompt generated");
                self.show_toast(Toast::success(toast::GENERATED));
                Ok(result)
            }
            Err((error, info)) => {
                let summary = info.summary.clone();
                {
                    let mut session = lock(&self.session);
                    session.state = RequestState::Failed;
                    session.result = None;
                    session.error = Some(info);
                }
                warn!("Generation failed: {}", error);
                self.show_toast(Toast::error(summary));
                Err(error)
            }
        }
    }

    // ── Clipboard ────────────────────────────────────────────────────

    /// Copy `text` to the clipboard. Returns whether it was copied.
    pub async fn copy_to_clipboard(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }

        match self.clipboard.write_text(text).await {
            Ok(()) => {
                let token = Uuid::new_v4();
                lock(&self.session).copied = Some(token);
                self.show_toast(Toast::success(toast::COPIED));

                let session = Arc::downgrade(&self.session);
                self.timers
                    .schedule(self.config.copied_reset(), move || async move {
                        if let Some(session) = session.upgrade() {
                            let mut session = lock(&session);
                            if session.copied == Some(token) {
                                session.copied = None;
                            }
                        }
                    });
                true
            }
            Err(e) => {
                warn!("Clipboard write failed: {}", e);
                lock(&self.session).copied = None;
                self.show_toast(Toast::error(toast::COPY_FAILED));
                false
            }
        }
    }

    /// Copy `text`, then open the platform page after a short delay.
    ///
    /// Returns `None` when nothing was copied.
    pub async fn copy_and_open(&self, text: &str, platform: &Platform) -> Option<PendingOpen> {
        if text.is_empty() {
            return None;
        }

        if let Err(e) = self.clipboard.write_text(text).await {
            warn!("Clipboard write failed: {}", e);
            self.show_toast(Toast::error(toast::COPY_FAILED));
            return None;
        }

        self.show_toast(Toast::opening(&platform.name));

        let opener = self.opener.clone();
        let session = Arc::downgrade(&self.session);
        let url = platform.url.clone();
        let handle = self
            .timers
            .schedule(self.config.open_delay(), move || async move {
                if session.upgrade().is_none() {
                    return false;
                }
                match opener.open(&url) {
                    Ok(()) => {
                        info!("Opened {}", url);
                        true
                    }
                    Err(e) => {
                        warn!("Could not open {}: {}", url, e);
                        false
                    }
                }
            });

        Some(PendingOpen { handle })
    }

    // ── Lifetime ─────────────────────────────────────────────────────

    /// Cancel every pending timer. Also happens on drop.
    pub fn shutdown(&self) {
        debug!("Cancelling {} pending timer(s)", self.timers.pending());
        self.timers.cancel_all();
    }

    fn show_toast(&self, toast: Toast) {
        let id = toast.id;
        lock(&self.session).toast = Some(toast);

        let session: Weak<Mutex<Session>> = Arc::downgrade(&self.session);
        self.timers
            .schedule(self.config.toast_duration(), move || async move {
                if let Some(session) = session.upgrade() {
                    let mut session = lock(&session);
                    if session.toast.as_ref().map(|t| t.id) == Some(id) {
                        session.toast = None;
                    }
                }
            });
    }
}

impl std::fmt::Debug for RequestLifecycleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestLifecycleController")
            .field("backend", &self.backend.name())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
