use async_trait::async_trait;
use genie_core::classify::QUOTA_REMEDIATION;
use genie_core::clipboard::{MockClipboard, MockOpener};
use genie_core::prelude::*;
use genie_core::{
    BackendResponse, CredentialStore, GenerateRequest, MemoryCredentialStore, MockBackend,
    ToastKind,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

const OK_BODY: &str = r#"{"prompt":"You are a poet...","explanation":"Role prompting fits."}"#;

fn controller_with(
    backend: Arc<dyn GenerationBackend>,
    store: Arc<dyn CredentialStore>,
) -> RequestLifecycleController {
    RequestLifecycleController::new(GenieConfig::default(), backend, store)
}

fn ready(controller: &RequestLifecycleController) {
    controller.set_field(FormField::ApiKey, "k");
    controller.set_field(FormField::Goal, "write a haiku");
}

fn assert_one_outcome(controller: &RequestLifecycleController) {
    let snapshot = controller.snapshot();
    assert_ne!(snapshot.state, RequestState::InFlight);
    assert!(
        snapshot.result.is_some() != snapshot.error.is_some(),
        "exactly one of result/error expected: {snapshot:?}"
    );
}

#[tokio::test]
async fn missing_key_never_calls_backend() {
    let backend = Arc::new(MockBackend::new());
    let controller = controller_with(backend.clone(), Arc::new(MemoryCredentialStore::new()));
    controller.set_field(FormField::Goal, "write a haiku");
    controller.set_field(FormField::ApiKey, "   ");

    let err = controller.submit().await.unwrap_err();
    assert!(matches!(err, GenieError::MissingCredential));
    assert_eq!(backend.calls(), 0);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.state, RequestState::Failed);
    let error = snapshot.error.unwrap();
    assert_eq!(error.summary, "API key required");
    assert_eq!(error.category, ErrorCategory::Normal);
    assert!(snapshot.key_panel_open);

    let toast = snapshot.toast.unwrap();
    assert_eq!(toast.kind, ToastKind::Error);
    assert_eq!(toast.text, "API key is required");
}

#[tokio::test]
async fn missing_goal_is_a_no_op() {
    let backend = Arc::new(MockBackend::new());
    let controller = controller_with(backend.clone(), Arc::new(MemoryCredentialStore::new()));
    controller.set_field(FormField::ApiKey, "k");

    assert!(!controller.enabled_to_submit());
    let err = controller.submit().await.unwrap_err();
    assert!(matches!(err, GenieError::GoalRequired));
    assert_eq!(backend.calls(), 0);
    assert_eq!(controller.state(), RequestState::Idle);
    assert!(controller.toast().is_none());
}

#[tokio::test]
async fn successful_generation() {
    let backend = Arc::new(MockBackend::new().with_response(200, OK_BODY));
    let controller = controller_with(backend.clone(), Arc::new(MemoryCredentialStore::new()));
    ready(&controller);
    controller.set_field(FormField::Tone, "  playful  ");

    let result = controller.submit().await.unwrap();
    assert_eq!(result.prompt, "You are a poet...");
    assert_eq!(result.explanation, "Role prompting fits.");

    assert_eq!(controller.state(), RequestState::Succeeded);
    assert_eq!(controller.result(), Some(result));
    assert!(controller.error().is_none());

    let toast = controller.toast().unwrap();
    assert_eq!(toast.kind, ToastKind::Success);
    assert_eq!(toast.text, "Prompt generated successfully!");

    let sent: GenerateRequest = backend.last_request().unwrap();
    assert_eq!(sent.api_key, "k");
    assert_eq!(sent.tone, "playful");
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn quota_response_gets_remediation() {
    let backend = Arc::new(MockBackend::new().with_response(429, r#"{"detail":"quota exceeded"}"#));
    let controller = controller_with(backend, Arc::new(MemoryCredentialStore::new()));
    ready(&controller);

    let err = controller.submit().await.unwrap_err();
    assert!(err.is_quota());

    assert_eq!(controller.state(), RequestState::Failed);
    let error = controller.error().unwrap();
    assert_eq!(error.category, ErrorCategory::Quota);
    assert_eq!(error.summary, "quota exceeded");
    assert_eq!(error.detail, QUOTA_REMEDIATION);

    let toast = controller.toast().unwrap();
    assert_eq!(toast.kind, ToastKind::Error);
    assert_eq!(toast.text, "quota exceeded");
}

#[tokio::test]
async fn server_error_is_request_failed() {
    let backend = Arc::new(MockBackend::new().with_response(500, r#"{"detail":"internal error"}"#));
    let controller = controller_with(backend, Arc::new(MemoryCredentialStore::new()));
    ready(&controller);

    match controller.submit().await {
        Err(GenieError::RequestFailed { status, summary }) => {
            assert_eq!(status, 500);
            assert_eq!(summary, "internal error");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(controller.error().unwrap().summary, "internal error");
}

#[tokio::test]
async fn transport_failure_is_reported() {
    let backend = Arc::new(MockBackend::new().with_transport_error("connection refused"));
    let controller = controller_with(backend, Arc::new(MemoryCredentialStore::new()));
    ready(&controller);

    let err = controller.submit().await.unwrap_err();
    assert!(matches!(err, GenieError::TransportUnreachable(_)));

    let error = controller.error().unwrap();
    assert_eq!(error.summary, "Backend unreachable.");
    assert_eq!(error.detail, "connection refused");
    assert_eq!(controller.toast().unwrap().text, "Backend unreachable.");
}

#[tokio::test]
async fn malformed_success_body_fails() {
    let backend = Arc::new(MockBackend::new().with_response(200, r#"{"prompt":"only half"}"#));
    let controller = controller_with(backend, Arc::new(MemoryCredentialStore::new()));
    ready(&controller);

    assert!(controller.submit().await.is_err());
    assert_eq!(controller.state(), RequestState::Failed);
    assert!(controller.result().is_none());
}

#[tokio::test]
async fn every_terminal_state_has_exactly_one_outcome() {
    let backend = Arc::new(
        MockBackend::new()
            .with_response(200, OK_BODY)
            .with_response(500, r#"{"detail":"boom"}"#)
            .with_transport_error("reset by peer")
            .with_response(200, OK_BODY),
    );
    let controller = controller_with(backend.clone(), Arc::new(MemoryCredentialStore::new()));
    ready(&controller);

    let expected = [
        RequestState::Succeeded,
        RequestState::Failed,
        RequestState::Failed,
        RequestState::Succeeded,
    ];
    for state in expected {
        let _ = controller.submit().await;
        assert_eq!(controller.state(), state);
        assert_one_outcome(&controller);
    }
    assert_eq!(backend.calls(), 4);
}

/// Holds every request until released.
#[derive(Default)]
struct GatedBackend {
    gate: Notify,
    calls: AtomicUsize,
}

#[async_trait]
impl GenerationBackend for GatedBackend {
    fn name(&self) -> &str {
        "gated"
    }

    async fn generate(&self, _request: &GenerateRequest) -> Result<BackendResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(BackendResponse::new(200, OK_BODY))
    }
}

#[tokio::test]
async fn second_submit_while_in_flight_is_rejected() {
    let backend = Arc::new(GatedBackend::default());
    let controller = Arc::new(controller_with(
        backend.clone(),
        Arc::new(MemoryCredentialStore::new()),
    ));
    ready(&controller);

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });

    while controller.state() != RequestState::InFlight {
        tokio::task::yield_now().await;
    }
    assert!(!controller.enabled_to_submit());
    assert!(matches!(
        controller.submit().await,
        Err(GenieError::AlreadyInFlight)
    ));

    backend.gate.notify_one();
    first.await.unwrap().unwrap();

    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    assert_eq!(controller.state(), RequestState::Succeeded);
    assert!(controller.enabled_to_submit());
}

#[tokio::test]
async fn dropped_submit_returns_to_idle() {
    let backend = Arc::new(GatedBackend::default());
    let controller = controller_with(backend, Arc::new(MemoryCredentialStore::new()));
    ready(&controller);

    let attempt = tokio::time::timeout(Duration::from_millis(10), controller.submit()).await;
    assert!(attempt.is_err());
    assert_eq!(controller.state(), RequestState::Idle);
}

#[tokio::test]
async fn stored_key_survives_reload() {
    let store = Arc::new(MemoryCredentialStore::new());
    let first = controller_with(Arc::new(MockBackend::new()), store.clone());
    first.set_field(FormField::ApiKey, "  sk-123 ");
    assert_eq!(
        store.load("promptgenie_api_key").unwrap().as_deref(),
        Some("sk-123")
    );

    first.set_field(FormField::ApiKey, "   ");
    assert_eq!(
        store.load("promptgenie_api_key").unwrap().as_deref(),
        Some("sk-123")
    );

    let second = controller_with(Arc::new(MockBackend::new()), store);
    assert_eq!(second.form().api_key, "sk-123");
}

#[tokio::test]
async fn custom_credential_key_is_used() {
    let store = Arc::new(MemoryCredentialStore::new().with_value("team_key", "sk-team"));
    let config = GenieConfig::default().with_credential_key("team_key");
    let controller = RequestLifecycleController::new(config, Arc::new(MockBackend::new()), store);
    assert_eq!(controller.form().api_key, "sk-team");
}

struct BrokenStore;

impl CredentialStore for BrokenStore {
    fn load(&self, _key: &str) -> Result<Option<String>> {
        Err(GenieError::StoreError("disk on fire".to_string()))
    }

    fn save(&self, _key: &str, _value: &str) -> Result<()> {
        Err(GenieError::StoreError("disk on fire".to_string()))
    }
}

#[tokio::test]
async fn store_failures_do_not_block_submit() {
    let backend = Arc::new(MockBackend::new().with_response(200, OK_BODY));
    let controller = controller_with(backend, Arc::new(BrokenStore));
    assert_eq!(controller.form().api_key, "");

    ready(&controller);
    assert_eq!(controller.form().api_key, "k");
    assert!(controller.submit().await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn toast_expires() {
    let controller = controller_with(
        Arc::new(MockBackend::new()),
        Arc::new(MemoryCredentialStore::new()),
    );
    ready(&controller);
    controller.submit().await.unwrap();

    tokio::time::sleep(Duration::from_millis(2999)).await;
    assert!(controller.toast().is_some());

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(controller.toast().is_none());
    assert_eq!(controller.state(), RequestState::Succeeded);
}

#[tokio::test(start_paused = true)]
async fn old_toast_timer_keeps_newer_toast() {
    let clipboard = Arc::new(MockClipboard::new());
    let controller = controller_with(
        Arc::new(MockBackend::new()),
        Arc::new(MemoryCredentialStore::new()),
    )
    .with_clipboard(clipboard);
    ready(&controller);
    controller.submit().await.unwrap();

    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert!(controller.copy_to_clipboard("prompt").await);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(controller.toast().unwrap().text, "Prompt copied to clipboard!");

    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert!(controller.toast().is_none());
}

#[tokio::test]
async fn copy_empty_text_does_nothing() {
    let clipboard = Arc::new(MockClipboard::new());
    let controller = controller_with(
        Arc::new(MockBackend::new()),
        Arc::new(MemoryCredentialStore::new()),
    )
    .with_clipboard(clipboard.clone());

    assert!(!controller.copy_to_clipboard("").await);
    assert!(clipboard.writes().is_empty());
    assert!(controller.toast().is_none());
    assert!(!controller.copied());
}

#[tokio::test(start_paused = true)]
async fn copied_flag_resets() {
    let clipboard = Arc::new(MockClipboard::new());
    let controller = controller_with(
        Arc::new(MockBackend::new()),
        Arc::new(MemoryCredentialStore::new()),
    )
    .with_clipboard(clipboard.clone());

    assert!(controller.copy_to_clipboard("the prompt").await);
    assert_eq!(clipboard.writes(), vec!["the prompt".to_string()]);
    assert!(controller.copied());
    assert_eq!(controller.toast().unwrap().kind, ToastKind::Success);

    tokio::time::sleep(Duration::from_millis(1999)).await;
    assert!(controller.copied());
    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(!controller.copied());
}

#[tokio::test]
async fn denied_clipboard_reports_error() {
    let controller = controller_with(
        Arc::new(MockBackend::new()),
        Arc::new(MemoryCredentialStore::new()),
    )
    .with_clipboard(Arc::new(MockClipboard::denied()));

    assert!(!controller.copy_to_clipboard("the prompt").await);
    assert!(!controller.copied());

    let toast = controller.toast().unwrap();
    assert_eq!(toast.kind, ToastKind::Error);
    assert_eq!(toast.text, "Failed to copy prompt");
}

#[tokio::test(start_paused = true)]
async fn copy_and_open_opens_after_delay() {
    let clipboard = Arc::new(MockClipboard::new());
    let opener = Arc::new(MockOpener::new());
    let controller = controller_with(
        Arc::new(MockBackend::new()),
        Arc::new(MemoryCredentialStore::new()),
    )
    .with_clipboard(clipboard.clone())
    .with_opener(opener.clone());

    let claude = Platform::find(controller.platforms(), "claude").unwrap().clone();
    let pending = controller.copy_and_open("the prompt", &claude).await.unwrap();

    assert_eq!(clipboard.writes(), vec!["the prompt".to_string()]);
    assert_eq!(controller.toast().unwrap().text, "Prompt copied! Opening Claude...");
    assert!(opener.opened().is_empty());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(opener.opened().is_empty());

    assert!(pending.wait().await);
    assert_eq!(opener.opened(), vec!["https://claude.ai/new".to_string()]);
}

#[tokio::test]
async fn copy_and_open_without_clipboard_opens_nothing() {
    let opener = Arc::new(MockOpener::new());
    let controller = controller_with(
        Arc::new(MockBackend::new()),
        Arc::new(MemoryCredentialStore::new()),
    )
    .with_clipboard(Arc::new(MockClipboard::denied()))
    .with_opener(opener.clone());

    let platform = controller.platforms()[0].clone();
    assert!(controller.copy_and_open("the prompt", &platform).await.is_none());
    assert_eq!(controller.toast().unwrap().kind, ToastKind::Error);
    assert!(opener.opened().is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_open() {
    let opener = Arc::new(MockOpener::new());
    let controller = controller_with(
        Arc::new(MockBackend::new()),
        Arc::new(MemoryCredentialStore::new()),
    )
    .with_clipboard(Arc::new(MockClipboard::new()))
    .with_opener(opener.clone());

    let platform = controller.platforms()[0].clone();
    let pending = controller.copy_and_open("the prompt", &platform).await.unwrap();

    controller.shutdown();
    assert!(!pending.wait().await);
    assert!(opener.opened().is_empty());
}

#[tokio::test(start_paused = true)]
async fn timers_after_drop_are_harmless() {
    let opener = Arc::new(MockOpener::new());
    let controller = controller_with(
        Arc::new(MockBackend::new()),
        Arc::new(MemoryCredentialStore::new()),
    )
    .with_clipboard(Arc::new(MockClipboard::new()))
    .with_opener(opener.clone());
    ready(&controller);
    controller.submit().await.unwrap();

    let platform = controller.platforms()[1].clone();
    let pending = controller.copy_and_open("the prompt", &platform).await.unwrap();
    drop(controller);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(!pending.wait().await);
    assert!(opener.opened().is_empty());
}

#[tokio::test]
async fn key_panel_toggles() {
    let controller = controller_with(
        Arc::new(MockBackend::new()),
        Arc::new(MemoryCredentialStore::new()),
    );
    assert!(!controller.key_panel_open());
    controller.toggle_key_panel();
    assert!(controller.key_panel_open());
    controller.close_key_panel();
    assert!(!controller.key_panel_open());
    controller.open_key_panel();
    assert!(controller.key_panel_open());
}
