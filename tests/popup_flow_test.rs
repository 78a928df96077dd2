//! Popup integration tests: HTTP token endpoint, loopback provider, popup host

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use tokio::sync::mpsc;

use callpad::domain::call::{Action, ActionSet, SessionState};
use callpad::domain::device::DeviceOptions;
use callpad::domain::log::{LogEntry, Severity};
use callpad::domain::settings::{SettingKey, SettingsStore};
use callpad::domain::shared::value_objects::ProviderCallId;
use callpad::infrastructure::provider::{LoopbackProvider, ProviderRequest};
use callpad::infrastructure::settings::{MemorySettingsStore, TomlFileSettingsStore};
use callpad::infrastructure::token::HttpTokenProvider;
use callpad::interface::{ActionPresenter, Popup, PopupCommand};
use callpad::CallSessionController;

#[derive(Default)]
struct Rendered {
    actions: Vec<ActionSet>,
    setup_offered: Option<bool>,
    identity: Option<String>,
    call_id: Option<ProviderCallId>,
    log: Vec<String>,
}

/// Presenter that records what it was asked to show
#[derive(Clone, Default)]
struct RecordingPresenter(Arc<Mutex<Rendered>>);

impl RecordingPresenter {
    fn last_actions(&self) -> Option<ActionSet> {
        self.0.lock().unwrap().actions.last().cloned()
    }
}

impl ActionPresenter for RecordingPresenter {
    fn present_actions(&mut self, actions: &ActionSet) {
        self.0.lock().unwrap().actions.push(actions.clone());
    }

    fn present_setup(&mut self, offered: bool) {
        self.0.lock().unwrap().setup_offered = Some(offered);
    }

    fn present_identity(&mut self, identity: &str) {
        self.0.lock().unwrap().identity = Some(identity.to_string());
    }

    fn present_call_id(&mut self, call_id: Option<&ProviderCallId>) {
        self.0.lock().unwrap().call_id = call_id.cloned();
    }

    fn append_log(&mut self, entry: &LogEntry) {
        self.0.lock().unwrap().log.push(entry.to_string());
    }
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/token", addr)
}

async fn token_endpoint(status: StatusCode, body: Value) -> String {
    let app = Router::new().route(
        "/token",
        get(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    );
    serve(app).await
}

async fn popup_with(
    token_url: &str,
    provider: &LoopbackProvider,
    settings: Arc<dyn SettingsStore>,
    presenter: RecordingPresenter,
) -> Popup {
    settings.set(SettingKey::TokenUrl, token_url).await.unwrap();
    settings.set(SettingKey::Number, "+15550100").await.unwrap();

    let tokens = Arc::new(HttpTokenProvider::new(Duration::from_secs(5)).unwrap());
    let controller = CallSessionController::new(
        tokens,
        Arc::new(provider.clone()),
        DeviceOptions { debug: true },
    );
    Popup::load(controller, settings, Box::new(presenter)).await
}

async fn alice_popup(provider: &LoopbackProvider, presenter: RecordingPresenter) -> Popup {
    let url = token_endpoint(StatusCode::OK, json!({"token": "abc", "identity": "alice"})).await;
    popup_with(&url, provider, Arc::new(MemorySettingsStore::new()), presenter).await
}

#[tokio::test]
async fn test_setup_against_token_endpoint() {
    let provider = LoopbackProvider::new();
    let presenter = RecordingPresenter::default();
    let mut popup = alice_popup(&provider, presenter.clone()).await;
    assert_eq!(presenter.0.lock().unwrap().setup_offered, Some(true));
    assert_eq!(presenter.0.lock().unwrap().log, vec!["INFO: App rendered."]);

    popup.dispatch(PopupCommand::SetupDevice).await;
    popup.process_pending_events();

    let controller = popup.controller();
    assert_eq!(controller.state(), SessionState::Idle);
    assert_eq!(controller.actions(), &ActionSet::only(Action::Call));
    assert_eq!(controller.identity(), Some("alice"));

    let rendered = presenter.0.lock().unwrap();
    assert_eq!(rendered.identity.as_deref(), Some("alice"));
    assert_eq!(rendered.actions.last(), Some(&ActionSet::only(Action::Call)));
    assert_eq!(rendered.setup_offered, Some(false));
    assert_eq!(provider.requests(), vec![ProviderRequest::Register { debug: true }]);
}

#[tokio::test]
async fn test_non_200_endpoint_is_a_setup_error() {
    let provider = LoopbackProvider::new();
    let presenter = RecordingPresenter::default();
    let url = token_endpoint(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"token": "abc", "identity": "alice"}),
    )
    .await;
    let mut popup = popup_with(
        &url,
        &provider,
        Arc::new(MemorySettingsStore::new()),
        presenter.clone(),
    )
    .await;

    popup.dispatch(PopupCommand::Perform(Action::Call)).await;

    let controller = popup.controller();
    assert_eq!(controller.state(), SessionState::Unset);
    assert_eq!(controller.log().count(Severity::Error), 1);
    assert_eq!(
        presenter.0.lock().unwrap().log.last().map(String::as_str),
        Some("ERROR: Cannot get token from the url provided")
    );
    assert_eq!(presenter.last_actions(), Some(ActionSet::only(Action::Call)));
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn test_malformed_token_body_is_a_setup_error() {
    let provider = LoopbackProvider::new();
    let app = Router::new().route("/token", get(|| async { "<html>login</html>" }));
    let url = serve(app).await;
    let mut popup = popup_with(
        &url,
        &provider,
        Arc::new(MemorySettingsStore::new()),
        RecordingPresenter::default(),
    )
    .await;

    popup.dispatch(PopupCommand::SetupDevice).await;

    assert_eq!(popup.controller().state(), SessionState::Unset);
    assert_eq!(popup.controller().log().count(Severity::Error), 1);
}

#[tokio::test]
async fn test_call_from_unset_then_remote_answer_and_hangup() {
    let provider = LoopbackProvider::new();
    let presenter = RecordingPresenter::default();
    let mut popup = alice_popup(&provider, presenter.clone()).await;

    popup.dispatch(PopupCommand::Perform(Action::Call)).await;
    popup.process_pending_events();
    assert_eq!(popup.controller().state(), SessionState::Dialing);
    assert_eq!(
        provider.requests(),
        vec![
            ProviderRequest::Register { debug: true },
            ProviderRequest::Connect {
                to: "+15550100".to_string()
            },
        ]
    );

    let call_id = provider.remote_answer().unwrap();
    popup.process_pending_events();
    assert_eq!(popup.controller().state(), SessionState::OnCall);
    assert_eq!(presenter.0.lock().unwrap().call_id, Some(call_id));
    assert_eq!(presenter.last_actions(), Some(ActionSet::only(Action::Hangup)));

    popup.dispatch(PopupCommand::Perform(Action::Hangup)).await;
    popup.process_pending_events();
    assert_eq!(popup.controller().state(), SessionState::Idle);
    assert_eq!(presenter.last_actions(), Some(ActionSet::only(Action::Call)));

    let log = presenter.0.lock().unwrap().log.clone();
    assert!(log.contains(&"INFO: Calling +15550100".to_string()));
    assert!(log.contains(&"INFO: Connection established".to_string()));
    assert!(log.contains(&"INFO: Hanging up".to_string()));
    assert_eq!(log.last().map(String::as_str), Some("INFO: Call disconnected"));
}

#[tokio::test]
async fn test_incoming_call_accepted() {
    let provider = LoopbackProvider::new();
    let presenter = RecordingPresenter::default();
    let mut popup = alice_popup(&provider, presenter.clone()).await;
    popup.dispatch(PopupCommand::SetupDevice).await;
    popup.process_pending_events();

    provider.ring_in("+15551234");
    popup.process_pending_events();
    assert_eq!(
        presenter.last_actions(),
        Some(ActionSet::from_iter([Action::Accept, Action::Reject, Action::Ignore]))
    );

    popup.dispatch(PopupCommand::Perform(Action::Accept)).await;
    assert_eq!(presenter.last_actions(), Some(ActionSet::only(Action::Hangup)));

    // provider confirms media; still one call
    popup.process_pending_events();
    assert_eq!(popup.controller().state(), SessionState::OnCall);

    provider.remote_hangup();
    popup.process_pending_events();
    assert_eq!(popup.controller().state(), SessionState::Idle);
}

#[tokio::test]
async fn test_incoming_cancelled_by_caller() {
    let provider = LoopbackProvider::new();
    let presenter = RecordingPresenter::default();
    let mut popup = alice_popup(&provider, presenter.clone()).await;
    popup.dispatch(PopupCommand::SetupDevice).await;
    popup.process_pending_events();

    provider.ring_in("+15551234");
    provider.remote_cancel();
    popup.process_pending_events();

    assert_eq!(popup.controller().state(), SessionState::Idle);
    assert_eq!(presenter.last_actions(), Some(ActionSet::only(Action::Call)));
}

#[tokio::test]
async fn test_run_loop_serves_commands() {
    let provider = LoopbackProvider::new();
    let mut popup = alice_popup(&provider, RecordingPresenter::default()).await;

    let (tx, rx) = mpsc::channel(4);
    tx.send(PopupCommand::SetNumber("+15550177".to_string())).await.unwrap();
    tx.send(PopupCommand::Perform(Action::Call)).await.unwrap();
    drop(tx);

    popup.run(rx).await;
    popup.process_pending_events();

    assert_eq!(popup.controller().state(), SessionState::Dialing);
    assert!(provider.requests().contains(&ProviderRequest::Connect {
        to: "+15550177".to_string()
    }));
}

#[tokio::test]
async fn test_settings_survive_a_fresh_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    let provider = LoopbackProvider::new();

    let mut first = popup_with(
        "https://tokens.example/a",
        &provider,
        Arc::new(TomlFileSettingsStore::new(&path)),
        RecordingPresenter::default(),
    )
    .await;
    first
        .dispatch(PopupCommand::SetTokenUrl("https://tokens.example/b".to_string()))
        .await;
    first
        .dispatch(PopupCommand::SetNumber("+44 20 7946 0000".to_string()))
        .await;
    drop(first);

    let controller = CallSessionController::new(
        Arc::new(HttpTokenProvider::new(Duration::from_secs(1)).unwrap()),
        Arc::new(provider.clone()),
        DeviceOptions::default(),
    );
    let second = Popup::load(
        controller,
        Arc::new(TomlFileSettingsStore::new(&path)),
        Box::new(RecordingPresenter::default()),
    )
    .await;

    assert_eq!(second.controller().token_url(), "https://tokens.example/b");
    assert_eq!(second.controller().remote_address(), "+44 20 7946 0000");
}
