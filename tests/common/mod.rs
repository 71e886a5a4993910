use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use serde_json::{Value, json};

use signin_relay::config::Config;
use signin_relay::page::memory::{MemoryNavigator, MemoryPage, MemoryToast, MemoryWidget};
use signin_relay::page::{Element, FormSnapshot, Host};
use signin_relay::Controller;

/// A request the stub endpoint received.
#[derive(Debug, Clone)]
pub struct Received {
    pub content_type: String,
    pub body: Value,
}

struct StubState {
    status: StatusCode,
    reply: String,
    delay: Duration,
    received: Mutex<Vec<Received>>,
}

/// A running stand-in for the remote submission endpoint.
pub struct StubEndpoint {
    pub addr: SocketAddr,
    state: Arc<StubState>,
}

impl StubEndpoint {
    pub fn url(&self) -> String {
        format!("http://{}/exec", self.addr)
    }

    pub fn received(&self) -> Vec<Received> {
        self.state.received.lock().unwrap().clone()
    }
}

async fn receive(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let body = serde_json::from_str(&body).unwrap_or(Value::String(body));
    state.received.lock().unwrap().push(Received { content_type, body });

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    (state.status, state.reply.clone())
}

/// Spawn a stub endpoint on an ephemeral port that answers every POST with
/// the given status and body.
pub async fn spawn_endpoint(status: u16, reply: &str) -> StubEndpoint {
    spawn_endpoint_with_delay(status, reply, Duration::ZERO).await
}

pub async fn spawn_endpoint_with_delay(status: u16, reply: &str, delay: Duration) -> StubEndpoint {
    let state = Arc::new(StubState {
        status: StatusCode::from_u16(status).unwrap(),
        reply: reply.to_string(),
        delay,
        received: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/exec", post(receive))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubEndpoint { addr, state }
}

pub fn ok_reply() -> String {
    json!({ "ok": true }).to_string()
}

/// Config with short timings so tests can wait out the redirect.
pub fn config(endpoint: Option<String>) -> Config {
    let mut config = Config::default().with_google_client_id("test-client.apps.googleusercontent.com");
    config.endpoint_url = endpoint;
    config.redirect_delay = Duration::from_millis(100);
    config.widget_retry = Duration::from_millis(120);
    config
}

/// An auth page wired to in-memory hosts.
pub struct TestPage {
    pub controller: Controller,
    pub page: Arc<MemoryPage>,
    pub toast: Arc<MemoryToast>,
    pub navigator: Arc<MemoryNavigator>,
    pub widget: Arc<MemoryWidget>,
}

pub fn attach(page_type: &str, fields: &[(&str, &str)], config: &Config) -> TestPage {
    attach_with_widget(page_type, fields, config, MemoryWidget::new(true, true))
}

pub fn attach_with_widget(
    page_type: &str,
    fields: &[(&str, &str)],
    config: &Config,
    widget: MemoryWidget,
) -> TestPage {
    let page = Arc::new(
        MemoryPage::new(
            Some(Element::from_attributes([("data-auth-page", page_type)])),
            Some(FormSnapshot::from_pairs(fields.iter().copied())),
        )
        .with_path(format!("/{page_type}.html"))
        .with_user_agent("Mozilla/5.0 (Test)"),
    );
    let toast = Arc::new(MemoryToast::new());
    let navigator = Arc::new(MemoryNavigator::new());
    let widget = Arc::new(widget);

    let host = Host {
        page: page.clone(),
        toast: Some(toast.clone()),
        navigator: navigator.clone(),
        widget: widget.clone(),
    };

    let controller = Controller::attach(config, host).expect("page has an auth marker");

    TestPage {
        controller,
        page,
        toast,
        navigator,
        widget,
    }
}

/// Mint a signed ID token. The key is arbitrary: the decoder never checks it.
pub fn id_token(claims: &Value) -> String {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        claims,
        &jsonwebtoken::EncodingKey::from_secret(b"not-googles-key"),
    )
    .unwrap()
}
