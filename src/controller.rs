//! Wires form submits and federated sign-in callbacks through validation,
//! payload building and submission, then reports the outcome.
//!
//! Each trigger runs `Idle -> Validating -> Submitting -> Succeeded | Failed`.
//! Only one attempt may be in flight; triggers arriving meanwhile are ignored.

use std::sync::{Arc, Mutex};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::client::{SubmissionClient, Submitter};
use crate::config::Config;
use crate::context::PageContext;
use crate::credential;
use crate::error::{AuthError, Channel, FederatedError};
use crate::page::Host;
use crate::payload::{self, FieldSet, Overrides, SubmissionRecord};
use crate::toast::Toaster;

const SUCCESS_MESSAGE: &str = "Request received! Redirecting…";
const WIDGET_NOTICE: &str = "Add your Google Client ID to enable this button.";

/// Substrings the widget library logs when it refuses to initialize.
const WIDGET_FAILURE_SIGNATURES: [&str; 3] = [
    "origin is not allowed for the given client id",
    "idpiframe_initialization_failed",
    "[gsi_logger]",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

impl Phase {
    fn is_busy(self) -> bool {
        matches!(self, Phase::Validating | Phase::Submitting)
    }
}

#[derive(Debug)]
pub enum Attempt {
    Succeeded(Value),
    Failed(AuthError),
    /// Another attempt was already in flight.
    Ignored,
}

impl Attempt {
    pub fn is_success(&self) -> bool {
        matches!(self, Attempt::Succeeded(_))
    }
}

/// What the sign-in widget hands to its callback: a credential, or an error code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CredentialResponse {
    #[serde(default)]
    pub credential: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CredentialResponse {
    pub fn with_credential(token: impl Into<String>) -> Self {
        Self {
            credential: Some(token.into()),
            error: None,
        }
    }

    pub fn with_error(code: impl Into<String>) -> Self {
        Self {
            credential: None,
            error: Some(code.into()),
        }
    }

    pub fn into_credential(self) -> Result<String, FederatedError> {
        if let Some(code) = self.error.filter(|c| !c.trim().is_empty()) {
            return Err(FederatedError::new(code.trim()));
        }
        self.credential
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| FederatedError::new("missing_credential"))
    }
}

/// Marks an attempt as in flight; the phase returns to `Idle` if the attempt
/// is dropped before it reaches a terminal state.
struct InFlight {
    phase: Arc<Mutex<Phase>>,
    settled: bool,
}

impl InFlight {
    fn begin(phase: &Arc<Mutex<Phase>>) -> Option<Self> {
        let mut current = phase.lock().unwrap_or_else(|p| p.into_inner());
        if current.is_busy() {
            return None;
        }
        *current = Phase::Validating;
        tracing::debug!("Phase -> Validating");
        Some(Self {
            phase: phase.clone(),
            settled: false,
        })
    }

    fn set(&self, next: Phase) {
        *self.phase.lock().unwrap_or_else(|p| p.into_inner()) = next;
        tracing::debug!("Phase -> {next:?}");
    }

    fn settle(mut self, terminal: Phase) {
        self.set(terminal);
        self.settled = true;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.settled {
            self.set(Phase::Idle);
        }
    }
}

pub struct Controller {
    ctx: PageContext,
    host: Host,
    toaster: Toaster,
    submitter: Arc<dyn Submitter>,
    phase: Arc<Mutex<Phase>>,
}

impl Controller {
    /// Attaches to an auth page, submitting over HTTP. Returns `None` when the
    /// page has no auth-page marker.
    pub fn attach(config: &Config, host: Host) -> Option<Self> {
        let submitter = Arc::new(SubmissionClient::new(config.endpoint_url.clone()));
        Self::with_submitter(config, host, submitter)
    }

    pub fn with_submitter(
        config: &Config,
        host: Host,
        submitter: Arc<dyn Submitter>,
    ) -> Option<Self> {
        let ctx = PageContext::resolve(config, host.page.as_ref())?;
        let toaster = Toaster::new(host.toast.clone(), ctx.toast_duration);

        Some(Self {
            ctx,
            host,
            toaster,
            submitter,
            phase: Arc::new(Mutex::new(Phase::Idle)),
        })
    }

    pub fn context(&self) -> &PageContext {
        &self.ctx
    }

    pub fn phase(&self) -> Phase {
        *self.phase.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Reports missing configuration once the page has loaded.
    pub fn on_load(&self) {
        if self.ctx.endpoint_url.is_none() {
            tracing::warn!("Submission endpoint URL is not configured; submissions will fail");
            self.toaster
                .error(&AuthError::Config(String::new()).user_message(Channel::Form));
        }
        if self.ctx.google_client_id.is_none() {
            tracing::warn!("Google client ID is not configured; sign-in button disabled");
        }
    }

    pub async fn submit_form(&self) -> Attempt {
        let Some(guard) = InFlight::begin(&self.phase) else {
            tracing::debug!("Form submit ignored, attempt already in flight");
            return Attempt::Ignored;
        };

        let form = self.host.page.form();
        let fields = FieldSet::gather(&self.ctx.page_type, form.as_ref());
        if let Err(err) = fields.validate(&self.ctx.page_type) {
            return self.fail(guard, Channel::Form, err);
        }

        let mut meta = Map::new();
        meta.insert("method".into(), Value::String("form".into()));

        let record = payload::build(
            &self.ctx,
            self.host.page.as_ref(),
            &self.ctx.source_tag("form"),
            Overrides::default(),
            meta,
        );

        match record {
            Ok(record) => self.send(guard, Channel::Form, record).await,
            Err(err) => self.fail(guard, Channel::Form, err),
        }
    }

    pub async fn handle_credential(&self, response: CredentialResponse) -> Attempt {
        let Some(guard) = InFlight::begin(&self.phase) else {
            tracing::debug!("Google callback ignored, attempt already in flight");
            return Attempt::Ignored;
        };

        let token = match response.into_credential() {
            Ok(token) => token,
            Err(err) => return self.fail(guard, Channel::Google, err.into()),
        };

        let profile = match credential::decode(&token) {
            Ok(profile) => profile,
            Err(err) => return self.fail(guard, Channel::Google, err),
        };

        let mut meta = Map::new();
        meta.insert("method".into(), Value::String("google".into()));
        meta.insert("googleId".into(), Value::String(profile.subject.clone()));
        meta.insert("googleAvatar".into(), Value::String(profile.avatar_url.clone()));

        let record = payload::build(
            &self.ctx,
            self.host.page.as_ref(),
            &self.ctx.source_tag("google"),
            Overrides::from_profile(&profile),
            meta,
        );

        match record {
            Ok(record) => self.send(guard, Channel::Google, record).await,
            Err(err) => self.fail(guard, Channel::Google, err),
        }
    }

    /// Sets up the sign-in button, polling until the widget library loads.
    pub async fn init_widget(&self) {
        let widget = &self.host.widget;
        if !widget.has_container() {
            return;
        }

        let Some(client_id) = self.ctx.google_client_id.as_deref() else {
            widget.render_notice(WIDGET_NOTICE);
            return;
        };

        while !widget.is_loaded() {
            tokio::time::sleep(self.ctx.widget_retry).await;
        }

        widget.initialize(client_id);
        widget.render_button();
        tracing::debug!("Google sign-in button rendered");
    }

    /// Routes a page-level error report into the toast if it is a known
    /// widget initialization failure. Returns whether it was handled.
    pub fn on_global_error(&self, message: &str) -> bool {
        let lowered = message.to_lowercase();
        if !WIDGET_FAILURE_SIGNATURES.iter().any(|sig| lowered.contains(sig)) {
            return false;
        }

        tracing::error!("Google sign-in widget failed to initialize: {message}");
        self.toaster
            .error(&FederatedError::new("idpiframe_initialization_failed").message());
        true
    }

    async fn send(&self, guard: InFlight, channel: Channel, record: SubmissionRecord) -> Attempt {
        guard.set(Phase::Submitting);
        tracing::debug!(source = record.source(), "Submitting record");

        match self.submitter.submit(&record).await {
            Ok(body) => self.succeed(guard, body),
            Err(err) => self.fail(guard, channel, err),
        }
    }

    fn succeed(&self, guard: InFlight, body: Value) -> Attempt {
        guard.settle(Phase::Succeeded);
        self.toaster.success(SUCCESS_MESSAGE);

        let navigator = self.host.navigator.clone();
        let delay = self.ctx.redirect_delay;
        let href = self.ctx.redirect_to.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.assign(&href);
        });

        Attempt::Succeeded(body)
    }

    fn fail(&self, guard: InFlight, channel: Channel, err: AuthError) -> Attempt {
        match &err {
            AuthError::Protocol { status, body } => {
                tracing::error!(status, body = %body, "Endpoint returned a non-JSON response");
            }
            AuthError::Decode(_) => tracing::error!(kind = err.kind(), "{err}"),
            AuthError::Validation(_) => tracing::debug!(kind = err.kind(), "{err}"),
            _ => tracing::warn!(kind = err.kind(), "{err}"),
        }

        guard.settle(Phase::Failed);
        self.toaster.error(&err.user_message(channel));
        Attempt::Failed(err)
    }
}
