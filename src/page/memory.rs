//! In-process hosts used by the command-line driver and the test suite.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{Element, FormSnapshot, IdentityWidget, Navigator, Page, ToastSurface};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct MemoryPage {
    body: Option<Element>,
    form: Mutex<Option<FormSnapshot>>,
    path: String,
    user_agent: String,
}

impl MemoryPage {
    pub fn new(body: Option<Element>, form: Option<FormSnapshot>) -> Self {
        Self {
            body,
            form: Mutex::new(form),
            path: "/".to_string(),
            user_agent: format!("signin-relay/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Simulates the user typing into a field.
    pub fn set_field(&self, name: &str, value: &str) {
        let mut form = lock(&self.form);
        form.get_or_insert_with(FormSnapshot::default).set(name, value);
    }
}

impl Page for MemoryPage {
    fn body(&self) -> Option<Element> {
        self.body.clone()
    }

    fn form(&self) -> Option<FormSnapshot> {
        lock(&self.form).clone()
    }

    fn location_path(&self) -> String {
        self.path.clone()
    }

    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToastState {
    pub text: String,
    pub error: bool,
    pub visible: bool,
}

#[derive(Default)]
pub struct MemoryToast {
    state: Mutex<ToastState>,
    shown: Mutex<Vec<ToastState>>,
}

impl MemoryToast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ToastState {
        lock(&self.state).clone()
    }

    /// Every state the toast was in when it was made visible, oldest first.
    pub fn shown(&self) -> Vec<ToastState> {
        lock(&self.shown).clone()
    }

    pub fn last_shown(&self) -> Option<ToastState> {
        lock(&self.shown).last().cloned()
    }
}

impl ToastSurface for MemoryToast {
    fn set_text(&self, text: &str) {
        lock(&self.state).text = text.to_string();
    }

    fn set_error(&self, error: bool) {
        lock(&self.state).error = error;
    }

    fn set_visible(&self, visible: bool) {
        let mut state = lock(&self.state);
        state.visible = visible;
        if visible {
            tracing::info!(error = state.error, "toast: {}", state.text);
            lock(&self.shown).push(state.clone());
        }
    }
}

#[derive(Default)]
pub struct MemoryNavigator {
    visits: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<String> {
        lock(&self.visits).clone()
    }
}

impl Navigator for MemoryNavigator {
    fn assign(&self, href: &str) {
        tracing::info!("navigate: {href}");
        lock(&self.visits).push(href.to_string());
    }
}

pub struct MemoryWidget {
    container: bool,
    loaded: AtomicBool,
    load_checks: AtomicUsize,
    client_id: Mutex<Option<String>>,
    buttons: AtomicUsize,
    notice: Mutex<Option<String>>,
}

impl MemoryWidget {
    pub fn new(container: bool, loaded: bool) -> Self {
        Self {
            container,
            loaded: AtomicBool::new(loaded),
            load_checks: AtomicUsize::new(0),
            client_id: Mutex::new(None),
            buttons: AtomicUsize::new(0),
            notice: Mutex::new(None),
        }
    }

    /// Marks the widget library as loaded, as if its script just finished.
    pub fn finish_loading(&self) {
        self.loaded.store(true, Ordering::SeqCst);
    }

    pub fn load_checks(&self) -> usize {
        self.load_checks.load(Ordering::SeqCst)
    }

    pub fn client_id(&self) -> Option<String> {
        lock(&self.client_id).clone()
    }

    pub fn buttons_rendered(&self) -> usize {
        self.buttons.load(Ordering::SeqCst)
    }

    pub fn notice(&self) -> Option<String> {
        lock(&self.notice).clone()
    }
}

impl IdentityWidget for MemoryWidget {
    fn has_container(&self) -> bool {
        self.container
    }

    fn is_loaded(&self) -> bool {
        self.load_checks.fetch_add(1, Ordering::SeqCst);
        self.loaded.load(Ordering::SeqCst)
    }

    fn initialize(&self, client_id: &str) {
        *lock(&self.client_id) = Some(client_id.to_string());
    }

    fn render_button(&self) {
        self.buttons.fetch_add(1, Ordering::SeqCst);
    }

    fn render_notice(&self, text: &str) {
        tracing::info!("widget notice: {text}");
        *lock(&self.notice) = Some(text.to_string());
    }
}
