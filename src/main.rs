use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use signin_relay::config::Config;
use signin_relay::page::memory::{MemoryNavigator, MemoryPage, MemoryToast, MemoryWidget};
use signin_relay::page::{Element, FormSnapshot, Host};
use signin_relay::{Attempt, Controller, CredentialResponse};

/// A page as seen at submit time: body markers, form values and, for the
/// federated path, the widget's callback payload.
#[derive(Debug, Deserialize)]
struct PageFile {
    #[serde(default)]
    body: HashMap<String, String>,
    #[serde(default)]
    form: Option<FormSnapshot>,
    #[serde(default = "default_path")]
    path: String,
    #[serde(default)]
    user_agent: Option<String>,
    #[serde(default)]
    google: Option<CredentialResponse>,
}

fn default_path() -> String {
    "/".to_string()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let raw = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read page file {path}: {e}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let page_file: PageFile =
        serde_json::from_str(&raw).map_err(|e| format!("Invalid page file: {e}"))?;

    let body = Element::from_attributes(
        page_file
            .body
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str())),
    );
    let mut page = MemoryPage::new(Some(body), page_file.form).with_path(page_file.path);
    if let Some(user_agent) = page_file.user_agent {
        page = page.with_user_agent(user_agent);
    }

    let host = Host {
        page: Arc::new(page),
        toast: Some(Arc::new(MemoryToast::new())),
        navigator: Arc::new(MemoryNavigator::new()),
        widget: Arc::new(MemoryWidget::new(true, true)),
    };

    let Some(controller) = Controller::attach(&config, host) else {
        tracing::info!("Page has no data-auth-page marker, nothing to do");
        return Ok(());
    };

    tracing::info!("Attached to {} page", controller.context().page_type);
    controller.on_load();
    controller.init_widget().await;

    let attempt = match page_file.google {
        Some(response) => controller.handle_credential(response).await,
        None => controller.submit_form().await,
    };

    match attempt {
        Attempt::Succeeded(body) => {
            tracing::info!("Endpoint accepted submission: {body}");
            tokio::time::sleep(config.redirect_delay + Duration::from_millis(50)).await;
            Ok(())
        }
        Attempt::Failed(err) => Err(err.into()),
        Attempt::Ignored => Ok(()),
    }
}
