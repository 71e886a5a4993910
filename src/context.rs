use std::fmt;
use std::time::Duration;

use crate::attributes;
use crate::config::Config;
use crate::page::Page;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageType {
    Login,
    Signup,
    Other(String),
}

impl PageType {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "login" => PageType::Login,
            "signup" => PageType::Signup,
            other => PageType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PageType::Login => "login",
            PageType::Signup => "signup",
            PageType::Other(tag) => tag,
        }
    }

    pub fn is_signup(&self) -> bool {
        matches!(self, PageType::Signup)
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read once when the controller attaches, constant afterwards.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub page_type: PageType,
    pub endpoint_url: Option<String>,
    pub google_client_id: Option<String>,
    pub toast_duration: Duration,
    pub redirect_delay: Duration,
    pub widget_retry: Duration,
    pub redirect_to: String,
}

impl PageContext {
    /// Returns `None` when the page carries no `data-auth-page` marker.
    pub fn resolve(config: &Config, page: &dyn Page) -> Option<Self> {
        let body = page.body();
        let tag = attributes::read_text(body.as_ref(), "auth-page")?;
        let tag = tag.trim();
        if tag.is_empty() {
            return None;
        }

        Some(PageContext {
            page_type: PageType::parse(tag),
            endpoint_url: config.endpoint_url.clone(),
            google_client_id: config.google_client_id.clone(),
            toast_duration: config.toast_duration,
            redirect_delay: config.redirect_delay,
            widget_retry: config.widget_retry,
            redirect_to: config.redirect_to.clone(),
        })
    }

    pub fn source_tag(&self, method: &str) -> String {
        format!("{}-{method}", self.page_type)
    }
}
