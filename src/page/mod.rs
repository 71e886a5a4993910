//! Host surfaces the controller reads from and writes to. In a browser these
//! are the document body, the auth form, the toast element, `location` and
//! the federated sign-in widget; the controller only ever sees these traits.

pub mod memory;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// An element's `data-*` attributes, keyed the way `dataset` exposes them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    dataset: HashMap<String, String>,
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a raw HTML attribute such as `data-auth-page`. Non-`data-*`
    /// attributes are not part of the dataset and are ignored.
    pub fn with_attribute(mut self, attribute: &str, value: impl Into<String>) -> Self {
        if let Some(key) = dataset_key(attribute) {
            self.dataset.insert(key, value.into());
        }
        self
    }

    pub fn from_attributes<'a, I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        attributes
            .into_iter()
            .fold(Self::new(), |el, (name, value)| el.with_attribute(name, value))
    }

    /// Looks up a dataset entry by its camel-case key.
    pub fn dataset(&self, key: &str) -> Option<&str> {
        self.dataset.get(key).map(String::as_str)
    }
}

/// Converts `data-foo-bar` into the `fooBar` dataset key.
pub fn dataset_key(attribute: &str) -> Option<String> {
    let name = attribute.strip_prefix("data-")?;
    let mut key = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '-' {
            if let Some(next) = chars.peek().copied().filter(char::is_ascii_lowercase) {
                key.push(next.to_ascii_uppercase());
                chars.next();
                continue;
            }
        }
        key.push(c);
    }

    Some(key)
}

/// Current values of the auth form's named fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSnapshot {
    fields: HashMap<String, String>,
}

impl FormSnapshot {
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_string(), value.into());
    }
}

pub trait Page: Send + Sync {
    /// The `<body>` element, which carries the page-type marker.
    fn body(&self) -> Option<Element>;
    /// The auth form's current values, or `None` when the page has no form.
    fn form(&self) -> Option<FormSnapshot>;
    fn location_path(&self) -> String;
    fn user_agent(&self) -> String;
}

pub trait ToastSurface: Send + Sync {
    fn set_text(&self, text: &str);
    fn set_error(&self, error: bool);
    fn set_visible(&self, visible: bool);
}

pub trait Navigator: Send + Sync {
    fn assign(&self, href: &str);
}

pub trait IdentityWidget: Send + Sync {
    /// Whether the page has a container to render the sign-in button into.
    fn has_container(&self) -> bool;
    /// Whether the widget library script has finished loading.
    fn is_loaded(&self) -> bool;
    fn initialize(&self, client_id: &str);
    fn render_button(&self);
    /// Replaces the button container's content with a static notice.
    fn render_notice(&self, text: &str);
}

/// Everything the controller needs from its environment.
#[derive(Clone)]
pub struct Host {
    pub page: Arc<dyn Page>,
    pub toast: Option<Arc<dyn ToastSurface>>,
    pub navigator: Arc<dyn Navigator>,
    pub widget: Arc<dyn IdentityWidget>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_key_follows_browser_rules() {
        assert_eq!(dataset_key("data-auth-page").as_deref(), Some("authPage"));
        assert_eq!(
            dataset_key("data-navbar-light-on-scroll").as_deref(),
            Some("navbarLightOnScroll")
        );
        assert_eq!(dataset_key("data-x-1").as_deref(), Some("x-1"));
        assert_eq!(dataset_key("class"), None);
    }

    #[test]
    fn element_ignores_plain_attributes() {
        let el = Element::from_attributes([("id", "main"), ("data-auth-page", "login")]);
        assert_eq!(el.dataset("authPage"), Some("login"));
        assert_eq!(el.dataset("id"), None);
    }
}
