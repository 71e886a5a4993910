use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::page::Element;

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_\s.]+(.)?").expect("separator pattern is valid"));

/// Converts `navbar-light-on-scroll`, `auth_page` or `auth page` into the
/// camel-case form used for dataset lookups.
pub fn camelize(key: &str) -> String {
    let joined = SEPARATORS.replace_all(key, |caps: &regex::Captures| {
        caps.get(1)
            .map(|m| m.as_str().to_uppercase())
            .unwrap_or_default()
    });

    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Reads a data attribute, decoding it as JSON when it parses and returning
/// the raw string otherwise. `None` means the element or attribute is absent;
/// `"0"` and `"false"` come back as JSON values, not as absence.
pub fn read_data(element: Option<&Element>, key: &str) -> Option<Value> {
    let raw = element?.dataset(&camelize(key))?;
    Some(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
}

/// Reads a data attribute as text, whatever JSON shape it happens to parse to.
pub fn read_text(element: Option<&Element>, key: &str) -> Option<String> {
    match read_data(element, key)? {
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn camelize_handles_all_separators() {
        assert_eq!(camelize("navbar-light-on-scroll"), "navbarLightOnScroll");
        assert_eq!(camelize("auth_page"), "authPage");
        assert_eq!(camelize("auth page"), "authPage");
        assert_eq!(camelize("auth.page"), "authPage");
        assert_eq!(camelize("Auth--page"), "authPage");
        assert_eq!(camelize("trailing-"), "trailing");
    }

    #[test]
    fn json_values_are_decoded() {
        let el = Element::from_attributes([
            ("data-offset", "0"),
            ("data-enabled", "false"),
            ("data-options", r#"{"size":"large"}"#),
            ("data-auth-page", "signup"),
        ]);

        assert_eq!(read_data(Some(&el), "offset"), Some(json!(0)));
        assert_eq!(read_data(Some(&el), "enabled"), Some(json!(false)));
        assert_eq!(read_data(Some(&el), "options"), Some(json!({"size": "large"})));
        assert_eq!(read_data(Some(&el), "auth-page"), Some(json!("signup")));
    }

    #[test]
    fn absence_is_distinct_from_falsy_values() {
        let el = Element::from_attributes([("data-enabled", "false")]);
        assert_eq!(read_data(Some(&el), "missing"), None);
        assert_eq!(read_data(None, "enabled"), None);
        assert!(read_data(Some(&el), "enabled").is_some());
    }

    #[test]
    fn reading_twice_is_stable() {
        let el = Element::from_attributes([("data-auth-page", "login")]);
        assert_eq!(read_data(Some(&el), "auth-page"), read_data(Some(&el), "auth-page"));
    }

    #[test]
    fn read_text_stringifies_json() {
        let el = Element::from_attributes([("data-count", "3"), ("data-name", "x")]);
        assert_eq!(read_text(Some(&el), "count").as_deref(), Some("3"));
        assert_eq!(read_text(Some(&el), "name").as_deref(), Some("x"));
    }
}
