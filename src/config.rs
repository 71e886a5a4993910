use std::time::Duration;

/// Marker left in page templates until the operator fills in a real value.
const PLACEHOLDER_MARKER: &str = "PASTE";

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint_url: Option<String>,
    pub google_client_id: Option<String>,
    pub toast_duration: Duration,
    pub redirect_delay: Duration,
    pub widget_retry: Duration,
    pub redirect_to: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            google_client_id: None,
            toast_duration: Duration::from_millis(4000),
            redirect_delay: Duration::from_millis(1600),
            widget_retry: Duration::from_millis(120),
            redirect_to: "/".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Config::default();

        let endpoint_url = configured(std::env::var("SIGNIN_ENDPOINT_URL").ok());
        let google_client_id = configured(std::env::var("SIGNIN_GOOGLE_CLIENT_ID").ok());

        let toast_duration = env_millis("SIGNIN_TOAST_MS", defaults.toast_duration)?;
        let redirect_delay = env_millis("SIGNIN_REDIRECT_MS", defaults.redirect_delay)?;
        let widget_retry = env_millis("SIGNIN_WIDGET_RETRY_MS", defaults.widget_retry)?;
        if widget_retry.is_zero() {
            return Err("Invalid SIGNIN_WIDGET_RETRY_MS: must be greater than zero".to_string());
        }

        let redirect_to = env_or("SIGNIN_REDIRECT_TO", &defaults.redirect_to);
        let log_level = env_or("SIGNIN_LOG_LEVEL", &defaults.log_level);

        Ok(Config {
            endpoint_url,
            google_client_id,
            toast_duration,
            redirect_delay,
            widget_retry,
            redirect_to,
            log_level,
        })
    }

    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = configured(Some(url.into()));
        self
    }

    pub fn with_google_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.google_client_id = configured(Some(client_id.into()));
        self
    }
}

/// Treats empty values and unreplaced template placeholders as absent.
pub fn configured(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.contains(PLACEHOLDER_MARKER))
}

fn env_millis(key: &str, default: Duration) -> Result<Duration, String> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| format!("Invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 7] = [
        "SIGNIN_ENDPOINT_URL",
        "SIGNIN_GOOGLE_CLIENT_ID",
        "SIGNIN_TOAST_MS",
        "SIGNIN_REDIRECT_MS",
        "SIGNIN_WIDGET_RETRY_MS",
        "SIGNIN_REDIRECT_TO",
        "SIGNIN_LOG_LEVEL",
    ];

    #[test]
    fn defaults_when_nothing_is_set() {
        let unset: Vec<(&str, Option<&str>)> = VARS.iter().map(|k| (*k, None)).collect();
        temp_env::with_vars(unset, || {
            let config = Config::from_env().unwrap();
            assert!(config.endpoint_url.is_none());
            assert!(config.google_client_id.is_none());
            assert_eq!(config.toast_duration, Duration::from_secs(4));
            assert_eq!(config.redirect_delay, Duration::from_millis(1600));
            assert_eq!(config.redirect_to, "/");
        });
    }

    #[test]
    fn placeholders_count_as_missing() {
        temp_env::with_vars(
            [
                ("SIGNIN_ENDPOINT_URL", Some("PASTE_YOUR_URL_HERE")),
                ("SIGNIN_GOOGLE_CLIENT_ID", Some("  ")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.endpoint_url.is_none());
                assert!(config.google_client_id.is_none());
            },
        );
    }

    #[test]
    fn reads_endpoint_and_timings() {
        temp_env::with_vars(
            [
                ("SIGNIN_ENDPOINT_URL", Some("https://example.test/exec")),
                ("SIGNIN_GOOGLE_CLIENT_ID", Some("123.apps.googleusercontent.com")),
                ("SIGNIN_REDIRECT_MS", Some("1800")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.endpoint_url.as_deref(), Some("https://example.test/exec"));
                assert_eq!(
                    config.google_client_id.as_deref(),
                    Some("123.apps.googleusercontent.com")
                );
                assert_eq!(config.redirect_delay, Duration::from_millis(1800));
            },
        );
    }

    #[test]
    fn rejects_malformed_durations() {
        temp_env::with_var("SIGNIN_TOAST_MS", Some("soon"), || {
            let err = Config::from_env().unwrap_err();
            assert!(err.contains("SIGNIN_TOAST_MS"));
        });
        temp_env::with_var("SIGNIN_WIDGET_RETRY_MS", Some("0"), || {
            assert!(Config::from_env().is_err());
        });
    }
}
