use std::fmt;

/// Which trigger an attempt came from. Generic failure text differs per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Form,
    Google,
}

const FORM_RETRY: &str = "Unable to send right now. Please try again.";
const GOOGLE_RETRY: &str = "Google sign-in failed. Please try again.";
const GOOGLE_PROFILE: &str = "Unable to read Google profile.";
const NOT_CONFIGURED: &str = "Sign-in is not configured yet. Please try again later.";

#[derive(Debug)]
pub enum AuthError {
    Config(String),
    Validation(String),
    Decode(String),
    Network(reqwest::Error),
    Protocol { status: u16, body: String },
    Remote { status: u16, message: Option<String> },
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Config(msg) => write!(f, "Config error: {msg}"),
            AuthError::Validation(msg) => write!(f, "Validation error: {msg}"),
            AuthError::Decode(msg) => write!(f, "Credential decode error: {msg}"),
            AuthError::Network(err) => write!(f, "Network error: {err}"),
            AuthError::Protocol { status, body } => {
                write!(f, "Endpoint returned non-JSON ({status}): {body}")
            }
            AuthError::Remote { status, message } => match message {
                Some(msg) => write!(f, "Endpoint rejected submission ({status}): {msg}"),
                None => write!(f, "Endpoint rejected submission ({status})"),
            },
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Network(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Network(err)
    }
}

impl AuthError {
    /// Text shown in the toast for this failure.
    pub fn user_message(&self, channel: Channel) -> String {
        let generic = match channel {
            Channel::Form => FORM_RETRY,
            Channel::Google => GOOGLE_RETRY,
        };

        match self {
            AuthError::Validation(msg) => msg.clone(),
            AuthError::Config(_) => NOT_CONFIGURED.to_string(),
            AuthError::Decode(_) => GOOGLE_PROFILE.to_string(),
            AuthError::Network(_) | AuthError::Protocol { .. } => generic.to_string(),
            AuthError::Remote { message, .. } => message
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .unwrap_or(generic)
                .to_string(),
        }
    }

    /// Short classification used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Config(_) => "config",
            AuthError::Validation(_) => "validation",
            AuthError::Decode(_) => "decode",
            AuthError::Network(_) => "network",
            AuthError::Protocol { .. } => "protocol",
            AuthError::Remote { .. } => "remote",
        }
    }
}

/// Transport-level failure reported by the federated sign-in widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedError {
    pub code: String,
}

impl FederatedError {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    pub fn message(&self) -> String {
        match self.code.as_str() {
            "popup_closed_by_user" => {
                "Google popup closed before finishing. Please try again.".to_string()
            }
            "popup_failed_to_open" => {
                "Google popup was blocked. Allow popups for this site and try again.".to_string()
            }
            "access_denied" => "Google sign-in was cancelled.".to_string(),
            "idpiframe_initialization_failed" => {
                "Google Sign-In is not enabled for this site's origin.".to_string()
            }
            "immediate_failed" => "No Google session found. Please sign in again.".to_string(),
            "missing_credential" => "Google did not return a credential. Please try again.".to_string(),
            other => format!("Google Sign-In error: {other}"),
        }
    }
}

impl fmt::Display for FederatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Federated sign-in error: {}", self.code)
    }
}

impl std::error::Error for FederatedError {}

impl From<FederatedError> for AuthError {
    fn from(err: FederatedError) -> Self {
        AuthError::Validation(err.message())
    }
}
