//! Reads the claims out of a federated sign-in credential (a JWT).
//!
//! The signature is NOT checked. The credential is only trusted because it
//! arrives through the sign-in widget's own verified callback; do not feed
//! tokens from any other source through this decoder.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AuthError;

/// Standard alphabet, padding optional: JWT segments are unpadded.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
    pub subject: String,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
}

pub fn decode(token: &str) -> Result<IdentityProfile, AuthError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(AuthError::Decode(format!(
            "expected 3 token segments, found {}",
            segments.len()
        )));
    }

    let standard = segments[1].replace('-', "+").replace('_', "/");

    let bytes = PAYLOAD_ENGINE
        .decode(standard.as_bytes())
        .map_err(|e| AuthError::Decode(format!("invalid base64 payload: {e}")))?;

    // Claims are UTF-8 JSON; names routinely carry non-ASCII characters.
    let text = String::from_utf8(bytes)
        .map_err(|e| AuthError::Decode(format!("payload is not UTF-8: {e}")))?;

    let claims: Map<String, Value> = match serde_json::from_str(&text) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(AuthError::Decode("payload is not a JSON object".to_string())),
        Err(e) => return Err(AuthError::Decode(format!("invalid JSON payload: {e}"))),
    };

    Ok(IdentityProfile {
        subject: claim(&claims, "sub"),
        name: claim(&claims, "name"),
        email: claim(&claims, "email"),
        avatar_url: claim(&claims, "picture"),
    })
}

fn claim(claims: &Map<String, Value>, key: &str) -> String {
    match claims.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
