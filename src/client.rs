use async_trait::async_trait;
use serde_json::Value;

use crate::error::AuthError;
use crate::payload::SubmissionRecord;

/// Sends one record to the remote endpoint. Exactly one attempt per call.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, record: &SubmissionRecord) -> Result<Value, AuthError>;
}

pub struct SubmissionClient {
    http: reqwest::Client,
    endpoint: Option<String>,
}

impl SubmissionClient {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }
}

#[async_trait]
impl Submitter for SubmissionClient {
    async fn submit(&self, record: &SubmissionRecord) -> Result<Value, AuthError> {
        let url = self
            .endpoint
            .as_deref()
            .ok_or_else(|| AuthError::Config("Submission endpoint URL is not configured".into()))?;

        let resp = self
            .http
            .post(url)
            .header("Content-Type", "application/json")
            .json(record)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        interpret(status.as_u16(), status.is_success(), &text)
    }
}

/// Classifies a received response. The endpoint always answers JSON; any
/// other body is a protocol violation and is reported verbatim.
pub fn interpret(status: u16, success: bool, body: &str) -> Result<Value, AuthError> {
    let parsed: Value = serde_json::from_str(body).map_err(|_| AuthError::Protocol {
        status,
        body: body.to_string(),
    })?;

    if !success || !truthy(parsed.get("ok")) {
        let message = ["message", "error"]
            .iter()
            .find_map(|key| parsed.get(*key).and_then(Value::as_str))
            .map(str::to_string);
        return Err(AuthError::Remote { status, message });
    }

    Ok(parsed)
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
