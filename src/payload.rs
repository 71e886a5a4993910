use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::{PageContext, PageType};
use crate::credential::IdentityProfile;
use crate::error::AuthError;
use crate::page::{FormSnapshot, Page};

/// The normalized record posted to the endpoint. Fields are only readable
/// once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    source: String,
    name: String,
    email: String,
    phone: String,
    country: String,
    meta: Map<String, Value>,
}

impl SubmissionRecord {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }
}

/// Trimmed form values. Absent fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub referral: String,
}

impl FieldSet {
    pub fn gather(page_type: &PageType, form: Option<&FormSnapshot>) -> Self {
        let field = |name: &str| {
            form.and_then(|f| f.get(name))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        if page_type.is_signup() {
            FieldSet {
                full_name: field("fullName"),
                email: field("email"),
                phone: field("phone"),
                country: field("country"),
                referral: field("referral"),
            }
        } else {
            FieldSet {
                email: field("identifier"),
                ..FieldSet::default()
            }
        }
    }

    pub fn validate(&self, page_type: &PageType) -> Result<(), AuthError> {
        if !page_type.is_signup() {
            if self.email.is_empty() {
                return Err(AuthError::Validation("Please enter your email.".to_string()));
            }
            return Ok(());
        }

        let missing: Vec<&str> = [
            ("full name", &self.full_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("country", &self.country),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(label, _)| label)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AuthError::Validation(format!(
                "Please fill in: {}.",
                missing.join(", ")
            )))
        }
    }
}

/// Values that take precedence over the form's own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub name: Option<String>,
    pub email: Option<String>,
    pub federated: bool,
}

impl Overrides {
    pub fn from_profile(profile: &IdentityProfile) -> Self {
        Self {
            name: Some(profile.name.clone()),
            email: Some(profile.email.clone()),
            federated: true,
        }
    }
}

pub fn build(
    ctx: &PageContext,
    page: &dyn Page,
    source: &str,
    overrides: Overrides,
    extra_meta: Map<String, Value>,
) -> Result<SubmissionRecord, AuthError> {
    if source.trim().is_empty() {
        return Err(AuthError::Validation("Submission source is required.".to_string()));
    }

    let form = page.form();
    let fields = FieldSet::gather(&ctx.page_type, form.as_ref());

    let mut meta = Map::new();
    meta.insert("referral".into(), Value::String(fields.referral.clone()));
    meta.insert("pagePath".into(), Value::String(page.location_path()));
    meta.insert("pageType".into(), Value::String(ctx.page_type.to_string()));
    meta.insert("userAgent".into(), Value::String(page.user_agent()));
    meta.insert(
        "timestamp".into(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    meta.extend(extra_meta);

    let (phone, country) = if overrides.federated {
        (String::new(), String::new())
    } else {
        (fields.phone, fields.country)
    };

    Ok(SubmissionRecord {
        source: source.to_string(),
        name: overrides.name.unwrap_or(fields.full_name),
        email: overrides.email.unwrap_or(fields.email),
        phone,
        country,
        meta,
    })
}
