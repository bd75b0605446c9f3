//! Authentication configuration owned by the blueprint.

use crate::json::{self, Object};
use serde_json::Value;

pub const TOKEN_TYPE_BEARER_JWT: &str = "bearer_jwt";
pub const TOKEN_TYPE_SESSION_COOKIE: &str = "session_cookie";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CredentialsFields {
    pub email_field: Option<String>,
    pub password_field: Option<String>,
}

/// How generated tests authenticate. Endpoints and pages refer to it; they
/// never own a copy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthConfig {
    pub token_type: Option<String>,
    pub login_endpoint: Option<String>,
    /// Rendered as text; object-shaped formats are kept as compact JSON.
    pub login_body_format: Option<String>,
    pub credentials_fields: CredentialsFields,
    pub default_email: Option<String>,
    pub default_password: Option<String>,
    pub auth_cookie_name: Option<String>,
    pub token_response_path: Option<String>,
}

impl AuthConfig {
    pub fn is_bearer_jwt(&self) -> bool {
        self.token_type.as_deref() == Some(TOKEN_TYPE_BEARER_JWT)
    }

    pub fn is_session_cookie(&self) -> bool {
        self.token_type.as_deref() == Some(TOKEN_TYPE_SESSION_COOKIE)
    }

    pub fn has_seed_credentials(&self) -> bool {
        self.default_email.is_some() && self.default_password.is_some()
    }

    /// Older blueprints nest seed credentials and field names under
    /// `credentials`; top-level keys win when both are present.
    pub(crate) fn from_object(obj: &Object, path: &str) -> Self {
        let text = |keys: &[&str]| json::opt_str(obj, keys, path).filter(|v| !v.trim().is_empty());
        let nested = json::opt_object(obj, &["credentials"], path);
        let nested_path = json::child(path, "credentials");
        let nested_text = |keys: &[&str]| {
            nested
                .and_then(|creds| json::opt_str(creds, keys, &nested_path))
                .filter(|v| !v.trim().is_empty())
        };

        let fields_path = json::child(path, "credentialsFields");
        let credentials_fields = match json::opt_object(obj, &["credentialsFields"], path) {
            Some(fields) => CredentialsFields {
                email_field: json::opt_str(fields, &["emailField"], &fields_path),
                password_field: json::opt_str(fields, &["passwordField"], &fields_path),
            },
            None => CredentialsFields {
                email_field: nested_text(&["emailField"]),
                password_field: nested_text(&["passwordField"]),
            },
        };

        Self {
            token_type: text(&["tokenType", "type"]),
            login_endpoint: text(&["loginEndpoint"]),
            login_body_format: json::opt_value(obj, &["loginBodyFormat"]).map(|format| match format {
                Value::String(text) => text,
                other => other.to_string(),
            }),
            credentials_fields,
            default_email: text(&["defaultEmail"]).or_else(|| nested_text(&["email"])),
            default_password: text(&["defaultPassword"]).or_else(|| nested_text(&["password"])),
            auth_cookie_name: text(&["authCookieName"]),
            token_response_path: text(&["tokenResponsePath"]),
        }
    }
}
