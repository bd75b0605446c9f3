//! HTTP endpoint entities.

use crate::error::DocumentError;
use crate::json::{self, Object};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// HTTP method of an endpoint. Unrecognised spellings are kept verbatim
/// so that rules can report them instead of aborting the load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Other(String),
}

impl HttpMethod {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            "HEAD" => Self::Head,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Other(raw) => raw,
        }
    }

    /// POST, PUT, PATCH: methods expected to carry a request body.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    /// GET, DELETE, HEAD: methods that must not carry a body and may take
    /// query parameters.
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Get | Self::Delete | Self::Head)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathParam {
    pub name: String,
    pub example: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryParam {
    pub name: String,
    pub required: bool,
    pub example: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyField {
    pub name: String,
    pub field_type: Option<String>,
    pub required: bool,
    pub example: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody {
    pub source: Option<String>,
    pub fields: Vec<BodyField>,
}

/// One HTTP endpoint as described by the blueprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub id: String,
    pub method: HttpMethod,
    pub path: String,
    pub path_params: Vec<PathParam>,
    pub query_params: Vec<QueryParam>,
    /// `Some` for any non-null `requestBody`; a value that is not an object
    /// yields a body with no fields.
    pub request_body: Option<RequestBody>,
    pub response_schema: Option<Value>,
    /// Tri-state: `None` means the extractor could not decide.
    pub auth_required: Option<bool>,
    pub auth_type: Option<String>,
    pub roles: BTreeSet<String>,
    pub domain: String,
    pub confidence: Option<f64>,
    pub flags: BTreeSet<String>,
    pub is_page_route: bool,
}

impl Endpoint {
    /// `"METHOD /path"`, the key used by allow-lists and reports.
    pub fn key(&self) -> String {
        endpoint_key(self.method.as_str(), &self.path)
    }

    pub fn body_fields(&self) -> &[BodyField] {
        self.request_body
            .as_ref()
            .map(|body| body.fields.as_slice())
            .unwrap_or_default()
    }

    pub(crate) fn from_value(value: &Value, path: &str) -> Result<Self, DocumentError> {
        let obj = json::as_object(value, path)?;
        let method = HttpMethod::parse(&json::required_str(obj, &["method"], path)?);
        let route = json::required_str(obj, &["path", "route"], path)?;
        let id = json::opt_str(obj, &["id"], path)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| endpoint_key(method.as_str(), &route));

        let request_body = json::lookup(obj, &["requestBody"]).map(|(_, value)| {
            let body_path = json::child(path, "requestBody");
            match value.as_object() {
                Some(body) => parse_body(body, &body_path),
                None => {
                    tracing::warn!(
                        path = %body_path,
                        found = %json::kind(value),
                        "request body is not an object; keeping it without fields"
                    );
                    RequestBody {
                        source: None,
                        fields: Vec::new(),
                    }
                }
            }
        });

        Ok(Self {
            id,
            method,
            path: route,
            path_params: parse_path_params(obj, path),
            query_params: parse_query_params(obj, path),
            request_body,
            response_schema: json::opt_value(obj, &["responseSchema"]),
            auth_required: json::opt_bool(obj, &["authRequired", "requiresAuth"], path),
            auth_type: json::opt_str(obj, &["authType"], path).filter(|t| !t.is_empty()),
            roles: json::string_set(obj, &["roles"], path),
            domain: json::str_or_empty(obj, &["domain"], path),
            confidence: json::opt_f64(obj, &["confidence"], path),
            flags: json::string_set(obj, &["flags"], path),
            is_page_route: json::bool_or_false(obj, &["isPageRoute"], path),
        })
    }
}

pub(crate) fn endpoint_key(method: &str, path: &str) -> String {
    format!("{method} {path}")
}

/// Parameter entries may be objects (`{name, example}`) or bare names.
fn param_entries<'a>(
    obj: &'a Object,
    key: &str,
    path: &str,
) -> Vec<(String, Option<&'a Object>)> {
    let list_path = json::child(path, key);
    json::array_or_empty(obj, &[key], path)
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| match entry {
            Value::String(name) => Some((name.clone(), None)),
            Value::Object(row) => match row.get("name").and_then(Value::as_str) {
                Some(name) => Some((name.to_string(), Some(row))),
                None => {
                    tracing::warn!(path = %json::index(&list_path, idx), "skipping parameter without a name");
                    None
                }
            },
            other => {
                tracing::warn!(
                    path = %json::index(&list_path, idx),
                    found = %json::kind(other),
                    "skipping unrecognised parameter entry"
                );
                None
            }
        })
        .collect()
}

fn parse_path_params(obj: &Object, path: &str) -> Vec<PathParam> {
    param_entries(obj, "pathParams", path)
        .into_iter()
        .map(|(name, row)| PathParam {
            name,
            example: row.and_then(|row| json::opt_value(row, &["example"])),
        })
        .collect()
}

fn parse_query_params(obj: &Object, path: &str) -> Vec<QueryParam> {
    let list_path = json::child(path, "queryParams");
    param_entries(obj, "queryParams", path)
        .into_iter()
        .map(|(name, row)| QueryParam {
            name,
            required: row.is_some_and(|row| json::bool_or_false(row, &["required"], &list_path)),
            example: row.and_then(|row| json::opt_value(row, &["example"])),
        })
        .collect()
}

fn parse_body(body: &Object, path: &str) -> RequestBody {
    let fields_path = json::child(path, "fields");
    let fields = json::array_or_empty(body, &["fields"], path)
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let row_path = json::index(&fields_path, idx);
            let Some(row) = entry.as_object() else {
                tracing::warn!(path = %row_path, "skipping non-object body field");
                return None;
            };
            let Some(name) = json::opt_str(row, &["name"], &row_path) else {
                tracing::warn!(path = %row_path, "skipping body field without a name");
                return None;
            };
            Some(BodyField {
                name,
                field_type: json::opt_str(row, &["type"], &row_path).filter(|t| !t.is_empty()),
                required: json::bool_or_false(row, &["required"], &row_path),
                example: json::opt_value(row, &["example"]),
            })
        })
        .collect();
    RequestBody {
        source: json::opt_str(body, &["source"], path),
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn method_parsing_is_case_insensitive_and_keeps_unknowns() {
        assert_eq!(HttpMethod::parse("patch"), HttpMethod::Patch);
        assert_eq!(
            HttpMethod::parse("options"),
            HttpMethod::Other("OPTIONS".to_string())
        );
        assert!(HttpMethod::Delete.is_read());
        assert!(!HttpMethod::Delete.is_write());
    }

    #[test]
    fn minimal_endpoint_takes_defaults() {
        let ep = Endpoint::from_value(&json!({"method": "get", "path": "/api/items"}), "$")
            .expect("minimal endpoint should parse");
        assert_eq!(ep.id, "GET /api/items");
        assert_eq!(ep.auth_required, None);
        assert!(ep.request_body.is_none());
        assert!(ep.path_params.is_empty());
        assert!(!ep.is_page_route);
    }

    #[test]
    fn endpoint_without_method_is_malformed() {
        let err = Endpoint::from_value(&json!({"path": "/x"}), "$.endpoints[0]")
            .expect_err("method is required");
        assert_eq!(err.json_path(), Some("$.endpoints[0].method"));
    }

    #[test]
    fn parameters_accept_bare_names_and_objects() {
        let ep = Endpoint::from_value(
            &json!({
                "method": "GET",
                "path": "/a/:id",
                "pathParams": ["id", {"name": "other", "example": "x"}, 5],
                "queryParams": [{"name": "page", "required": true}]
            }),
            "$",
        )
        .expect("endpoint should parse");
        assert_eq!(ep.path_params.len(), 2);
        assert_eq!(ep.path_params[1].example, Some(json!("x")));
        assert!(ep.query_params[0].required);
    }

    #[test]
    fn non_object_request_body_is_present_without_fields() {
        for raw in [json!([]), json!("x"), json!(0)] {
            let ep = Endpoint::from_value(
                &json!({"method": "GET", "path": "/api/items", "requestBody": raw}),
                "$",
            )
            .expect("endpoint should parse");
            let body = ep.request_body.as_ref().expect("non-null body is kept");
            assert!(body.fields.is_empty());
        }
        let ep = Endpoint::from_value(
            &json!({"method": "GET", "path": "/api/items", "requestBody": null}),
            "$",
        )
        .expect("endpoint should parse");
        assert!(ep.request_body.is_none());
    }

    #[test]
    fn request_body_fields_parse() {
        let ep = Endpoint::from_value(
            &json!({
                "method": "POST",
                "path": "/orders",
                "requestBody": {
                    "source": "zod",
                    "fields": [{"name": "customerId", "type": "string", "required": true, "example": null}]
                }
            }),
            "$",
        )
        .expect("endpoint should parse");
        let fields = ep.body_fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field_type.as_deref(), Some("string"));
        assert_eq!(fields[0].example, None);
    }
}
