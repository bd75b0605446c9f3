//! Source route scans produced by static analysis of application code.

use crate::error::DocumentError;
use crate::json::{self, ROOT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

/// One `(method, path)` pair found in application source, with the query
/// parameters and body fields the handler reads.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedRoute {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub query_params: BTreeSet<String>,
    #[serde(default)]
    pub body_fields: BTreeSet<String>,
}

impl ScannedRoute {
    pub fn new(method: &str, path: impl Into<String>) -> Self {
        Self {
            method: method.trim().to_ascii_uppercase(),
            path: path.into(),
            query_params: BTreeSet::new(),
            body_fields: BTreeSet::new(),
        }
    }

    pub fn key(&self) -> (String, String) {
        (self.method.clone(), self.path.clone())
    }
}

/// Parse a scan document: either a bare array of routes or an object with a
/// `routes` array.
pub fn parse_scan_document(value: &Value) -> Result<Vec<ScannedRoute>, DocumentError> {
    let (rows, rows_path) = match value {
        Value::Array(rows) => (rows.as_slice(), ROOT.to_string()),
        Value::Object(root) => (
            json::required_array(root, "routes", ROOT)?,
            json::child(ROOT, "routes"),
        ),
        _ => {
            return Err(DocumentError::malformed(
                ROOT,
                "expected an array of routes or an object with `routes`",
            ));
        }
    };

    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let path = json::index(&rows_path, idx);
            let obj = json::as_object(row, &path)?;
            let method = json::required_str(obj, &["method"], &path)?;
            let route = json::required_str(obj, &["path"], &path)?;
            let mut scanned = ScannedRoute::new(&method, route);
            scanned.query_params = json::string_set(obj, &["queryParams"], &path);
            scanned.body_fields = json::string_set(obj, &["bodyFields"], &path);
            Ok(scanned)
        })
        .collect()
}

pub fn read_scan_document(path: impl AsRef<Path>) -> Result<Vec<ScannedRoute>, DocumentError> {
    let value = json::read_json(path.as_ref())?;
    parse_scan_document(&value)
}
