//! Chunk documents: per-domain packaging units built from the blueprint.

use crate::auth::AuthConfig;
use crate::endpoint::endpoint_key;
use crate::error::DocumentError;
use crate::json::{self, ROOT};
use crate::page::page_key;
use serde_json::Value;
use std::path::Path;

/// A reference from a chunk to a blueprint entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRef {
    pub id: String,
    /// `"METHOD /path"` for endpoints, the route for pages.
    pub label: String,
    pub auth_required: Option<bool>,
}

/// One packaging unit. Only ids are kept for its entities: the audit
/// cross-checks chunks against the blueprint and never reads entity detail
/// from the chunk copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Where the chunk came from (file name), for report context.
    pub source: String,
    pub domain: String,
    pub output_file_name: String,
    pub has_pages: bool,
    pub prompt_text: String,
    pub endpoints: Vec<ChunkRef>,
    pub pages: Vec<ChunkRef>,
    pub auth: Option<AuthConfig>,
}

impl Chunk {
    pub fn from_value(value: &Value, source: impl Into<String>) -> Result<Self, DocumentError> {
        let root = json::as_object(value, ROOT)?;
        let inner_path = json::child(ROOT, "chunk");
        let Some((_, inner)) = json::lookup(root, &["chunk"]) else {
            return Err(DocumentError::malformed(inner_path, "required field is missing"));
        };
        let inner = json::as_object(inner, &inner_path)?;

        let endpoints_path = json::child(&inner_path, "endpoints");
        let endpoints = json::array_or_empty(inner, &["endpoints"], &inner_path)
            .iter()
            .enumerate()
            .map(|(idx, row)| endpoint_ref(row, &json::index(&endpoints_path, idx)))
            .collect::<Result<Vec<_>, _>>()?;
        let pages_path = json::child(&inner_path, "pages");
        let pages = json::array_or_empty(inner, &["pages"], &inner_path)
            .iter()
            .enumerate()
            .map(|(idx, row)| page_ref(row, &json::index(&pages_path, idx)))
            .collect::<Result<Vec<_>, _>>()?;

        let domain = json::opt_str(root, &["domain"], ROOT)
            .or_else(|| json::opt_str(inner, &["domain"], &inner_path))
            .unwrap_or_default();

        Ok(Self {
            source: source.into(),
            domain,
            output_file_name: json::str_or_empty(root, &["outputFileName"], ROOT),
            has_pages: json::opt_bool(root, &["hasPages"], ROOT).unwrap_or(!pages.is_empty()),
            prompt_text: json::str_or_empty(root, &["llmUserMessage"], ROOT),
            endpoints,
            pages,
            auth: json::opt_object(inner, &["auth"], &inner_path)
                .map(|obj| AuthConfig::from_object(obj, &json::child(&inner_path, "auth"))),
        })
    }

    /// Load a chunk file; its file name becomes the chunk's source label.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let value = json::read_json(path)?;
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_value(&value, source)
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty() && self.pages.is_empty()
    }

    pub fn contains_endpoint(&self, id: &str) -> bool {
        self.endpoints.iter().any(|r| r.id == id)
    }
}

fn endpoint_ref(row: &Value, path: &str) -> Result<ChunkRef, DocumentError> {
    let obj = json::as_object(row, path)?;
    let label = match (
        json::opt_str(obj, &["method"], path),
        json::opt_str(obj, &["path", "route"], path),
    ) {
        (Some(method), Some(route)) => endpoint_key(&method.to_ascii_uppercase(), &route),
        _ => String::new(),
    };
    let id = match json::opt_str(obj, &["id"], path).filter(|id| !id.is_empty()) {
        Some(id) => id,
        None if !label.is_empty() => label.clone(),
        None => return Err(DocumentError::malformed(json::child(path, "id"), "entity needs an id or method+path")),
    };
    Ok(ChunkRef {
        label: if label.is_empty() { id.clone() } else { label },
        id,
        auth_required: json::opt_bool(obj, &["authRequired", "requiresAuth"], path),
    })
}

fn page_ref(row: &Value, path: &str) -> Result<ChunkRef, DocumentError> {
    let obj = json::as_object(row, path)?;
    let route = json::opt_str(obj, &["route", "path"], path);
    let id = match (json::opt_str(obj, &["id"], path).filter(|id| !id.is_empty()), &route) {
        (Some(id), _) => id,
        (None, Some(route)) => page_key(route),
        (None, None) => {
            return Err(DocumentError::malformed(json::child(path, "id"), "page needs an id or route"));
        }
    };
    Ok(ChunkRef {
        label: route.unwrap_or_else(|| id.clone()),
        id,
        auth_required: json::opt_bool(obj, &["authRequired", "requiresAuth"], path),
    })
}
