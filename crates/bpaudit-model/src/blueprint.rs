//! The blueprint: root aggregate of one audit run.

use crate::auth::AuthConfig;
use crate::endpoint::Endpoint;
use crate::error::DocumentError;
use crate::json::{self, ROOT};
use crate::page::{Locator, Page};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Read-only view over a blueprint document.
///
/// Endpoints are unique by `(method, path)` and pages by `route`. When a
/// document violates that, the index keeps the first occurrence and the
/// duplicates stay visible through iteration so rules can report them.
#[derive(Debug, Clone, Default)]
pub struct Blueprint {
    pub repo_name: String,
    pub frameworks: Vec<String>,
    pub auth: Option<AuthConfig>,
    endpoints: Vec<Endpoint>,
    pages: Vec<Page>,
    endpoint_index: HashMap<(String, String), usize>,
    page_index: HashMap<String, usize>,
}

impl Blueprint {
    pub fn new(
        repo_name: impl Into<String>,
        auth: Option<AuthConfig>,
        endpoints: Vec<Endpoint>,
        pages: Vec<Page>,
    ) -> Self {
        let mut endpoint_index = HashMap::new();
        for (idx, ep) in endpoints.iter().enumerate() {
            endpoint_index
                .entry((ep.method.as_str().to_string(), ep.path.clone()))
                .or_insert(idx);
        }
        let mut page_index = HashMap::new();
        for (idx, page) in pages.iter().enumerate() {
            page_index.entry(page.route.clone()).or_insert(idx);
        }
        Self {
            repo_name: repo_name.into(),
            frameworks: Vec::new(),
            auth,
            endpoints,
            pages,
            endpoint_index,
            page_index,
        }
    }

    pub fn with_frameworks(mut self, frameworks: Vec<String>) -> Self {
        self.frameworks = frameworks;
        self
    }

    /// Parse an untyped blueprint document.
    pub fn from_value(value: &Value) -> Result<Self, DocumentError> {
        let root = json::as_object(value, ROOT)?;
        let endpoints_path = json::child(ROOT, "endpoints");
        let endpoints = json::required_array(root, "endpoints", ROOT)?
            .iter()
            .enumerate()
            .map(|(idx, row)| Endpoint::from_value(row, &json::index(&endpoints_path, idx)))
            .collect::<Result<Vec<_>, _>>()?;

        let pages_path = json::child(ROOT, "pages");
        let pages = json::array_or_empty(root, &["pages"], ROOT)
            .iter()
            .enumerate()
            .map(|(idx, row)| Page::from_value(row, &json::index(&pages_path, idx)))
            .collect::<Result<Vec<_>, _>>()?;

        let auth = json::opt_object(root, &["auth"], ROOT)
            .map(|obj| AuthConfig::from_object(obj, &json::child(ROOT, "auth")));
        let frameworks = json::opt_value(root, &["frameworks", "framework"])
            .map(|raw| normalize_frameworks(&raw))
            .unwrap_or_default();

        let blueprint = Self::new(
            json::str_or_empty(root, &["repoName"], ROOT),
            auth,
            endpoints,
            pages,
        )
        .with_frameworks(frameworks);
        tracing::debug!(
            endpoints = blueprint.endpoints.len(),
            pages = blueprint.pages.len(),
            "blueprint parsed"
        );
        Ok(blueprint)
    }

    /// Load and parse a blueprint file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let value = json::read_json(path.as_ref())?;
        Self::from_value(&value)
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Every locator paired with the page that owns it.
    pub fn locators(&self) -> impl Iterator<Item = (&Page, &Locator)> {
        self.pages
            .iter()
            .flat_map(|page| page.locators.iter().map(move |loc| (page, loc)))
    }

    pub fn locator_count(&self) -> usize {
        self.pages.iter().map(|page| page.locators.len()).sum()
    }

    /// Endpoint by `(method, path)`; the method is matched case-insensitively.
    pub fn endpoint(&self, method: &str, path: &str) -> Option<&Endpoint> {
        self.endpoint_index
            .get(&(method.to_ascii_uppercase(), path.to_string()))
            .map(|idx| &self.endpoints[*idx])
    }

    pub fn page(&self, route: &str) -> Option<&Page> {
        self.page_index.get(route).map(|idx| &self.pages[*idx])
    }

    pub fn endpoint_by_id(&self, id: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|ep| ep.id == id)
    }
}

fn normalize_frameworks(raw: &Value) -> Vec<String> {
    match raw {
        Value::String(text) => vec![text.clone()],
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| match v {
                Value::String(text) => format!("{k}={text}"),
                other => format!("{k}={other}"),
            })
            .collect(),
        other => vec![other.to_string()],
    }
}
