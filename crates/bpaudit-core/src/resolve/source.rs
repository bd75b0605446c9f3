//! Blueprint against routes extracted from application source.
//!
//! Route extraction is pluggable through [`RouteSource`]; this module only
//! compares. [`ScanDocument`] adapts a pre-computed scan file.

use crate::finding::{Category, EntityRef, Finding};
use bpaudit_model::{Blueprint, DocumentError, Endpoint, ScannedRoute, read_scan_document};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteSourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {root}: {message}")]
    Walk { root: String, message: String },

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Anything that can list the routes an application actually serves.
pub trait RouteSource {
    /// Short label used in logs and pass reports.
    fn name(&self) -> &str;

    fn routes(&self) -> Result<Vec<ScannedRoute>, RouteSourceError>;
}

/// A route scan produced ahead of time and stored as JSON.
#[derive(Debug, Clone)]
pub struct ScanDocument {
    path: PathBuf,
    label: String,
}

impl ScanDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = format!("scan:{}", path.display());
        Self { path, label }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RouteSource for ScanDocument {
    fn name(&self) -> &str {
        &self.label
    }

    fn routes(&self) -> Result<Vec<ScannedRoute>, RouteSourceError> {
        Ok(read_scan_document(&self.path)?)
    }
}

/// In-memory routes, for callers that already hold a scan.
#[derive(Debug, Clone, Default)]
pub struct StaticRoutes {
    pub label: String,
    pub routes: Vec<ScannedRoute>,
}

impl RouteSource for StaticRoutes {
    fn name(&self) -> &str {
        &self.label
    }

    fn routes(&self) -> Result<Vec<ScannedRoute>, RouteSourceError> {
        Ok(self.routes.clone())
    }
}

/// Scanned routes merged by `(method, path)` so duplicates collapse.
fn merge(routes: &[ScannedRoute]) -> BTreeMap<(String, String), ScannedRoute> {
    let mut merged: BTreeMap<(String, String), ScannedRoute> = BTreeMap::new();
    for route in routes {
        let normalized = ScannedRoute::new(&route.method, route.path.clone());
        let entry = merged.entry(normalized.key()).or_insert(normalized);
        entry.query_params.extend(route.query_params.iter().cloned());
        entry.body_fields.extend(route.body_fields.iter().cloned());
    }
    merged
}

/// MISSING_ENDPOINT, PHANTOM_ENDPOINT, and parameter drift for matched
/// pairs. Parameter sets are only compared when the scan saw any.
pub fn compare_routes(bp: &Blueprint, routes: &[ScannedRoute]) -> Vec<Finding> {
    let scanned = merge(routes);
    let mut findings = Vec::new();

    for ((method, path), route) in &scanned {
        match bp.endpoint(method, path) {
            None => findings.push(Finding::new(
                EntityRef::source_route(method, path),
                Category::MissingEndpoint,
                format!("source serves {method} {path} but the blueprint omits it"),
            )),
            Some(ep) => compare_params(ep, route, &mut findings),
        }
    }

    let mut seen = BTreeSet::new();
    for ep in bp.endpoints() {
        let key = (ep.method.as_str().to_string(), ep.path.clone());
        if scanned.contains_key(&key) || !seen.insert(key) {
            continue;
        }
        let served: Vec<&str> = scanned
            .keys()
            .filter(|(_, path)| *path == ep.path)
            .map(|(method, _)| method.as_str())
            .collect();
        let message = if served.is_empty() {
            format!("{} is not served by the source", ep.key())
        } else {
            format!(
                "{} is not served by the source; the path exists for {}",
                ep.key(),
                served.join(", ")
            )
        };
        findings.push(Finding::new(
            EntityRef::endpoint(ep),
            Category::PhantomEndpoint,
            message,
        ));
    }
    findings
}

fn compare_params(ep: &Endpoint, route: &ScannedRoute, findings: &mut Vec<Finding>) {
    if ep.method.is_read() && !route.query_params.is_empty() {
        let declared: BTreeSet<&str> = ep.query_params.iter().map(|q| q.name.as_str()).collect();
        for name in &route.query_params {
            if !declared.contains(name.as_str()) {
                findings.push(Finding::new(
                    EntityRef::endpoint(ep),
                    Category::MissingQueryParam,
                    format!("source reads query param `{name}` which the blueprint omits"),
                ));
            }
        }
        for name in declared {
            if !route.query_params.contains(name) {
                findings.push(Finding::new(
                    EntityRef::endpoint(ep),
                    Category::ExtraQueryParam,
                    format!("blueprint query param `{name}` is never read by the source"),
                ));
            }
        }
    }

    if ep.method.is_write() && !route.body_fields.is_empty() {
        let declared: BTreeSet<&str> = ep.body_fields().iter().map(|f| f.name.as_str()).collect();
        for name in &route.body_fields {
            if !declared.contains(name.as_str()) {
                findings.push(Finding::new(
                    EntityRef::field(ep, name),
                    Category::MissingBodyField,
                    format!("source reads body field `{name}` which the blueprint omits"),
                ));
            }
        }
        for name in declared {
            if !route.body_fields.contains(name) {
                findings.push(Finding::new(
                    EntityRef::field(ep, name),
                    Category::ExtraBodyField,
                    format!("blueprint body field `{name}` is never read by the source"),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bp() -> Blueprint {
        Blueprint::from_value(&json!({
            "endpoints": [
                {
                    "method": "GET",
                    "path": "/api/items",
                    "queryParams": [{"name": "page"}, {"name": "legacy"}]
                },
                {
                    "method": "POST",
                    "path": "/api/items",
                    "requestBody": {"fields": [{"name": "title"}, {"name": "color"}]}
                },
                {"method": "DELETE", "path": "/api/items/:id"}
            ]
        }))
        .expect("fixture blueprint should parse")
    }

    fn route(method: &str, path: &str, query: &[&str], body: &[&str]) -> ScannedRoute {
        let mut route = ScannedRoute::new(method, path);
        route.query_params = query.iter().map(|s| s.to_string()).collect();
        route.body_fields = body.iter().map(|s| s.to_string()).collect();
        route
    }

    fn categories(findings: &[Finding]) -> Vec<Category> {
        let mut out: Vec<Category> = findings.iter().map(|f| f.category).collect();
        out.sort();
        out
    }

    #[test]
    fn matching_scan_is_clean() {
        let routes = vec![
            route("GET", "/api/items", &["page", "legacy"], &[]),
            route("post", "/api/items", &[], &["color", "title"]),
            route("DELETE", "/api/items/:id", &[], &[]),
        ];
        assert!(compare_routes(&bp(), &routes).is_empty());
    }

    #[test]
    fn drift_in_routes_and_params() {
        let routes = vec![
            route("GET", "/api/items", &["page", "sort"], &[]),
            route("GET", "/api/items", &["page"], &[]),
            route("POST", "/api/items", &[], &["title", "size"]),
            route("PATCH", "/api/items/:id", &[], &[]),
            route("GET", "/api/health", &[], &[]),
        ];
        let findings = compare_routes(&bp(), &routes);
        assert_eq!(
            categories(&findings),
            vec![
                Category::MissingEndpoint,
                Category::MissingEndpoint,
                Category::PhantomEndpoint,
                Category::MissingQueryParam,
                Category::ExtraQueryParam,
                Category::MissingBodyField,
                Category::ExtraBodyField,
            ]
        );
        let phantom = findings
            .iter()
            .find(|f| f.category == Category::PhantomEndpoint)
            .expect("phantom finding");
        assert_eq!(phantom.entity_ref.context, "DELETE /api/items/:id");
        assert!(phantom.message.ends_with("exists for PATCH"));
    }

    #[test]
    fn empty_scanned_params_are_not_compared() {
        let routes = vec![
            route("GET", "/api/items", &[], &[]),
            route("POST", "/api/items", &[], &[]),
            route("DELETE", "/api/items/:id", &[], &[]),
        ];
        assert!(compare_routes(&bp(), &routes).is_empty());
    }

    #[test]
    fn static_routes_feed_the_comparison() {
        let source = StaticRoutes {
            label: "fixture".to_string(),
            routes: vec![route("GET", "/api/other", &[], &[])],
        };
        let routes = source.routes().expect("static routes never fail");
        assert_eq!(source.name(), "fixture");
        assert_eq!(
            categories(&compare_routes(&bp(), &routes)),
            vec![
                Category::MissingEndpoint,
                Category::PhantomEndpoint,
                Category::PhantomEndpoint,
                Category::PhantomEndpoint
            ]
        );
    }

    #[test]
    fn missing_scan_file_is_a_document_error() {
        let err = ScanDocument::new("/nonexistent/scan.json")
            .routes()
            .expect_err("missing file should fail");
        assert!(matches!(err, RouteSourceError::Document(DocumentError::ReadFile { .. })));
    }
}
