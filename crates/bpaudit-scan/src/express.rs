//! Express-style routers (`router.get('/path', handler)`).

use crate::join_prefix;
use crate::walk::{read_source, source_files};
use bpaudit_core::{RouteSource, RouteSourceError};
use bpaudit_model::ScannedRoute;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const SOURCE_EXTENSIONS: &[&str] = &["ts", "js", "mjs", "cjs"];

fn registration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\.(get|post|put|patch|delete)\s*\(\s*['"]([^'"]+)['"]"#)
            .expect("route registration regex must compile")
    })
}

/// Scans every JavaScript/TypeScript file under a root for route
/// registrations. Only string-literal paths starting with `/` count, which
/// keeps `headers.get('x')` and `map.get('k')` out.
#[derive(Debug, Clone)]
pub struct ExpressRouterSource {
    root: PathBuf,
    prefix: String,
    label: String,
}

impl ExpressRouterSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let label = format!("express:{}", root.display());
        Self {
            root,
            prefix: String::new(),
            label,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
        && !path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(".d.ts"))
}

impl RouteSource for ExpressRouterSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn routes(&self) -> Result<Vec<ScannedRoute>, RouteSourceError> {
        let mut seen = BTreeSet::new();
        for file in source_files(&self.root, is_source_file)? {
            let content = read_source(&file)?;
            for caps in registration_re().captures_iter(&content) {
                let (Some(method), Some(path)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                if !path.as_str().starts_with('/') {
                    continue;
                }
                seen.insert((
                    method.as_str().to_ascii_uppercase(),
                    join_prefix(&self.prefix, path.as_str()),
                ));
            }
        }
        tracing::debug!(root = %self.root.display(), routes = seen.len(), "scanned express routes");
        Ok(seen
            .into_iter()
            .map(|(method, path)| ScannedRoute::new(&method, path))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn non_utf8_file_does_not_abort_the_scan() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join("src")).expect("create src");
        fs::write(root.join("src/a.ts"), "router.get('/a', x);").expect("write router");
        let mut legacy = b"// caf\xe9\n".to_vec();
        legacy.extend_from_slice(b"router.get('/legacy', y);\n");
        fs::write(root.join("src/legacy.js"), legacy).expect("write legacy router");

        let routes = ExpressRouterSource::new(root).routes().expect("scan should succeed");
        let keys: Vec<(String, String)> = routes.iter().map(ScannedRoute::key).collect();
        assert_eq!(
            keys,
            vec![
                ("GET".to_string(), "/a".to_string()),
                ("GET".to_string(), "/legacy".to_string()),
            ]
        );
    }

    #[test]
    fn collects_registrations_and_skips_build_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join("src/routes")).expect("create src");
        fs::create_dir_all(root.join("dist")).expect("create dist");
        fs::write(
            root.join("src/routes/employees.ts"),
            r#"
const router = Router();
router.get('/employees', list);
router.POST("/employees", create);
router.delete('/employees/:id', remove);
const auth = req.get('Authorization');
router.get('/employees', list);
"#,
        )
        .expect("write router");
        fs::write(root.join("dist/employees.js"), "router.get('/stale', x);").expect("write dist");
        fs::write(root.join("src/types.d.ts"), "declare function get(path: '/typed'): void;")
            .expect("write types");

        let routes = ExpressRouterSource::new(root)
            .with_prefix("/api/")
            .routes()
            .expect("scan should succeed");
        let keys: Vec<(String, String)> = routes.iter().map(ScannedRoute::key).collect();
        assert_eq!(
            keys,
            vec![
                ("DELETE".to_string(), "/api/employees/:id".to_string()),
                ("GET".to_string(), "/api/employees".to_string()),
                ("POST".to_string(), "/api/employees".to_string()),
            ]
        );
    }
}
