//! Next.js App Router handlers (`app/api/**/route.ts`).

use crate::join_prefix;
use crate::walk::{read_source, source_files};
use bpaudit_core::{RouteSource, RouteSourceError};
use bpaudit_model::ScannedRoute;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

const ROUTE_FILES: &[&str] = &["route.ts", "route.js"];

fn exported_handler_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^export\s+(?:async\s+)?function\s+(GET|POST|PUT|PATCH|DELETE|HEAD)\b")
            .expect("exported handler regex must compile")
    })
}

fn search_param_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"searchParams\.get\(\s*['"]([^'"]+)['"]\s*\)"#)
            .expect("search param regex must compile")
    })
}

fn zod_field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s{2,6}(\w+):\s*z\.").expect("zod field regex must compile")
    })
}

fn body_destructure_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"const\s*\{([^}]+)\}\s*=\s*(?:body\b|await\s+(?:request|req)\.json\(\))")
            .expect("body destructure regex must compile")
    })
}

/// Scans an App Router `api` directory. Each `route.ts` file's directory
/// becomes the path: `[id]` and `[...slug]` turn into `:id` and `:slug`,
/// `(group)` segments vanish.
#[derive(Debug, Clone)]
pub struct NextAppRouterSource {
    root: PathBuf,
    prefix: String,
    label: String,
}

impl NextAppRouterSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let label = format!("nextjs:{}", root.display());
        Self {
            root,
            prefix: "/api".to_string(),
            label,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn route_path(&self, file: &Path) -> String {
        let rel = file
            .parent()
            .and_then(|dir| dir.strip_prefix(&self.root).ok())
            .unwrap_or_else(|| Path::new(""));
        let segments: Vec<String> = rel
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => normalize_segment(&name.to_string_lossy()),
                _ => None,
            })
            .collect();
        join_prefix(&self.prefix, &segments.join("/"))
    }
}

fn normalize_segment(segment: &str) -> Option<String> {
    if segment.starts_with('(') && segment.ends_with(')') {
        return None;
    }
    let inner = segment
        .strip_prefix("[[")
        .and_then(|s| s.strip_suffix("]]"))
        .or_else(|| segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')));
    Some(match inner {
        Some(name) => format!(":{}", name.trim_start_matches("...")),
        None => segment.to_string(),
    })
}

/// Names bound by `const { a, b: alias, ...rest } = body`.
fn destructured_names(list: &str) -> impl Iterator<Item = String> + '_ {
    list.split(',')
        .filter_map(|item| item.split([':', '=']).next())
        .map(str::trim)
        .filter(|name| !name.is_empty() && !name.starts_with("..."))
        .map(str::to_string)
}

fn scan_handler(method: &str, path: &str, content: &str) -> ScannedRoute {
    let mut route = ScannedRoute::new(method, path);
    route.query_params = search_param_re()
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect();
    if matches!(route.method.as_str(), "POST" | "PUT" | "PATCH") {
        let mut fields: BTreeSet<String> = zod_field_re()
            .captures_iter(content)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .collect();
        for caps in body_destructure_re().captures_iter(content) {
            if let Some(list) = caps.get(1) {
                fields.extend(destructured_names(list.as_str()));
            }
        }
        route.body_fields = fields;
    }
    route
}

impl RouteSource for NextAppRouterSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn routes(&self) -> Result<Vec<ScannedRoute>, RouteSourceError> {
        let files = source_files(&self.root, |path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| ROUTE_FILES.contains(&name))
        })?;
        let mut routes = Vec::new();
        for file in files {
            let content = read_source(&file)?;
            let path = self.route_path(&file);
            let methods: BTreeSet<&str> = exported_handler_re()
                .captures_iter(&content)
                .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
                .collect();
            if methods.is_empty() {
                tracing::warn!(file = %file.display(), "route file exports no HTTP handlers");
            }
            for method in methods {
                routes.push(scan_handler(method, &path, &content));
            }
        }
        tracing::debug!(root = %self.root.display(), routes = routes.len(), "scanned next.js routes");
        Ok(routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("fixture has a parent")).expect("create dirs");
        fs::write(path, content).expect("write fixture");
    }

    #[test]
    fn segments_normalize() {
        assert_eq!(normalize_segment("[id]").as_deref(), Some(":id"));
        assert_eq!(normalize_segment("[...slug]").as_deref(), Some(":slug"));
        assert_eq!(normalize_segment("[[...slug]]").as_deref(), Some(":slug"));
        assert_eq!(normalize_segment("(admin)"), None);
        assert_eq!(normalize_segment("users").as_deref(), Some("users"));
    }

    #[test]
    fn destructuring_skips_rest_and_aliases() {
        let names: Vec<String> = destructured_names(" name, email: mail, role = 'user', ...rest ").collect();
        assert_eq!(names, vec!["name", "email", "role"]);
    }

    #[test]
    fn scans_handlers_params_and_bodies() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        write(
            root,
            "users/route.ts",
            r#"
import { z } from "zod";

const createUser = z.object({
    name: z.string(),
    email: z.string().email(),
});

export async function GET(request: Request) {
  const { searchParams } = new URL(request.url);
  const page = searchParams.get('page');
  const q = searchParams.get("q");
}

export async function POST(request: Request) {
  const body = await request.json();
  const { name, role } = body;
}
"#,
        );
        write(
            root,
            "(admin)/users/[userId]/route.ts",
            "export async function DELETE() {}\nexport function PATCH(req) {\n  const { active } = await req.json();\n}\n",
        );
        write(root, "node_modules/pkg/route.ts", "export async function GET() {}\n");

        let routes = NextAppRouterSource::new(root)
            .routes()
            .expect("scan should succeed");
        let summary: Vec<(String, String, Vec<String>, Vec<String>)> = routes
            .iter()
            .map(|r| {
                (
                    r.method.clone(),
                    r.path.clone(),
                    r.query_params.iter().cloned().collect(),
                    r.body_fields.iter().cloned().collect(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("DELETE".into(), "/api/users/:userId".into(), vec![], vec![]),
                ("PATCH".into(), "/api/users/:userId".into(), vec![], vec!["active".into()]),
                ("GET".into(), "/api/users".into(), vec!["page".into(), "q".into()], vec![]),
                (
                    "POST".into(),
                    "/api/users".into(),
                    vec!["page".into(), "q".into()],
                    vec!["email".into(), "name".into(), "role".into()]
                ),
            ]
        );
    }

    #[test]
    fn missing_root_is_a_walk_error() {
        let err = NextAppRouterSource::new("/nonexistent/app/api")
            .routes()
            .expect_err("missing root should fail");
        assert!(matches!(err, RouteSourceError::Walk { .. }));
    }
}
