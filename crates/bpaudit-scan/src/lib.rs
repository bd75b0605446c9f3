//! # bpaudit-scan
//!
//! [`RouteSource`](bpaudit_core::RouteSource) implementations that read an
//! application's source tree directly:
//!
//! - [`NextAppRouterSource`]: Next.js App Router `route.ts` handlers
//! - [`ExpressRouterSource`]: Express-style `router.get('/path', ...)` calls
//!
//! Extraction is regex-based and deliberately shallow. What it cannot see
//! (query params, body fields) stays empty, and the comparison skips
//! empty sets.

mod express;
mod nextjs;
mod walk;

pub use express::ExpressRouterSource;
pub use nextjs::NextAppRouterSource;

use bpaudit_core::RouteSource;
use std::path::PathBuf;

/// Frameworks with a built-in source scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framework {
    NextJs,
    Express,
}

impl Framework {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "nextjs" | "next" | "next.js" => Some(Self::NextJs),
            "express" => Some(Self::Express),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NextJs => "nextjs",
            Self::Express => "express",
        }
    }

    /// Path prefix a scanner applies when the caller gives none.
    pub fn default_prefix(self) -> &'static str {
        match self {
            Self::NextJs => "/api",
            Self::Express => "",
        }
    }

    /// Build the scanner for `root`, prefixing every path with `prefix`
    /// (or [`Framework::default_prefix`]).
    pub fn source(self, root: impl Into<PathBuf>, prefix: Option<&str>) -> Box<dyn RouteSource> {
        let prefix = prefix.unwrap_or(self.default_prefix());
        match self {
            Self::NextJs => Box::new(NextAppRouterSource::new(root).with_prefix(prefix)),
            Self::Express => Box::new(ExpressRouterSource::new(root).with_prefix(prefix)),
        }
    }
}

/// Join a mount prefix and a route path with exactly one `/` between them.
pub(crate) fn join_prefix(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    match (prefix.is_empty(), path.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{path}"),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}/{path}"),
    }
}
