//! Audit configuration (`bpaudit.toml`).
//!
//! Every field is optional; an empty file yields [`AuditConfig::default`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_MIN_PROMPT_CHARS: usize = 100;
pub const DEFAULT_LOW_CONFIDENCE: f64 = 0.6;
pub const DEFAULT_LOW_LOCATOR_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_PROMPT_SECTIONS: [&str; 3] =
    ["AUTH USAGE NOTES", "API ENDPOINTS TO TEST", "COVERAGE REQUIREMENTS"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub inputs: InputLocations,
    pub rules: RuleConfig,
}

/// Default input locations. Command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputLocations {
    pub blueprint: Option<PathBuf>,
    pub chunks: Vec<PathBuf>,
    pub chunks_dir: Option<PathBuf>,
    pub source_scan: Option<PathBuf>,
}

/// Thresholds and allow-lists consulted by the rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// `"METHOD /path"` keys of write endpoints that legitimately take no body.
    pub legitimately_empty_body: BTreeSet<String>,
    /// Prefixes a locator expression must start with to be rooted at the page.
    pub page_root_prefixes: Vec<String>,
    /// Section headings every chunk prompt must contain.
    pub required_prompt_sections: Vec<String>,
    pub min_prompt_chars: usize,
    pub low_confidence: f64,
    pub low_locator_confidence: f64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            legitimately_empty_body: BTreeSet::new(),
            page_root_prefixes: vec!["page.".to_string()],
            required_prompt_sections: DEFAULT_PROMPT_SECTIONS
                .iter()
                .map(|section| section.to_string())
                .collect(),
            min_prompt_chars: DEFAULT_MIN_PROMPT_CHARS,
            low_confidence: DEFAULT_LOW_CONFIDENCE,
            low_locator_confidence: DEFAULT_LOW_LOCATOR_CONFIDENCE,
        }
    }
}

impl RuleConfig {
    /// Whether `key` (`"METHOD /path"`) is allow-listed as body-less.
    /// The method half is compared case-insensitively.
    pub fn is_legitimately_empty(&self, key: &str) -> bool {
        let wanted = normalize_key(key);
        self.legitimately_empty_body
            .iter()
            .any(|entry| normalize_key(entry) == wanted)
    }
}

fn normalize_key(key: &str) -> String {
    let mut parts = key.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(method), Some(path)) => format!("{} {path}", method.to_ascii_uppercase()),
        _ => key.trim().to_string(),
    }
}

impl AuditConfig {
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::ParseToml {
            path: origin.to_string(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text, &path.display().to_string())?;
        tracing::debug!(path = %path.display(), "loaded audit config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AuditConfig::from_toml_str("", "bpaudit.toml").expect("empty config should parse");
        assert_eq!(config, AuditConfig::default());
        assert_eq!(config.rules.page_root_prefixes, vec!["page.".to_string()]);
        assert_eq!(config.rules.min_prompt_chars, 100);
        assert_eq!(
            config.rules.required_prompt_sections,
            vec!["AUTH USAGE NOTES", "API ENDPOINTS TO TEST", "COVERAGE REQUIREMENTS"]
        );
    }

    #[test]
    fn partial_rules_keep_remaining_defaults() {
        let config = AuditConfig::from_toml_str(
            r#"
[inputs]
blueprint = "out/blueprint.json"
chunks_dir = "out/chunks"

[rules]
legitimately_empty_body = ["post /auth/logout"]
low_confidence = 0.7
"#,
            "bpaudit.toml",
        )
        .expect("config should parse");
        assert_eq!(
            config.inputs.blueprint.as_deref(),
            Some(Path::new("out/blueprint.json"))
        );
        assert_eq!(config.rules.low_confidence, 0.7);
        assert_eq!(config.rules.low_locator_confidence, DEFAULT_LOW_LOCATOR_CONFIDENCE);
        assert!(config.rules.is_legitimately_empty("POST /auth/logout"));
        assert!(!config.rules.is_legitimately_empty("POST /auth/login"));
    }

    #[test]
    fn invalid_toml_names_origin() {
        let err = AuditConfig::from_toml_str("[rules\n", "custom.toml")
            .expect_err("unterminated table should fail");
        assert!(matches!(err, ConfigError::ParseToml { ref path, .. } if path == "custom.toml"));
    }
}
