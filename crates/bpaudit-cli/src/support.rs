use bpaudit_core::AuditConfig;
use bpaudit_model::{Blueprint, Chunk};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "bpaudit.toml";

/// Print `error: {message}` and exit with the usage/IO status.
pub fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(2);
}

/// Explicit `--config` must exist; otherwise `./bpaudit.toml` is optional.
pub fn load_config(explicit: Option<&str>) -> AuditConfig {
    let path = match explicit {
        Some(path) => PathBuf::from(path),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if !default.is_file() {
                return AuditConfig::default();
            }
            default
        }
    };
    AuditConfig::load(&path).unwrap_or_else(|err| fail(err))
}

pub fn load_blueprint(path: &Path) -> Blueprint {
    Blueprint::from_path(path).unwrap_or_else(|err| fail(err))
}

/// Chunk files named explicitly, then every `*.json` in `dir` in name order.
pub fn load_chunks(files: &[PathBuf], dir: Option<&Path>) -> Vec<Chunk> {
    let mut paths: Vec<PathBuf> = files.to_vec();
    if let Some(dir) = dir {
        let entries = std::fs::read_dir(dir).unwrap_or_else(|err| {
            fail(format!("failed to read chunk directory {}: {err}", dir.display()))
        });
        let mut found: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        found.sort();
        tracing::debug!(dir = %dir.display(), files = found.len(), "chunk directory listed");
        paths.extend(found);
    }
    paths
        .iter()
        .map(|path| Chunk::from_path(path).unwrap_or_else(|err| fail(err)))
        .collect()
}

pub fn print_json<T: Serialize>(value: &T, label: &str) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|error| {
        fail(format!("failed to render {label} payload: {error}"))
    });
    println!("{rendered}");
}
