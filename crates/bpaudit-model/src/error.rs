//! Error types for document loading.

/// Errors raised while loading a blueprint, chunk, or scan document.
///
/// Data-quality defects are never errors here; they surface later as
/// findings. Only structural breakage aborts a document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// A structurally required field is missing or has the wrong shape.
    #[error("malformed document at {path}: {message}")]
    Malformed { path: String, message: String },

    #[error("failed to read file: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json at {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DocumentError {
    pub(crate) fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Location of the offending field, when the error is structural.
    pub fn json_path(&self) -> Option<&str> {
        match self {
            Self::Malformed { path, .. } => Some(path),
            _ => None,
        }
    }
}
