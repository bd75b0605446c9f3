//! Cross-reference passes: blueprint against chunks, against an external
//! route source, and against itself for foreign-key resolvability.

pub mod chunks;
pub mod fk;
pub mod source;

use crate::finding::Finding;
use serde::{Deserialize, Serialize};

/// Whether a pass ran. A pass that did not run is reported with its
/// reason; it is never silently equivalent to "no findings".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PassStatus {
    Evaluated,
    NotEvaluated { reason: String },
}

impl PassStatus {
    pub fn not_evaluated(reason: impl Into<String>) -> Self {
        Self::NotEvaluated {
            reason: reason.into(),
        }
    }

    pub fn is_evaluated(&self) -> bool {
        matches!(self, Self::Evaluated)
    }
}

/// Output of one pass before it is folded into the report.
#[derive(Debug, Clone, PartialEq)]
pub struct PassOutcome {
    pub status: PassStatus,
    pub findings: Vec<Finding>,
}

impl PassOutcome {
    pub fn evaluated(findings: Vec<Finding>) -> Self {
        Self {
            status: PassStatus::Evaluated,
            findings,
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        let status = PassStatus::not_evaluated(reason);
        if let PassStatus::NotEvaluated { reason } = &status {
            tracing::info!(%reason, "pass skipped");
        }
        Self {
            status,
            findings: Vec::new(),
        }
    }
}
