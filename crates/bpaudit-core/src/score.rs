//! Confidence score: a 0..=100 summary of how likely generated tests are to
//! pass on first run.

use crate::finding::{Category, Finding, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const BASELINE: u32 = 100;

/// Points deducted per finding of a category, optionally capped per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Penalty {
    pub category: Category,
    pub per_finding: u32,
    pub cap: Option<u32>,
}

/// Categories absent from this table deduct nothing.
pub const PENALTIES: &[Penalty] = &[
    Penalty { category: Category::AuthIncomplete, per_finding: 20, cap: Some(20) },
    Penalty { category: Category::NoSeedCreds, per_finding: 15, cap: Some(15) },
    Penalty { category: Category::NoTokenPath, per_finding: 5, cap: Some(5) },
    Penalty { category: Category::RequiredFkUnresolvable, per_finding: 5, cap: None },
    Penalty { category: Category::RequiredFkCrossChunk, per_finding: 2, cap: None },
    Penalty { category: Category::PageRouteEndpoint, per_finding: 3, cap: Some(15) },
    Penalty { category: Category::NoLocators, per_finding: 2, cap: None },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Band {
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "MEDIUM-HIGH")]
    MediumHigh,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "LOW")]
    Low,
}

impl Band {
    pub fn for_score(score: u32) -> Self {
        match score {
            85.. => Self::High,
            70..=84 => Self::MediumHigh,
            55..=69 => Self::Medium,
            _ => Self::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::MediumHigh => "MEDIUM-HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall outcome, driven by severities rather than by the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Verdict {
    /// At least one BLOCKING finding.
    WillFail,
    /// LIKELY findings but no BLOCKING ones.
    NeedsFixes,
    Clean,
}

impl Verdict {
    pub fn from_findings(findings: &[Finding]) -> Self {
        if findings.iter().any(|f| f.severity == Severity::Blocking) {
            Self::WillFail
        } else if findings.iter().any(|f| f.severity == Severity::Likely) {
            Self::NeedsFixes
        } else {
            Self::Clean
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WillFail => "WILL FAIL",
            Self::NeedsFixes => "WILL LIKELY NEED FIXES",
            Self::Clean => "CLEAN",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deduction {
    pub category: Category,
    pub count: usize,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCard {
    pub score: u32,
    pub band: Band,
    pub deductions: Vec<Deduction>,
}

/// Score a finding set. Adding a finding never raises the score.
pub fn score(findings: &[Finding]) -> ScoreCard {
    let mut counts: BTreeMap<Category, usize> = BTreeMap::new();
    for finding in findings {
        *counts.entry(finding.category).or_default() += 1;
    }

    let deductions: Vec<Deduction> = PENALTIES
        .iter()
        .filter_map(|penalty| {
            let count = counts.get(&penalty.category).copied().unwrap_or_default();
            if count == 0 {
                return None;
            }
            let raw = penalty
                .per_finding
                .saturating_mul(u32::try_from(count).unwrap_or(u32::MAX));
            let points = penalty.cap.map_or(raw, |cap| raw.min(cap));
            Some(Deduction {
                category: penalty.category,
                count,
                points,
            })
        })
        .collect();

    let total: u32 = deductions.iter().map(|d| d.points).fold(0, u32::saturating_add);
    let score = BASELINE.saturating_sub(total);
    ScoreCard {
        score,
        band: Band::for_score(score),
        deductions,
    }
}
