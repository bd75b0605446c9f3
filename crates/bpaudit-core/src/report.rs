//! The audit report: findings plus everything derived from them.

use crate::finding::{Category, Finding, Severity};
use crate::resolve::PassStatus;
use crate::score::{Band, Deduction, ScoreCard, Verdict};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

pub const REPORT_SCHEMA: u32 = 1;
pub const REPORT_KIND: &str = "bpaudit.report.v1";
pub const REPORT_DIGEST_PREFIX: &str = "bpr1_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCounts {
    pub endpoints: usize,
    pub pages: usize,
    pub locators: usize,
    pub chunks: usize,
    pub scanned_routes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    pub name: String,
    #[serde(flatten)]
    pub status: PassStatus,
    pub finding_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub category: Category,
    /// Most severe level among this category's findings.
    pub severity: Severity,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityCounts {
    pub blocking: usize,
    pub likely: usize,
    pub advisory: usize,
}

impl SeverityCounts {
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Blocking => self.blocking,
            Severity::Likely => self.likely,
            Severity::Advisory => self.advisory,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub schema: u32,
    pub report_kind: String,
    pub repo_name: String,
    pub frameworks: Vec<String>,
    pub counts: EntityCounts,
    pub passes: Vec<PassReport>,
    pub findings: Vec<Finding>,
    pub categories: Vec<CategorySummary>,
    pub severity_counts: SeverityCounts,
    pub score: u32,
    pub band: Band,
    pub deductions: Vec<Deduction>,
    pub verdict: Verdict,
    pub report_digest: String,
}

impl AuditReport {
    /// Fold raw findings into a report. Findings are ordered by category
    /// frequency (most frequent first), then category, entity, message.
    pub fn assemble(
        repo_name: String,
        frameworks: Vec<String>,
        counts: EntityCounts,
        passes: Vec<PassReport>,
        mut findings: Vec<Finding>,
        card: ScoreCard,
    ) -> Self {
        let mut per_category: BTreeMap<Category, (usize, Severity)> = BTreeMap::new();
        let mut severity_counts = SeverityCounts::default();
        for finding in &findings {
            let entry = per_category
                .entry(finding.category)
                .or_insert((0, finding.severity));
            entry.0 += 1;
            entry.1 = entry.1.min(finding.severity);
            match finding.severity {
                Severity::Blocking => severity_counts.blocking += 1,
                Severity::Likely => severity_counts.likely += 1,
                Severity::Advisory => severity_counts.advisory += 1,
            }
        }

        let frequency = |category: &Category| per_category.get(category).map_or(0, |e| e.0);
        findings.sort_by(|a, b| {
            frequency(&b.category)
                .cmp(&frequency(&a.category))
                .then_with(|| a.category.as_str().cmp(b.category.as_str()))
                .then_with(|| a.entity_ref.id.cmp(&b.entity_ref.id))
                .then_with(|| a.message.cmp(&b.message))
        });

        let mut categories: Vec<CategorySummary> = per_category
            .iter()
            .map(|(category, (count, severity))| CategorySummary {
                category: *category,
                severity: *severity,
                count: *count,
            })
            .collect();
        categories.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.category.as_str().cmp(b.category.as_str()))
        });

        let verdict = Verdict::from_findings(&findings);
        let report_digest = report_digest(&findings);
        Self {
            schema: REPORT_SCHEMA,
            report_kind: REPORT_KIND.to_string(),
            repo_name,
            frameworks,
            counts,
            passes,
            findings,
            categories,
            severity_counts,
            score: card.score,
            band: card.band,
            deductions: card.deductions,
            verdict,
            report_digest,
        }
    }

    pub fn has_blocking(&self) -> bool {
        self.severity_counts.blocking > 0
    }
}

fn sort_json_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            let mut sorted = Map::new();
            for key in keys {
                if let Some(item) = map.get(key) {
                    sorted.insert(key.clone(), sort_json_value(item));
                }
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_json_value).collect()),
        _ => value.clone(),
    }
}

/// `bpr1_` + sha256 over the canonical JSON of the ordered findings.
/// Equal inputs give equal digests.
fn report_digest(findings: &[Finding]) -> String {
    let canonical = serde_json::to_value(findings)
        .and_then(|value| serde_json::to_string(&sort_json_value(&value)))
        .unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    format!("{REPORT_DIGEST_PREFIX}{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::EntityRef;
    use crate::score::score;

    fn finding(category: Category, id: &str) -> Finding {
        Finding::new(EntityRef::blueprint(id), category, format!("{id} message"))
    }

    fn assemble(findings: Vec<Finding>) -> AuditReport {
        let card = score(&findings);
        AuditReport::assemble(
            "demo".to_string(),
            vec![],
            EntityCounts::default(),
            vec![],
            findings,
            card,
        )
    }

    #[test]
    fn findings_ordered_by_category_frequency() {
        let report = assemble(vec![
            finding(Category::RoleMain, "b"),
            finding(Category::BodyBleed, "z"),
            finding(Category::RoleMain, "a"),
            finding(Category::AuthIncomplete, "c"),
        ]);
        let order: Vec<(Category, &str)> = report
            .findings
            .iter()
            .map(|f| (f.category, f.entity_ref.id.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (Category::RoleMain, "blueprint.a"),
                (Category::RoleMain, "blueprint.b"),
                (Category::AuthIncomplete, "blueprint.c"),
                (Category::BodyBleed, "blueprint.z"),
            ]
        );
        assert_eq!(report.categories[0].category, Category::RoleMain);
        assert_eq!(report.categories[0].count, 2);
        assert_eq!(
            report.severity_counts,
            SeverityCounts {
                blocking: 2,
                likely: 0,
                advisory: 2
            }
        );
        assert_eq!(report.verdict, Verdict::WillFail);
        assert_eq!(report.score, 80);
    }

    #[test]
    fn digest_is_independent_of_input_order() {
        let a = assemble(vec![
            finding(Category::RoleMain, "a"),
            finding(Category::Conditional, "b"),
        ]);
        let b = assemble(vec![
            finding(Category::Conditional, "b"),
            finding(Category::RoleMain, "a"),
        ]);
        assert_eq!(a.report_digest, b.report_digest);
        assert!(a.report_digest.starts_with(REPORT_DIGEST_PREFIX));
        assert_eq!(a.report_digest.len(), REPORT_DIGEST_PREFIX.len() + 64);

        let c = assemble(vec![finding(Category::RoleMain, "a")]);
        assert_ne!(a.report_digest, c.report_digest);
    }

    #[test]
    fn category_severity_is_the_most_severe_seen() {
        let report = assemble(vec![
            finding(Category::MissingFieldExample, "a").with_severity(Severity::Advisory),
            finding(Category::MissingFieldExample, "b"),
        ]);
        assert_eq!(report.categories[0].severity, Severity::Blocking);
    }

    #[test]
    fn pass_status_serializes_inline() {
        let pass = PassReport {
            name: "sourceAccuracy".to_string(),
            status: PassStatus::not_evaluated("no route source supplied"),
            finding_count: 0,
        };
        assert_eq!(
            serde_json::to_value(&pass).expect("serialize"),
            serde_json::json!({
                "name": "sourceAccuracy",
                "status": "notEvaluated",
                "reason": "no route source supplied",
                "findingCount": 0
            })
        );
    }
}
