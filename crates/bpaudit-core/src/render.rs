//! Human-readable report rendering.

use crate::finding::Severity;
use crate::report::AuditReport;
use crate::resolve::PassStatus;

/// Render a report as indented text: header, findings grouped by category
/// (most frequent first), severity totals with their categories, pass
/// statuses, then the score and verdict.
pub fn render_text(report: &AuditReport) -> String {
    let mut lines = Vec::new();
    let repo = if report.repo_name.is_empty() {
        "(unnamed)"
    } else {
        report.repo_name.as_str()
    };
    lines.push(format!("bpaudit report: {repo}"));
    lines.push(format!(
        "  frameworks: {}",
        if report.frameworks.is_empty() {
            "none".to_string()
        } else {
            report.frameworks.join(", ")
        }
    ));
    let c = &report.counts;
    lines.push(format!(
        "  entities: endpoints={} pages={} locators={} chunks={} scannedRoutes={}",
        c.endpoints, c.pages, c.locators, c.chunks, c.scanned_routes
    ));

    if report.findings.is_empty() {
        lines.push("  findings: none".to_string());
    } else {
        lines.push(format!("  findings: {}", report.findings.len()));
    }
    for summary in &report.categories {
        lines.push(format!(
            "  [{}] x{} {}",
            summary.category, summary.count, summary.severity
        ));
        for finding in report
            .findings
            .iter()
            .filter(|f| f.category == summary.category)
        {
            lines.push(format!(
                "    - {} {}: {}",
                finding.severity, finding.entity_ref.context, finding.message
            ));
        }
    }

    lines.push("  severity:".to_string());
    for severity in Severity::ALL {
        let count = report.severity_counts.get(severity);
        let members: Vec<String> = report
            .categories
            .iter()
            .filter(|summary| {
                report
                    .findings
                    .iter()
                    .any(|f| f.category == summary.category && f.severity == severity)
            })
            .map(|summary| summary.category.to_string())
            .collect();
        if members.is_empty() {
            lines.push(format!("    {severity}: {count}"));
        } else {
            lines.push(format!("    {severity}: {count} [{}]", members.join(", ")));
        }
    }

    lines.push("  passes:".to_string());
    for pass in &report.passes {
        let status = match &pass.status {
            PassStatus::Evaluated => format!("evaluated ({} findings)", pass.finding_count),
            PassStatus::NotEvaluated { reason } => format!("not evaluated ({reason})"),
        };
        lines.push(format!("    - {}: {status}", pass.name));
    }

    lines.push(format!("  score: {}/100 ({})", report.score, report.band));
    if !report.deductions.is_empty() {
        let deductions: Vec<String> = report
            .deductions
            .iter()
            .map(|d| format!("{} -{}", d.category, d.points))
            .collect();
        lines.push(format!("  deductions: {}", deductions.join(", ")));
    }
    lines.push(format!("  verdict: {}", report.verdict));
    lines.join("\n")
}
