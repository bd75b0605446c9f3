//! # bpaudit-core
//!
//! Validation engine for test-generation blueprints. One call to
//! [`Auditor::audit`] runs, in order:
//!
//! 1. the per-entity rules ([`rules`]),
//! 2. blueprint against chunks ([`resolve::chunks`]),
//! 3. blueprint against an external route source ([`resolve::source`]),
//! 4. foreign-key resolvability ([`resolve::fk`]),
//!
//! then scores the combined findings ([`score`]) and assembles an
//! [`AuditReport`]. Passes whose inputs are absent are reported as not
//! evaluated. The engine is deterministic: equal inputs produce equal
//! reports, digest included.

pub mod config;
pub mod finding;
pub mod render;
pub mod report;
pub mod resolve;
pub mod rules;
pub mod score;

pub use config::{AuditConfig, ConfigError, InputLocations, RuleConfig};
pub use finding::{Category, EntityKind, EntityRef, Finding, Severity};
pub use render::render_text;
pub use report::{AuditReport, CategorySummary, EntityCounts, PassReport, SeverityCounts};
pub use resolve::PassStatus;
pub use resolve::source::{RouteSource, RouteSourceError, ScanDocument, StaticRoutes};
pub use rules::{RuleContext, RuleEngine};
pub use score::{Band, Verdict};

use bpaudit_model::{Blueprint, Chunk};
use resolve::PassOutcome;

pub const PASS_RULES: &str = "rules";
pub const PASS_CHUNKS: &str = "chunkCompleteness";
pub const PASS_SOURCE: &str = "sourceAccuracy";
pub const PASS_FK: &str = "fkResolvability";

/// Everything one audit run reads.
#[derive(Clone, Copy)]
pub struct AuditInputs<'a> {
    pub blueprint: &'a Blueprint,
    pub chunks: &'a [Chunk],
    pub route_source: Option<&'a dyn RouteSource>,
}

impl<'a> AuditInputs<'a> {
    pub fn new(blueprint: &'a Blueprint) -> Self {
        Self {
            blueprint,
            chunks: &[],
            route_source: None,
        }
    }

    pub fn with_chunks(mut self, chunks: &'a [Chunk]) -> Self {
        self.chunks = chunks;
        self
    }

    pub fn with_route_source(mut self, source: &'a dyn RouteSource) -> Self {
        self.route_source = Some(source);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Auditor {
    engine: RuleEngine,
    config: RuleConfig,
}

impl Auditor {
    pub fn new(config: RuleConfig) -> Self {
        Self {
            engine: RuleEngine::default(),
            config,
        }
    }

    pub fn with_engine(mut self, engine: RuleEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Run every pass and assemble the report. Fails only when the route
    /// source cannot produce its routes.
    pub fn audit(&self, inputs: AuditInputs<'_>) -> Result<AuditReport, RouteSourceError> {
        let bp = inputs.blueprint;
        let ctx = RuleContext {
            blueprint: bp,
            config: &self.config,
        };

        let rules = PassOutcome::evaluated(self.engine.evaluate(&ctx));
        tracing::debug!(findings = rules.findings.len(), "rule pass evaluated");

        let chunks = resolve::chunks::check_chunks(bp, inputs.chunks, &self.config);

        let (source, scanned_routes) = match inputs.route_source {
            None => (PassOutcome::skipped("no route source supplied"), 0),
            Some(route_source) => {
                let routes = route_source.routes()?;
                tracing::debug!(
                    source = route_source.name(),
                    routes = routes.len(),
                    "route source loaded"
                );
                let outcome =
                    PassOutcome::evaluated(resolve::source::compare_routes(bp, &routes));
                (outcome, routes.len())
            }
        };

        let fk = PassOutcome::evaluated(resolve::fk::check_fk(bp, inputs.chunks));

        let mut passes = Vec::new();
        let mut findings = Vec::new();
        for (name, outcome) in [
            (PASS_RULES, rules),
            (PASS_CHUNKS, chunks),
            (PASS_SOURCE, source),
            (PASS_FK, fk),
        ] {
            passes.push(PassReport {
                name: name.to_string(),
                status: outcome.status,
                finding_count: outcome.findings.len(),
            });
            findings.extend(outcome.findings);
        }

        let counts = EntityCounts {
            endpoints: bp.endpoints().len(),
            pages: bp.pages().len(),
            locators: bp.locator_count(),
            chunks: inputs.chunks.len(),
            scanned_routes,
        };
        let card = score::score(&findings);
        let report = AuditReport::assemble(
            bp.repo_name.clone(),
            bp.frameworks.clone(),
            counts,
            passes,
            findings,
            card,
        );
        tracing::debug!(
            findings = report.findings.len(),
            score = report.score,
            verdict = %report.verdict,
            "audit complete"
        );
        Ok(report)
    }
}

/// Audit with the built-in rules.
pub fn audit(inputs: AuditInputs<'_>, config: &RuleConfig) -> Result<AuditReport, RouteSourceError> {
    Auditor::new(config.clone()).audit(inputs)
}
