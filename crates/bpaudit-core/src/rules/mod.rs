//! Per-entity defect rules.
//!
//! Each rule is a plain function over one entity kind, registered in
//! [`BUILTIN_RULES`]. [`RuleEngine`] walks the blueprint once per rule and
//! collects whatever the rule emits. Adding a category means writing one
//! function and one registry row.

mod auth;
mod endpoint;
mod locator;
mod page;

use crate::config::RuleConfig;
use crate::finding::Finding;
use bpaudit_model::{Blueprint, Endpoint, Locator, Page};

/// Read-only context every rule receives.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub blueprint: &'a Blueprint,
    pub config: &'a RuleConfig,
}

/// A rule body, typed by the entity it inspects.
#[derive(Clone, Copy)]
pub enum Check {
    Blueprint(fn(&RuleContext<'_>) -> Vec<Finding>),
    Endpoint(fn(&Endpoint, &RuleContext<'_>) -> Vec<Finding>),
    Page(fn(&Page, &RuleContext<'_>) -> Vec<Finding>),
    Locator(fn(&Page, &Locator, &RuleContext<'_>) -> Vec<Finding>),
}

#[derive(Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub check: Check,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("id", &self.id).finish_non_exhaustive()
    }
}

pub static BUILTIN_RULES: &[Rule] = &[
    // blueprint
    Rule { id: "auth.config", check: Check::Blueprint(auth::auth_config) },
    Rule { id: "endpoint.duplicates", check: Check::Blueprint(endpoint::duplicates) },
    Rule { id: "page.duplicates", check: Check::Blueprint(page::duplicates) },
    // endpoint
    Rule { id: "endpoint.method", check: Check::Endpoint(endpoint::bad_method) },
    Rule { id: "endpoint.body_bleed", check: Check::Endpoint(endpoint::body_bleed) },
    Rule { id: "endpoint.missing_body", check: Check::Endpoint(endpoint::missing_body) },
    Rule { id: "endpoint.body_fields", check: Check::Endpoint(endpoint::body_fields) },
    Rule { id: "endpoint.path_params", check: Check::Endpoint(endpoint::path_params) },
    Rule { id: "endpoint.response_schema", check: Check::Endpoint(endpoint::response_schema) },
    Rule { id: "endpoint.auth", check: Check::Endpoint(endpoint::auth_flags) },
    Rule { id: "endpoint.page_route", check: Check::Endpoint(endpoint::page_route) },
    Rule { id: "endpoint.confidence", check: Check::Endpoint(endpoint::low_confidence) },
    // page
    Rule { id: "page.duplicate_locators", check: Check::Page(page::duplicate_locators) },
    Rule { id: "page.no_locators", check: Check::Page(page::no_locators) },
    Rule { id: "page.route", check: Check::Page(page::bad_route) },
    Rule { id: "page.route_params", check: Check::Page(page::route_params) },
    Rule { id: "page.title", check: Check::Page(page::bad_title) },
    Rule { id: "page.form_flows", check: Check::Page(page::form_flow_refs) },
    Rule { id: "page.auth", check: Check::Page(page::auth_flag) },
    Rule { id: "page.confidence", check: Check::Page(page::low_confidence) },
    // locator
    Rule { id: "locator.unqualified_role", check: Check::Locator(locator::unqualified_role) },
    Rule { id: "locator.dynamic_list", check: Check::Locator(locator::dynamic_list) },
    Rule { id: "locator.heading_partial", check: Check::Locator(locator::heading_partial) },
    Rule { id: "locator.role_main", check: Check::Locator(locator::role_main) },
    Rule { id: "locator.conditional", check: Check::Locator(locator::conditional) },
    Rule { id: "locator.selector_code", check: Check::Locator(locator::selector_code) },
    Rule { id: "locator.strategy", check: Check::Locator(locator::strategy) },
    Rule { id: "locator.confidence", check: Check::Locator(locator::low_confidence) },
];

/// Runs a set of rules over every entity of a blueprint.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self {
            rules: BUILTIN_RULES.to_vec(),
        }
    }
}

impl RuleEngine {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Finding> {
        let bp = ctx.blueprint;
        let mut findings = Vec::new();
        for rule in &self.rules {
            let before = findings.len();
            match rule.check {
                Check::Blueprint(check) => findings.extend(check(ctx)),
                Check::Endpoint(check) => {
                    for ep in bp.endpoints() {
                        findings.extend(check(ep, ctx));
                    }
                }
                Check::Page(check) => {
                    for page in bp.pages() {
                        findings.extend(check(page, ctx));
                    }
                }
                Check::Locator(check) => {
                    for (page, locator) in bp.locators() {
                        findings.extend(check(page, locator, ctx));
                    }
                }
            }
            tracing::trace!(rule = rule.id, emitted = findings.len() - before, "rule evaluated");
        }
        findings
    }
}
