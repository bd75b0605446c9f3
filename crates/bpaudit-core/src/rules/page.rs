use super::RuleContext;
use crate::finding::{Category, EntityRef, Finding};
use bpaudit_model::{Page, route_tokens};
use std::collections::{BTreeMap, BTreeSet};

const SOURCE_FILE_EXTENSIONS: &[&str] = &[".tsx", ".ts", ".jsx", ".js", ".vue", ".svelte", ".mdx"];

/// Titles a page extractor falls back to when it found nothing better.
const PLACEHOLDER_TITLES: &[&str] = &["[id]", "index", "page", "unknown"];

pub(super) fn duplicates(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for page in ctx.blueprint.pages() {
        *seen.entry(page.route.as_str()).or_default() += 1;
    }
    let mut reported = BTreeSet::new();
    ctx.blueprint
        .pages()
        .iter()
        .filter(|page| seen.get(page.route.as_str()).copied().unwrap_or_default() > 1)
        .filter(|page| reported.insert(page.route.as_str()))
        .map(|page| {
            Finding::new(
                EntityRef::page(page),
                Category::DuplicatePageRoute,
                format!(
                    "route {} is declared {} times",
                    page.route,
                    seen[page.route.as_str()]
                ),
            )
        })
        .collect()
}

/// One DUPLICATE_ON_PAGE per group of locators sharing an expression.
pub(super) fn duplicate_locators(page: &Page, _ctx: &RuleContext<'_>) -> Vec<Finding> {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, locator) in page.locators.iter().enumerate() {
        let code = locator.code();
        if !code.is_empty() {
            groups.entry(code).or_default().push(idx);
        }
    }
    groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(code, members)| {
            let names: Vec<&str> = members
                .iter()
                .map(|idx| page.locators[*idx].name.as_str())
                .collect();
            Finding::new(
                EntityRef::locator(page, &page.locators[members[0]]),
                Category::DuplicateOnPage,
                format!("`{code}` is shared by {}", names.join(", ")),
            )
        })
        .collect()
}

pub(super) fn no_locators(page: &Page, _ctx: &RuleContext<'_>) -> Vec<Finding> {
    if !page.locators.is_empty() {
        return Vec::new();
    }
    vec![Finding::new(
        EntityRef::page(page),
        Category::NoLocators,
        "page has no locators; UI tests can only assert navigation",
    )]
}

pub(super) fn bad_route(page: &Page, _ctx: &RuleContext<'_>) -> Vec<Finding> {
    let route = page.route.as_str();
    let reason = if !route.starts_with('/') {
        Some("does not start with `/`")
    } else if route.contains('\\') {
        Some("contains a backslash")
    } else if is_source_file(route) {
        Some("looks like a source file path")
    } else {
        None
    };
    reason
        .map(|reason| {
            vec![Finding::new(
                EntityRef::page(page),
                Category::BadRoute,
                format!("route `{route}` {reason}"),
            )]
        })
        .unwrap_or_default()
}

fn is_source_file(route: &str) -> bool {
    let last = route.rsplit('/').next().unwrap_or(route);
    SOURCE_FILE_EXTENSIONS.iter().any(|ext| last.ends_with(ext))
}

/// DYNAMIC_ROUTE_NO_PARAMS, ORPHAN_ROUTE_PARAM, UNDECLARED_ROUTE_PARAM.
pub(super) fn route_params(page: &Page, _ctx: &RuleContext<'_>) -> Vec<Finding> {
    let tokens = route_tokens(&page.route);
    let mut findings = Vec::new();
    if page.route_params.is_empty() {
        if page.is_dynamic {
            findings.push(Finding::new(
                EntityRef::page(page),
                Category::DynamicRouteNoParams,
                "dynamic page declares no route params",
            ));
        }
        return findings;
    }

    let declared: BTreeSet<&str> = page.route_params.iter().map(|p| p.name.as_str()).collect();
    for param in &declared {
        if !tokens.iter().any(|t| t == param) {
            findings.push(Finding::new(
                EntityRef::page(page),
                Category::OrphanRouteParam,
                format!("route param `{param}` does not appear in the route"),
            ));
        }
    }
    for token in &tokens {
        if !declared.contains(token.as_str()) {
            findings.push(Finding::new(
                EntityRef::page(page),
                Category::UndeclaredRouteParam,
                format!("route token `{token}` is not declared in routeParams"),
            ));
        }
    }
    findings
}

pub(super) fn bad_title(page: &Page, _ctx: &RuleContext<'_>) -> Vec<Finding> {
    let title = page.title.trim();
    let placeholder = PLACEHOLDER_TITLES
        .iter()
        .any(|p| title.eq_ignore_ascii_case(p));
    if !title.is_empty() && !placeholder {
        return Vec::new();
    }
    vec![Finding::new(
        EntityRef::page(page),
        Category::BadTitle,
        format!("title `{title}` is empty or a placeholder; title assertions will fail"),
    )]
}

pub(super) fn form_flow_refs(page: &Page, _ctx: &RuleContext<'_>) -> Vec<Finding> {
    page.form_flows
        .iter()
        .flat_map(|flow| flow.steps.iter().map(move |step| (flow, step)))
        .filter(|(_, step)| !step.locator_ref.is_empty() && page.locator(&step.locator_ref).is_none())
        .map(|(flow, step)| {
            Finding::new(
                EntityRef::page(page),
                Category::FormFlowUnresolvedRef,
                format!(
                    "form flow `{}` step `{}` refers to unknown locator `{}`",
                    flow.name, step.action, step.locator_ref
                ),
            )
        })
        .collect()
}

pub(super) fn auth_flag(page: &Page, _ctx: &RuleContext<'_>) -> Vec<Finding> {
    if page.auth_required.is_some() {
        return Vec::new();
    }
    vec![Finding::new(
        EntityRef::page(page),
        Category::AuthFlagUnset,
        "authRequired is not set",
    )]
}

pub(super) fn low_confidence(page: &Page, ctx: &RuleContext<'_>) -> Vec<Finding> {
    match page.confidence {
        Some(score) if score < ctx.config.low_confidence => vec![Finding::new(
            EntityRef::page(page),
            Category::LowConfidence,
            format!(
                "extraction confidence {score:.2} is below {:.2}",
                ctx.config.low_confidence
            ),
        )],
        _ => Vec::new(),
    }
}
