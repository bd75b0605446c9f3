use super::RuleContext;
use crate::finding::{Category, EntityRef, Finding};
use bpaudit_model::{FLAG_BRITTLE, FLAG_DYNAMIC_LIST, Locator, LocatorStrategy, Page};
use regex::Regex;
use std::sync::OnceLock;

/// Roles that commonly render more than once on a page.
const REPEATABLE_ROLES: &[&str] = &[
    "textbox",
    "combobox",
    "spinbutton",
    "button",
    "link",
    "checkbox",
    "radio",
    "tab",
    "menuitem",
];

fn trailing_role_call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"getByRole\(\s*['"]([a-z]+)['"]\s*(?:,\s*\{([^}]*)\})?\s*\)\s*;?\s*$"#)
            .expect("trailing role call regex must compile")
    })
}

fn name_option_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bname\s*:").expect("name option regex must compile"))
}

fn role_main_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"getByRole\(\s*['"]main['"]\s*\)"#).expect("role main regex must compile")
    })
}

fn quoted_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"name\s*:\s*(?:'([^']*)'|"([^"]*)")"#).expect("quoted name regex must compile")
    })
}

fn dynamic_segment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[[a-zA-Z][a-zA-Z0-9_-]*\]").expect("dynamic segment regex must compile")
    })
}

fn undefined_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bundefined\b").expect("undefined regex must compile"))
}

/// Interactive `getByRole(role)` with no accessible name, as the final call
/// of the expression. Chained `.first()`, `.nth()` or `.filter()` counts as
/// disambiguated. Matched on the selector expression; `strategy` is not
/// consulted.
pub(super) fn unqualified_role(page: &Page, loc: &Locator, _ctx: &RuleContext<'_>) -> Vec<Finding> {
    if !loc.is_interactive {
        return Vec::new();
    }
    let Some(caps) = trailing_role_call_re().captures(loc.code()) else {
        return Vec::new();
    };
    let role = caps.get(1).map_or("", |m| m.as_str());
    let named = caps
        .get(2)
        .is_some_and(|opts| name_option_re().is_match(opts.as_str()));
    if named || !REPEATABLE_ROLES.contains(&role) {
        return Vec::new();
    }
    vec![Finding::new(
        EntityRef::locator(page, loc),
        Category::UnqualifiedRole,
        format!("getByRole('{role}') has no name; strict mode fails when more than one {role} renders"),
    )]
}

/// DYNAMIC_LIST_INTERACTIVE, DYNAMIC_LIST_VIEW.
pub(super) fn dynamic_list(page: &Page, loc: &Locator, _ctx: &RuleContext<'_>) -> Vec<Finding> {
    if !loc.has_flag(FLAG_DYNAMIC_LIST) {
        return Vec::new();
    }
    let finding = if loc.is_interactive {
        Finding::new(
            EntityRef::locator(page, loc),
            Category::DynamicListInteractive,
            "interactive locator matches every item of a rendered list",
        )
    } else {
        Finding::new(
            EntityRef::locator(page, loc),
            Category::DynamicListView,
            "locator matches every item of a rendered list",
        )
    };
    vec![finding]
}

/// Heading locator whose name was cut off mid-text.
pub(super) fn heading_partial(page: &Page, loc: &Locator, _ctx: &RuleContext<'_>) -> Vec<Finding> {
    let code = loc.code();
    let is_heading = loc.strategy == Some(LocatorStrategy::Heading)
        || code.contains("'heading'")
        || code.contains("\"heading\"");
    if !is_heading {
        return Vec::new();
    }
    let Some(name) = quoted_name_re()
        .captures(code)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str())
    else {
        return Vec::new();
    };
    if !is_truncated(name) {
        return Vec::new();
    }
    vec![Finding::new(
        EntityRef::locator(page, loc),
        Category::HeadingPartial,
        format!("heading name `{name}` looks truncated; exact matching will miss it"),
    )]
}

fn is_truncated(name: &str) -> bool {
    let trimmed = name.trim_end();
    let unbalanced = |open: char, close: char| {
        trimmed.matches(open).count() > trimmed.matches(close).count()
    };
    trimmed.ends_with(['(', '[']) || unbalanced('(', ')') || unbalanced('[', ']')
}

pub(super) fn role_main(page: &Page, loc: &Locator, _ctx: &RuleContext<'_>) -> Vec<Finding> {
    if !role_main_re().is_match(loc.code()) {
        return Vec::new();
    }
    vec![Finding::new(
        EntityRef::locator(page, loc),
        Category::RoleMain,
        "getByRole('main') relies on a landmark many layouts omit",
    )]
}

pub(super) fn conditional(page: &Page, loc: &Locator, _ctx: &RuleContext<'_>) -> Vec<Finding> {
    if !loc.is_conditional {
        return Vec::new();
    }
    vec![Finding::new(
        EntityRef::locator(page, loc),
        Category::Conditional,
        "element only renders under some condition",
    )]
}

/// LOCATOR_NO_CODE, LOCATOR_UNDEFINED, LOCATOR_NO_PAGE_ROOT,
/// LOCATOR_DYNAMIC_SEGMENT.
pub(super) fn selector_code(page: &Page, loc: &Locator, ctx: &RuleContext<'_>) -> Vec<Finding> {
    let code = loc.code();
    let entity = || EntityRef::locator(page, loc);
    if code.is_empty() {
        return vec![Finding::new(
            entity(),
            Category::LocatorNoCode,
            "locator has no selector expression",
        )];
    }

    let mut findings = Vec::new();
    if code == "null" || undefined_re().is_match(code) {
        findings.push(Finding::new(
            entity(),
            Category::LocatorUndefined,
            format!("selector expression `{code}` contains an undefined value"),
        ));
    }
    let rooted = code.starts_with("//")
        || code.starts_with('#')
        || ctx
            .config
            .page_root_prefixes
            .iter()
            .any(|prefix| code.starts_with(prefix.as_str()));
    if !rooted {
        findings.push(Finding::new(
            entity(),
            Category::LocatorNoPageRoot,
            format!("selector expression `{code}` is not rooted at the page"),
        ));
    }
    if let Some(segment) = dynamic_segment_re().find(code) {
        findings.push(Finding::new(
            entity(),
            Category::LocatorDynamicSegment,
            format!(
                "selector contains framework route segment `{}`",
                segment.as_str()
            ),
        ));
    }
    findings
}

/// UNKNOWN_STRATEGY, BRITTLE_LOCATOR.
pub(super) fn strategy(page: &Page, loc: &Locator, _ctx: &RuleContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    if let Some(LocatorStrategy::Other(raw)) = &loc.strategy {
        findings.push(Finding::new(
            EntityRef::locator(page, loc),
            Category::UnknownStrategy,
            format!("unknown locator strategy `{raw}`"),
        ));
    }
    let structural = matches!(
        loc.strategy,
        Some(LocatorStrategy::Css | LocatorStrategy::Xpath)
    );
    if structural || loc.has_flag(FLAG_BRITTLE) {
        findings.push(Finding::new(
            EntityRef::locator(page, loc),
            Category::BrittleLocator,
            "locator depends on document structure",
        ));
    }
    findings
}

pub(super) fn low_confidence(page: &Page, loc: &Locator, ctx: &RuleContext<'_>) -> Vec<Finding> {
    match loc.confidence {
        Some(score) if score < ctx.config.low_locator_confidence => vec![Finding::new(
            EntityRef::locator(page, loc),
            Category::LowConfidence,
            format!(
                "locator confidence {score:.2} is below {:.2}",
                ctx.config.low_locator_confidence
            ),
        )],
        _ => Vec::new(),
    }
}
