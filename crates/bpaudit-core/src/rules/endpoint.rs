use super::RuleContext;
use crate::finding::{Category, EntityRef, Finding, Severity};
use crate::resolve::fk::fk_resource;
use bpaudit_model::{Endpoint, HttpMethod, has_example, route_tokens};
use std::collections::{BTreeMap, BTreeSet};

pub(super) fn duplicates(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    for ep in ctx.blueprint.endpoints() {
        *seen.entry(ep.key()).or_default() += 1;
    }
    let mut reported = BTreeSet::new();
    ctx.blueprint
        .endpoints()
        .iter()
        .filter(|ep| seen.get(&ep.key()).copied().unwrap_or_default() > 1)
        .filter(|ep| reported.insert(ep.key()))
        .map(|ep| {
            Finding::new(
                EntityRef::endpoint(ep),
                Category::DuplicateEndpoint,
                format!("{} is declared {} times", ep.key(), seen[&ep.key()]),
            )
        })
        .collect()
}

pub(super) fn bad_method(ep: &Endpoint, _ctx: &RuleContext<'_>) -> Vec<Finding> {
    if ep.method.is_known() {
        return Vec::new();
    }
    vec![Finding::new(
        EntityRef::endpoint(ep),
        Category::BadMethod,
        format!("unrecognised HTTP method `{}`", ep.method),
    )]
}

pub(super) fn body_bleed(ep: &Endpoint, _ctx: &RuleContext<'_>) -> Vec<Finding> {
    if !ep.method.is_read() || ep.request_body.is_none() {
        return Vec::new();
    }
    vec![Finding::new(
        EntityRef::endpoint(ep),
        Category::BodyBleed,
        format!(
            "{} declares a request body; generated tests will send it and fail",
            ep.method
        ),
    )]
}

/// NO_BODY, EMPTY_BODY_FIELDS.
pub(super) fn missing_body(ep: &Endpoint, ctx: &RuleContext<'_>) -> Vec<Finding> {
    if !ep.method.is_write() || ctx.config.is_legitimately_empty(&ep.key()) {
        return Vec::new();
    }
    match &ep.request_body {
        None => vec![Finding::new(
            EntityRef::endpoint(ep),
            Category::NoBody,
            format!("{} endpoint has no request body", ep.method),
        )],
        Some(body) if body.fields.is_empty() => vec![Finding::new(
            EntityRef::endpoint(ep),
            Category::EmptyBodyFields,
            "request body declares no fields",
        )],
        Some(_) => Vec::new(),
    }
}

/// MISSING_FIELD_EXAMPLE, FK_NO_EXAMPLE, FIELD_NO_TYPE.
pub(super) fn body_fields(ep: &Endpoint, _ctx: &RuleContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for field in ep.body_fields() {
        let entity = EntityRef::field(ep, &field.name);
        let has_value = has_example(field.example.as_ref());
        if !has_value {
            let (severity, qualifier) = if field.required {
                (Severity::Blocking, "required")
            } else {
                (Severity::Advisory, "optional")
            };
            findings.push(
                Finding::new(
                    entity.clone(),
                    Category::MissingFieldExample,
                    format!("{qualifier} field `{}` has no example value", field.name),
                )
                .with_severity(severity),
            );
            if let Some(resource) = fk_resource(&field.name) {
                findings.push(Finding::new(
                    entity.clone(),
                    Category::FkNoExample,
                    format!(
                        "foreign key `{}` has no example; tests cannot reference an existing {resource}",
                        field.name
                    ),
                ));
            }
        }
        if field.field_type.as_deref().is_none_or(str::is_empty) {
            findings.push(Finding::new(
                entity,
                Category::FieldNoType,
                format!("field `{}` has no type", field.name),
            ));
        }
    }
    findings
}

/// MISSING_PP, ORPHAN_PATH_PARAM, PATH_PARAM_NO_EXAMPLE.
pub(super) fn path_params(ep: &Endpoint, _ctx: &RuleContext<'_>) -> Vec<Finding> {
    let tokens = route_tokens(&ep.path);
    let declared: BTreeSet<&str> = ep.path_params.iter().map(|p| p.name.as_str()).collect();
    let mut findings = Vec::new();

    for token in &tokens {
        if !declared.contains(token.as_str()) {
            findings.push(Finding::new(
                EntityRef::endpoint(ep),
                Category::MissingPathParam,
                format!("path token `{token}` has no pathParams entry"),
            ));
        }
    }
    for param in &ep.path_params {
        if !tokens.contains(&param.name) {
            findings.push(Finding::new(
                EntityRef::endpoint(ep),
                Category::OrphanPathParam,
                format!("pathParams entry `{}` does not appear in the path", param.name),
            ));
        } else if !has_example(param.example.as_ref()) {
            findings.push(Finding::new(
                EntityRef::endpoint(ep),
                Category::PathParamNoExample,
                format!("path param `{}` has no example value", param.name),
            ));
        }
    }
    findings
}

pub(super) fn response_schema(ep: &Endpoint, _ctx: &RuleContext<'_>) -> Vec<Finding> {
    if ep.method == HttpMethod::Delete || ep.response_schema.is_some() {
        return Vec::new();
    }
    vec![Finding::new(
        EntityRef::endpoint(ep),
        Category::NoResponseSchema,
        "no response schema; assertions will be shallow",
    )]
}

/// AUTH_TYPE_MISSING, AUTH_FLAG_UNSET.
pub(super) fn auth_flags(ep: &Endpoint, _ctx: &RuleContext<'_>) -> Vec<Finding> {
    match ep.auth_required {
        None => vec![Finding::new(
            EntityRef::endpoint(ep),
            Category::AuthFlagUnset,
            "authRequired is not set",
        )],
        Some(true) if ep.auth_type.is_none() => vec![Finding::new(
            EntityRef::endpoint(ep),
            Category::AuthTypeMissing,
            "authRequired is true but authType is missing",
        )],
        Some(_) => Vec::new(),
    }
}

pub(super) fn page_route(ep: &Endpoint, _ctx: &RuleContext<'_>) -> Vec<Finding> {
    if !ep.is_page_route {
        return Vec::new();
    }
    vec![Finding::new(
        EntityRef::endpoint(ep),
        Category::PageRouteEndpoint,
        "page route recorded as an API endpoint",
    )]
}

pub(super) fn low_confidence(ep: &Endpoint, ctx: &RuleContext<'_>) -> Vec<Finding> {
    match ep.confidence {
        Some(score) if score < ctx.config.low_confidence => vec![Finding::new(
            EntityRef::endpoint(ep),
            Category::LowConfidence,
            format!(
                "extraction confidence {score:.2} is below {:.2}",
                ctx.config.low_confidence
            ),
        )],
        _ => Vec::new(),
    }
}
