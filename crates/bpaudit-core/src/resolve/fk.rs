//! Foreign-key resolvability.
//!
//! A body field named `<resource>Id` (or `<resource>ID`) is a foreign key.
//! A test can only supply a real value if some GET endpoint lists that
//! resource, ideally within the same chunk so the test can fetch it first.

use crate::finding::{Category, EntityRef, Finding};
use bpaudit_model::{Blueprint, Chunk, Endpoint, HttpMethod};
use std::collections::HashMap;

/// Resource a foreign-key field points at: the name minus its `Id`/`ID`
/// suffix, lowercased. `None` for names that are not foreign keys.
pub fn fk_resource(field: &str) -> Option<String> {
    if field.len() <= 2 {
        return None;
    }
    let stem = field
        .strip_suffix("Id")
        .or_else(|| field.strip_suffix("ID"))?;
    Some(stem.to_lowercase())
}

/// REQUIRED_FK_UNRESOLVABLE, REQUIRED_FK_CROSS_CHUNK, OPTIONAL_FK_UNRESOLVED.
///
/// An endpoint's domain is that of the first chunk containing it, falling
/// back to its own `domain` when no chunk does.
pub fn check_fk(bp: &Blueprint, chunks: &[Chunk]) -> Vec<Finding> {
    let mut chunk_domain: HashMap<&str, &str> = HashMap::new();
    for chunk in chunks {
        for r in &chunk.endpoints {
            chunk_domain.entry(r.id.as_str()).or_insert(chunk.domain.as_str());
        }
    }
    let domain_of = |ep: &Endpoint| -> String {
        chunk_domain
            .get(ep.id.as_str())
            .map(|d| (*d).to_string())
            .unwrap_or_else(|| ep.domain.clone())
    };

    let lists: Vec<(String, String)> = bp
        .endpoints()
        .iter()
        .filter(|ep| ep.method == HttpMethod::Get)
        .map(|ep| (domain_of(ep), ep.path.to_lowercase()))
        .collect();

    let mut findings = Vec::new();
    for ep in bp.endpoints() {
        let domain = domain_of(ep);
        for field in ep.body_fields() {
            let Some(resource) = fk_resource(&field.name) else {
                continue;
            };
            let mut local = false;
            let mut anywhere = false;
            for (list_domain, path) in &lists {
                if path.contains(&resource) {
                    anywhere = true;
                    local |= *list_domain == domain;
                }
            }
            if local {
                continue;
            }
            let entity = EntityRef::field(ep, &field.name);
            let finding = match (field.required, anywhere) {
                (true, true) => Finding::new(
                    entity,
                    Category::RequiredFkCrossChunk,
                    format!(
                        "required `{}` is only listable from another chunk; the test cannot fetch a {resource} first",
                        field.name
                    ),
                ),
                (true, false) => Finding::new(
                    entity,
                    Category::RequiredFkUnresolvable,
                    format!(
                        "required `{}` has no GET endpoint listing {resource}",
                        field.name
                    ),
                ),
                (false, _) => Finding::new(
                    entity,
                    Category::OptionalFkUnresolved,
                    format!(
                        "optional `{}` has no same-chunk GET endpoint listing {resource}",
                        field.name
                    ),
                ),
            };
            findings.push(finding);
        }
    }
    tracing::debug!(findings = findings.len(), "foreign-key pass evaluated");
    findings
}
