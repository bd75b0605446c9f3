//! Blueprint against packaged chunks.

use super::PassOutcome;
use crate::config::RuleConfig;
use crate::finding::{Category, EntityRef, Finding};
use bpaudit_model::{Blueprint, Chunk, ChunkRef};
use std::collections::BTreeSet;

pub const SESSION_COOKIE_SECTION: &str = "SESSION COOKIE";

/// ORPHANED_ENDPOINT, ORPHANED_PAGE, UNKNOWN_CHUNK_ENTITY, plus per-chunk
/// prompt and auth checks. Not evaluated when no chunk is supplied.
pub fn check_chunks(bp: &Blueprint, chunks: &[Chunk], config: &RuleConfig) -> PassOutcome {
    if chunks.is_empty() {
        return PassOutcome::skipped("no chunk documents supplied");
    }

    let packaged_endpoints: BTreeSet<&str> = chunks
        .iter()
        .flat_map(|chunk| chunk.endpoints.iter().map(|r| r.id.as_str()))
        .collect();
    let packaged_pages: BTreeSet<&str> = chunks
        .iter()
        .flat_map(|chunk| chunk.pages.iter().map(|r| r.id.as_str()))
        .collect();

    let mut findings = Vec::new();
    let mut reported_endpoints = BTreeSet::new();
    for ep in bp.endpoints() {
        if !packaged_endpoints.contains(ep.id.as_str())
            && reported_endpoints.insert(ep.id.as_str())
        {
            findings.push(Finding::new(
                EntityRef::endpoint(ep),
                Category::OrphanedEndpoint,
                format!("endpoint `{}` is in no chunk; no test will be generated for it", ep.id),
            ));
        }
    }
    let mut reported_pages = BTreeSet::new();
    for page in bp.pages() {
        if !packaged_pages.contains(page.id.as_str()) && reported_pages.insert(page.id.as_str()) {
            findings.push(Finding::new(
                EntityRef::page(page),
                Category::OrphanedPage,
                format!("page `{}` is in no chunk; no test will be generated for it", page.id),
            ));
        }
    }

    let known_endpoints: BTreeSet<&str> = bp.endpoints().iter().map(|ep| ep.id.as_str()).collect();
    let known_pages: BTreeSet<&str> = bp.pages().iter().map(|page| page.id.as_str()).collect();
    for chunk in chunks {
        unknown_refs(chunk, "endpoint", &chunk.endpoints, &known_endpoints, &mut findings);
        unknown_refs(chunk, "page", &chunk.pages, &known_pages, &mut findings);
        check_chunk(bp, chunk, config, &mut findings);
    }

    tracing::debug!(chunks = chunks.len(), findings = findings.len(), "chunk pass evaluated");
    PassOutcome::evaluated(findings)
}

fn unknown_refs(
    chunk: &Chunk,
    kind: &str,
    refs: &[ChunkRef],
    known: &BTreeSet<&str>,
    findings: &mut Vec<Finding>,
) {
    for r in refs.iter().filter(|r| !known.contains(r.id.as_str())) {
        findings.push(Finding::new(
            EntityRef::chunk(chunk),
            Category::UnknownChunkEntity,
            format!("chunk lists {kind} `{}` which the blueprint does not declare", r.id),
        ));
    }
}

fn check_chunk(bp: &Blueprint, chunk: &Chunk, config: &RuleConfig, findings: &mut Vec<Finding>) {
    let entity = || EntityRef::chunk(chunk);
    if chunk.is_empty() {
        findings.push(Finding::new(
            entity(),
            Category::EmptyChunk,
            "chunk contains no endpoints and no pages",
        ));
    }

    let prompt = chunk.prompt_text.as_str();
    for section in &config.required_prompt_sections {
        if !prompt.contains(section.as_str()) {
            findings.push(Finding::new(
                entity(),
                Category::PromptMissingSection,
                format!("prompt is missing the `{section}` section"),
            ));
        }
    }
    let prompt_chars = prompt.trim().chars().count();
    if prompt_chars < config.min_prompt_chars {
        findings.push(Finding::new(
            entity(),
            Category::PromptTooShort,
            format!(
                "prompt is {prompt_chars} characters; expected at least {}",
                config.min_prompt_chars
            ),
        ));
    }

    let session_cookie = chunk
        .auth
        .as_ref()
        .or(bp.auth.as_ref())
        .is_some_and(|auth| auth.is_session_cookie());
    if session_cookie && !prompt.contains(SESSION_COOKIE_SECTION) {
        findings.push(Finding::new(
            entity(),
            Category::PromptNoSessionCookie,
            "session-cookie auth but the prompt never mentions SESSION COOKIE handling",
        ));
    }

    let needs_auth = chunk.endpoints.iter().any(|r| {
        r.auth_required
            .or_else(|| bp.endpoint_by_id(&r.id).and_then(|ep| ep.auth_required))
            .unwrap_or(false)
    });
    let has_auth = chunk.auth.as_ref().is_some_and(|auth| auth.token_type.is_some());
    if needs_auth && !has_auth {
        findings.push(Finding::new(
            entity(),
            Category::ChunkAuthMissing,
            "chunk has authenticated endpoints but carries no auth config",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Severity;
    use serde_json::{Value, json};

    fn prompt() -> String {
        format!(
            "AUTH USAGE NOTES\nAPI ENDPOINTS TO TEST\nCOVERAGE REQUIREMENTS\n{}",
            "Generate tests for the listed endpoints. ".repeat(4)
        )
    }

    fn chunk(body: Value) -> Chunk {
        Chunk::from_value(&body, "chunk-01.json").expect("fixture chunk should parse")
    }

    fn bp() -> Blueprint {
        Blueprint::from_value(&json!({
            "endpoints": [
                {"id": "ep-1", "method": "GET", "path": "/api/items", "authRequired": false},
                {"id": "ep-2", "method": "POST", "path": "/api/items", "authRequired": true}
            ],
            "pages": [{"id": "pg-1", "route": "/items"}]
        }))
        .expect("fixture blueprint should parse")
    }

    #[test]
    fn no_chunks_means_not_evaluated() {
        let outcome = check_chunks(&bp(), &[], &RuleConfig::default());
        assert!(!outcome.status.is_evaluated());
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn orphaned_entities_are_blocking() {
        let chunks = vec![chunk(json!({
            "llmUserMessage": prompt(),
            "chunk": {
                "endpoints": [{"id": "ep-1"}],
                "pages": [{"id": "pg-1"}]
            }
        }))];
        let outcome = check_chunks(&bp(), &chunks, &RuleConfig::default());
        assert!(outcome.status.is_evaluated());
        let orphaned: Vec<&Finding> = outcome
            .findings
            .iter()
            .filter(|f| f.category == Category::OrphanedEndpoint)
            .collect();
        assert_eq!(orphaned.len(), 1);
        assert_eq!(orphaned[0].entity_ref.id, "ep-2");
        assert_eq!(orphaned[0].severity, Severity::Blocking);
        assert_eq!(outcome.findings.len(), 1);
    }

    #[test]
    fn endpoint_and_page_sharing_an_id_are_both_orphaned() {
        let bp = Blueprint::from_value(&json!({
            "endpoints": [{"id": "x", "method": "GET", "path": "/api/x", "authRequired": false}],
            "pages": [{"id": "x", "route": "/x"}]
        }))
        .expect("fixture blueprint should parse");
        let chunks = vec![chunk(json!({"llmUserMessage": prompt(), "chunk": {}}))];
        let outcome = check_chunks(&bp, &chunks, &RuleConfig::default());
        let mut cats: Vec<Category> = outcome.findings.iter().map(|f| f.category).collect();
        cats.sort();
        assert_eq!(
            cats,
            vec![Category::OrphanedEndpoint, Category::OrphanedPage, Category::EmptyChunk]
        );
        let ids: Vec<&str> = outcome.findings.iter().map(|f| f.entity_ref.id.as_str()).collect();
        assert_eq!(ids.iter().filter(|id| **id == "x").count(), 2);
    }

    #[test]
    fn prompt_and_auth_checks() {
        let chunks = vec![chunk(json!({
            "llmUserMessage": "write tests",
            "chunk": {
                "endpoints": [{"id": "ep-1"}, {"id": "ep-2"}, {"id": "ep-9"}],
                "pages": [{"id": "pg-1"}]
            }
        }))];
        let outcome = check_chunks(&bp(), &chunks, &RuleConfig::default());
        let mut cats: Vec<Category> = outcome.findings.iter().map(|f| f.category).collect();
        cats.sort();
        assert_eq!(
            cats,
            vec![
                Category::UnknownChunkEntity,
                Category::PromptMissingSection,
                Category::PromptMissingSection,
                Category::PromptMissingSection,
                Category::PromptTooShort,
                Category::ChunkAuthMissing
            ]
        );
    }

    #[test]
    fn session_cookie_prompt_must_mention_cookie() {
        let chunks = vec![chunk(json!({
            "llmUserMessage": prompt(),
            "chunk": {
                "endpoints": [{"id": "ep-1"}, {"id": "ep-2"}],
                "pages": [{"id": "pg-1"}],
                "auth": {"tokenType": "session_cookie", "loginEndpoint": "POST /login"}
            }
        }))];
        let outcome = check_chunks(&bp(), &chunks, &RuleConfig::default());
        let cats: Vec<Category> = outcome.findings.iter().map(|f| f.category).collect();
        assert_eq!(cats, vec![Category::PromptNoSessionCookie]);
    }

    #[test]
    fn empty_chunk_is_advisory() {
        let chunks = vec![
            chunk(json!({
                "llmUserMessage": prompt(),
                "chunk": {
                    "endpoints": [{"id": "ep-1"}, {"id": "ep-2", "authRequired": false}],
                    "pages": [{"id": "pg-1"}]
                }
            })),
            chunk(json!({"llmUserMessage": prompt(), "chunk": {}})),
        ];
        let outcome = check_chunks(&bp(), &chunks, &RuleConfig::default());
        let cats: Vec<Category> = outcome.findings.iter().map(|f| f.category).collect();
        assert_eq!(cats, vec![Category::EmptyChunk]);
    }
}
