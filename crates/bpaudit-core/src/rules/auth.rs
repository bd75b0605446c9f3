use super::RuleContext;
use crate::finding::{Category, EntityRef, Finding};

/// AUTH_INCOMPLETE, NO_SEED_CREDS, NO_TOKEN_PATH.
///
/// An absent auth config yields exactly one AUTH_INCOMPLETE; the
/// credential and token checks only apply to a config that exists.
pub(super) fn auth_config(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let entity = EntityRef::blueprint("auth");
    let Some(auth) = ctx.blueprint.auth.as_ref() else {
        return vec![Finding::new(
            entity,
            Category::AuthIncomplete,
            "blueprint has no auth config; authenticated tests cannot log in",
        )];
    };

    let mut findings = Vec::new();
    let mut missing = Vec::new();
    if auth.token_type.is_none() {
        missing.push("tokenType");
    }
    if auth.login_endpoint.is_none() {
        missing.push("loginEndpoint");
    }
    if !missing.is_empty() {
        findings.push(Finding::new(
            entity.clone(),
            Category::AuthIncomplete,
            format!("auth config is missing {}", missing.join(", ")),
        ));
    }
    if !auth.has_seed_credentials() {
        findings.push(Finding::new(
            entity.clone(),
            Category::NoSeedCreds,
            "no default credentials; generated login steps will use placeholders",
        ));
    }
    if auth.is_bearer_jwt() && auth.token_response_path.is_none() {
        findings.push(Finding::new(
            entity,
            Category::NoTokenPath,
            "bearer token type without tokenResponsePath; token extraction is a guess",
        ));
    }
    findings
}

#[cfg(test)]
mod tests {
    use crate::finding::Category;
    use crate::rules::testing::*;
    use serde_json::json;

    #[test]
    fn complete_auth_is_clean() {
        let findings = run(&blueprint(json!({
            "endpoints": [],
            "auth": {
                "tokenType": "bearer_jwt",
                "loginEndpoint": "POST /auth/login",
                "defaultEmail": "admin@example.com",
                "defaultPassword": "secret",
                "tokenResponsePath": "data.token"
            }
        })));
        assert!(findings.is_empty(), "unexpected findings: {findings:?}");
    }

    #[test]
    fn partial_auth_reports_each_gap() {
        let findings = run(&blueprint(json!({
            "endpoints": [],
            "auth": {"tokenType": "bearer_jwt"}
        })));
        assert_eq!(
            categories(&findings),
            vec![
                Category::AuthIncomplete,
                Category::NoSeedCreds,
                Category::NoTokenPath
            ]
        );
        let incomplete = findings
            .iter()
            .find(|f| f.category == Category::AuthIncomplete)
            .expect("auth incomplete finding");
        assert!(incomplete.message.contains("loginEndpoint"));
    }

    #[test]
    fn session_cookie_auth_needs_no_token_path() {
        let findings = run(&blueprint(json!({
            "endpoints": [],
            "auth": {
                "tokenType": "session_cookie",
                "loginEndpoint": "POST /api/auth/callback/credentials",
                "credentials": {"email": "a@b.c", "password": "pw"}
            }
        })));
        assert!(findings.is_empty(), "unexpected findings: {findings:?}");
    }
}
