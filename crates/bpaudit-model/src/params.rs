//! Named-parameter tokens in route and path templates.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn param_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":(\w+)|\{(\w+)\}").expect("param token regex must compile"))
}

/// Named parameters in a template, in order of first appearance.
///
/// Both `:name` and `{name}` spellings are recognised.
pub fn route_tokens(template: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for caps in param_token_re().captures_iter(template) {
        let Some(name) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        if !tokens.iter().any(|seen| seen == name.as_str()) {
            tokens.push(name.as_str().to_string());
        }
    }
    tokens
}

/// Whether an example value was captured. `null` and `""` do not count;
/// `0` and `false` do.
pub fn has_example(example: Option<&Value>) -> bool {
    match example {
        None | Some(Value::Null) => false,
        Some(Value::String(text)) => !text.is_empty(),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tokens_cover_both_spellings_without_duplicates() {
        assert_eq!(
            route_tokens("/orgs/:orgId/users/{userId}/:orgId"),
            vec!["orgId".to_string(), "userId".to_string()]
        );
        assert!(route_tokens("/plain/path").is_empty());
    }

    #[test]
    fn falsy_but_real_examples_count() {
        assert!(has_example(Some(&json!(0))));
        assert!(has_example(Some(&json!(false))));
        assert!(!has_example(Some(&json!(""))));
        assert!(!has_example(Some(&Value::Null)));
        assert!(!has_example(None));
    }
}
