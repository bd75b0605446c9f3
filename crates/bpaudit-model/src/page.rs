//! UI pages, their locators, and scripted form flows.

use crate::error::DocumentError;
use crate::json::{self, Object};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

pub const FLAG_DYNAMIC_LIST: &str = "DYNAMIC_LIST";
pub const FLAG_BRITTLE: &str = "BRITTLE";

/// How a locator finds its element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorStrategy {
    Role,
    Label,
    Text,
    TestId,
    Placeholder,
    Css,
    Xpath,
    Heading,
    Button,
    Link,
    Input,
    Custom,
    Aria,
    Other(String),
}

impl LocatorStrategy {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "role" => Self::Role,
            "label" => Self::Label,
            "text" => Self::Text,
            "testid" | "data-testid" => Self::TestId,
            "placeholder" => Self::Placeholder,
            "css" => Self::Css,
            "xpath" => Self::Xpath,
            "heading" => Self::Heading,
            "button" => Self::Button,
            "link" => Self::Link,
            "input" => Self::Input,
            "custom" => Self::Custom,
            "aria" => Self::Aria,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Role => "role",
            Self::Label => "label",
            Self::Text => "text",
            Self::TestId => "testid",
            Self::Placeholder => "placeholder",
            Self::Css => "css",
            Self::Xpath => "xpath",
            Self::Heading => "heading",
            Self::Button => "button",
            Self::Link => "link",
            Self::Input => "input",
            Self::Custom => "custom",
            Self::Aria => "aria",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Locator {
    pub name: String,
    pub strategy: Option<LocatorStrategy>,
    /// Framework-specific locator expression, e.g. `page.getByRole('button', { name: 'Save' })`.
    pub selector_code: String,
    pub is_interactive: bool,
    pub is_conditional: bool,
    pub flags: BTreeSet<String>,
    pub confidence: Option<f64>,
}

impl Locator {
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// Selector code with surrounding whitespace removed.
    pub fn code(&self) -> &str {
        self.selector_code.trim()
    }

    fn from_value(value: &Value, path: &str) -> Result<Self, DocumentError> {
        let obj = json::as_object(value, path)?;
        Ok(Self {
            name: json::opt_str(obj, &["name"], path).unwrap_or_else(|| "?".to_string()),
            strategy: json::opt_str(obj, &["strategy"], path).map(|raw| LocatorStrategy::parse(&raw)),
            selector_code: json::str_or_empty(obj, &["selectorCode", "playwrightCode", "selector"], path),
            is_interactive: json::bool_or_false(obj, &["isInteractive"], path),
            is_conditional: json::bool_or_false(obj, &["isConditional"], path),
            flags: json::string_set(obj, &["flags"], path),
            confidence: json::opt_f64(obj, &["confidence"], path),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormStep {
    pub action: String,
    pub locator_ref: String,
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormFlow {
    pub name: String,
    pub steps: Vec<FormStep>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteParam {
    pub name: String,
}

/// A UI page reachable at `route`.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub id: String,
    pub route: String,
    pub title: String,
    pub auth_required: Option<bool>,
    pub roles: BTreeSet<String>,
    pub is_dynamic: bool,
    pub route_params: Vec<RouteParam>,
    pub locators: Vec<Locator>,
    pub form_flows: Vec<FormFlow>,
    pub linked_endpoints: BTreeSet<String>,
    pub confidence: Option<f64>,
}

impl Page {
    pub fn locator(&self, name: &str) -> Option<&Locator> {
        self.locators.iter().find(|loc| loc.name == name)
    }

    pub(crate) fn from_value(value: &Value, path: &str) -> Result<Self, DocumentError> {
        let obj = json::as_object(value, path)?;
        let route = json::required_str(obj, &["route", "path"], path)?;
        let id = json::opt_str(obj, &["id"], path)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| page_key(&route));

        let locators_path = json::child(path, "locators");
        let locators = json::array_or_empty(obj, &["locators"], path)
            .iter()
            .enumerate()
            .map(|(idx, row)| Locator::from_value(row, &json::index(&locators_path, idx)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id,
            route,
            title: json::str_or_empty(obj, &["title"], path),
            auth_required: json::opt_bool(obj, &["authRequired", "requiresAuth"], path),
            roles: json::string_set(obj, &["roles"], path),
            is_dynamic: json::bool_or_false(obj, &["isDynamic"], path),
            route_params: parse_route_params(obj, path),
            locators,
            form_flows: parse_form_flows(obj, path),
            linked_endpoints: json::string_set(obj, &["linkedEndpoints"], path),
            confidence: json::opt_f64(obj, &["confidence"], path),
        })
    }
}

pub(crate) fn page_key(route: &str) -> String {
    format!("page:{route}")
}

fn parse_route_params(obj: &Object, path: &str) -> Vec<RouteParam> {
    json::array_or_empty(obj, &["routeParams"], path)
        .iter()
        .filter_map(|entry| match entry {
            Value::String(name) => Some(name.clone()),
            Value::Object(row) => row.get("name").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .map(|name| RouteParam { name })
        .collect()
}

fn parse_form_flows(obj: &Object, path: &str) -> Vec<FormFlow> {
    let flows_path = json::child(path, "formFlows");
    json::array_or_empty(obj, &["formFlows"], path)
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let flow_path = json::index(&flows_path, idx);
            let flow = entry.as_object()?;
            let steps_path = json::child(&flow_path, "steps");
            let steps = json::array_or_empty(flow, &["steps"], &flow_path)
                .iter()
                .enumerate()
                .filter_map(|(step_idx, step)| {
                    let step_path = json::index(&steps_path, step_idx);
                    let step = step.as_object()?;
                    Some(FormStep {
                        action: json::str_or_empty(step, &["action"], &step_path),
                        locator_ref: json::str_or_empty(step, &["locatorRef", "locator"], &step_path),
                        value: json::opt_value(step, &["value"]),
                    })
                })
                .collect();
            Some(FormFlow {
                name: json::str_or_empty(flow, &["name"], &flow_path),
                steps,
            })
        })
        .collect()
}
