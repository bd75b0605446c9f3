//! Path-tracking accessors over untyped JSON.
//!
//! Required accessors fail with a JSONPath-style location. Optional
//! accessors treat absent and `null` as "not provided" and degrade a
//! mis-typed value to the default with a warning.

use crate::error::DocumentError;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub(crate) type Object = Map<String, Value>;

pub(crate) const ROOT: &str = "$";

pub(crate) fn child(path: &str, key: &str) -> String {
    format!("{path}.{key}")
}

pub(crate) fn index(path: &str, idx: usize) -> String {
    format!("{path}[{idx}]")
}

pub(crate) fn read_json(path: &Path) -> Result<Value, DocumentError> {
    let bytes = fs::read(path).map_err(|source| DocumentError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| DocumentError::ParseJson {
        path: path.display().to_string(),
        source,
    })
}

pub(crate) fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Object, DocumentError> {
    value
        .as_object()
        .ok_or_else(|| DocumentError::malformed(path, "expected an object"))
}

/// First present, non-null value among `keys`.
pub(crate) fn lookup<'a>(obj: &'a Object, keys: &[&str]) -> Option<(&'a str, &'a Value)> {
    keys.iter().find_map(|key| match obj.get_key_value(*key) {
        Some((k, v)) if !v.is_null() => Some((k.as_str(), v)),
        _ => None,
    })
}

pub(crate) fn required_str(obj: &Object, keys: &[&str], path: &str) -> Result<String, DocumentError> {
    let Some((key, value)) = lookup(obj, keys) else {
        return Err(DocumentError::malformed(
            child(path, keys[0]),
            "required field is missing",
        ));
    };
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| DocumentError::malformed(child(path, key), "expected a string"))
}

pub(crate) fn required_array<'a>(
    obj: &'a Object,
    key: &str,
    path: &str,
) -> Result<&'a [Value], DocumentError> {
    let Some((_, value)) = lookup(obj, &[key]) else {
        return Err(DocumentError::malformed(
            child(path, key),
            "required field is missing",
        ));
    };
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| DocumentError::malformed(child(path, key), "expected an array"))
}

pub(crate) fn opt_str(obj: &Object, keys: &[&str], path: &str) -> Option<String> {
    let (key, value) = lookup(obj, keys)?;
    match value {
        Value::String(text) => Some(text.clone()),
        other => {
            tracing::warn!(path = %child(path, key), found = %kind(other), "ignoring non-string value");
            None
        }
    }
}

pub(crate) fn str_or_empty(obj: &Object, keys: &[&str], path: &str) -> String {
    opt_str(obj, keys, path).unwrap_or_default()
}

pub(crate) fn opt_bool(obj: &Object, keys: &[&str], path: &str) -> Option<bool> {
    let (key, value) = lookup(obj, keys)?;
    match value {
        Value::Bool(flag) => Some(*flag),
        other => {
            tracing::warn!(path = %child(path, key), found = %kind(other), "ignoring non-boolean value");
            None
        }
    }
}

pub(crate) fn bool_or_false(obj: &Object, keys: &[&str], path: &str) -> bool {
    opt_bool(obj, keys, path).unwrap_or(false)
}

pub(crate) fn opt_f64(obj: &Object, keys: &[&str], path: &str) -> Option<f64> {
    let (key, value) = lookup(obj, keys)?;
    match value.as_f64() {
        Some(number) => Some(number),
        None => {
            tracing::warn!(path = %child(path, key), found = %kind(value), "ignoring non-numeric value");
            None
        }
    }
}

pub(crate) fn array_or_empty<'a>(obj: &'a Object, keys: &[&str], path: &str) -> &'a [Value] {
    match lookup(obj, keys) {
        Some((_, Value::Array(items))) => items.as_slice(),
        Some((key, other)) => {
            tracing::warn!(path = %child(path, key), found = %kind(other), "ignoring non-array value");
            &[]
        }
        None => &[],
    }
}

pub(crate) fn opt_object<'a>(obj: &'a Object, keys: &[&str], path: &str) -> Option<&'a Object> {
    let (key, value) = lookup(obj, keys)?;
    match value {
        Value::Object(map) => Some(map),
        other => {
            tracing::warn!(path = %child(path, key), found = %kind(other), "ignoring non-object value");
            None
        }
    }
}

/// A set of strings; non-string members are skipped.
pub(crate) fn string_set(obj: &Object, keys: &[&str], path: &str) -> BTreeSet<String> {
    array_or_empty(obj, keys, path)
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

/// Present, non-null value of any shape.
pub(crate) fn opt_value(obj: &Object, keys: &[&str]) -> Option<Value> {
    lookup(obj, keys).map(|(_, value)| value.clone())
}

pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
