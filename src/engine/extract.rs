//! Shared extractors over raw feed JSON.
//!
//! Upstream documents mix types freely: scores arrive as strings or numbers,
//! ids as numbers or strings, flags as booleans or 0/1. Every normalizer
//! funnels its field reads through these helpers so the coercion rules live
//! in one place and each fallback chain stays an auditable `or_else`
//! sequence.

use serde_json::Value;

/// First non-empty string among the given keys.
pub fn str_of<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
}

pub fn string_of(value: &Value, keys: &[&str]) -> Option<String> {
    str_of(value, keys).map(str::to_string)
}

/// A number that may arrive as a JSON number or a numeric string.
pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// First key holding a number (or numeric string).
pub fn num_of(value: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().filter_map(|key| value.get(key).and_then(number)).next()
}

pub fn int_of(value: &Value, keys: &[&str]) -> Option<i64> {
    num_of(value, keys).map(|n| n as i64)
}

/// Truthiness for flags the feed encodes as booleans, 0/1, or "true".
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty() && s != "false" && s != "0",
        _ => false,
    }
}

pub fn flag_of(value: &Value, key: &str) -> bool {
    value.get(key).map(truthy).unwrap_or(false)
}

/// Array under `key`, or an empty slice when absent or not an array.
pub fn arr_of<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value.get(key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

/// An id that may be a string or a number, normalized to its string form.
pub fn id_of(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match value.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

/// A score cell: numeric text or empty, never null.
pub fn score_of(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
