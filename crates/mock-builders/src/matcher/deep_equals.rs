//! Structural comparison of JSON values.
//!
//! `is_equal` is strict deep equality: objects must have the same key set and
//! arrays the same length. `is_match` is the containment variant used for
//! headers, where the actual mapping may carry extra keys.

use serde_json::{Map, Value};

/// Deep equality between two JSON values.
///
/// Object key order is irrelevant. Numbers compare by numeric value, so `1`
/// equals `1.0`.
pub fn is_equal(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => {
            a == b || matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if x == y)
        }
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| is_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            // Same key set, then every value deeply equal
            a.len() == b.len()
                && a.iter().all(|(key, expected_val)| {
                    b.get(key)
                        .is_some_and(|actual_val| is_equal(expected_val, actual_val))
                })
        }
        _ => false,
    }
}

/// Containment match: every key of `expected` must be present in `actual`
/// with a deeply equal value. Extra keys in `actual` are ignored.
///
/// Non-object values fall back to [`is_equal`].
pub fn is_match(actual: &Value, expected: &Value) -> bool {
    match (expected, actual) {
        (Value::Object(expected), Value::Object(actual)) => {
            expected.iter().all(|(key, expected_val)| {
                actual
                    .get(key)
                    .is_some_and(|actual_val| is_equal(expected_val, actual_val))
            })
        }
        _ => is_equal(expected, actual),
    }
}

/// Copy a mapping with every top-level key lower-cased.
///
/// Values other than objects are returned unchanged. When two keys collapse
/// to the same lower-cased key the later one wins.
pub fn lowercase_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.to_lowercase(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Parse a query string into a flat mapping of decoded keys to decoded values.
///
/// `+` decodes to a space and the last value wins on duplicate keys, matching
/// `application/x-www-form-urlencoded` conventions.
pub fn parse_query_string(query: Option<&str>) -> Map<String, Value> {
    let mut params = Map::new();
    if let Some(q) = query {
        for (key, value) in parse_form_pairs(q) {
            params.insert(key, Value::String(value));
        }
    }
    params
}

/// Split an urlencoded string into decoded key/value pairs, preserving order.
pub(crate) fn parse_form_pairs(input: &str) -> Vec<(String, String)> {
    input
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (decode_component(key), decode_component(value)),
            None => (decode_component(pair), String::new()),
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
