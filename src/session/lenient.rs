//! Tolerant field decoders for agent payloads.
//!
//! A field of the wrong JSON type decodes to "absent" instead of failing the
//! whole result. Every decoder first reads the raw `serde_json::Value`, which
//! cannot fail on well-formed JSON, then converts what it can.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode a whole payload; anything that is not an object yields the default.
pub fn decode<T: DeserializeOwned + Default>(payload: &Value) -> T {
    if !payload.is_object() {
        return T::default();
    }
    T::deserialize(payload).unwrap_or_default()
}

fn raw<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Option::<Value>::deserialize(deserializer)
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

fn as_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(raw(deserializer)?.as_ref().and_then(as_f64))
}

pub fn opt_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(raw(deserializer)?
        .as_ref()
        .and_then(as_f64)
        .filter(|f| *f >= 0.0 && *f <= u32::MAX as f64)
        .map(|f| f.round() as u32))
}

pub fn opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(raw(deserializer)?.and_then(as_string))
}

/// Array of strings; a lone string becomes a one-element list.
pub fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match raw(deserializer)? {
        Some(Value::Array(items)) => items.into_iter().filter_map(as_string).collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s],
        _ => Vec::new(),
    })
}

pub fn opt_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(raw(deserializer)?
        .filter(Value::is_object)
        .and_then(|v| serde_json::from_value(v).ok()))
}

/// Array of objects; malformed items are skipped.
pub fn object_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match raw(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        _ => Vec::new(),
    })
}
