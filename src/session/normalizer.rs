//! Response normalization.
//!
//! Agents do not emit a consistent shape between invocations of the same
//! logical agent. [`normalize`] walks a fixed fallback chain and never fails:
//!
//! 1. failed or unknown outcome → `None`
//! 2. `response.result` object → its `text` parsed as JSON, else the object itself
//! 3. `response.message` string → parsed as JSON, else `{"text": message}`
//! 4. the raw `response`

use serde_json::{Value, json};

use crate::agents::AgentEnvelope;

/// Key of the wrapper produced for prose replies.
pub const TEXT_KEY: &str = "text";

pub fn normalize(envelope: &AgentEnvelope) -> Option<Value> {
    if !envelope.is_success() {
        return None;
    }
    let response = envelope.response.as_ref();

    let result = response
        .and_then(|r| r.get("result"))
        .and_then(Value::as_object)
        .filter(|obj| !obj.is_empty());
    if let Some(result) = result {
        let parsed = result
            .get(TEXT_KEY)
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .and_then(|text| serde_json::from_str::<Value>(text).ok());
        return non_null(parsed.unwrap_or_else(|| Value::Object(result.clone())));
    }

    let message = response
        .and_then(|r| r.get("message"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty());
    if let Some(message) = message {
        let parsed = serde_json::from_str::<Value>(message)
            .unwrap_or_else(|_| json!({ TEXT_KEY: message }));
        return non_null(parsed);
    }

    response.cloned().and_then(non_null)
}

fn non_null(value: Value) -> Option<Value> {
    (!value.is_null()).then_some(value)
}

/// Presence test used by the acceptance predicates: null, false, zero,
/// empty string and a missing key are all "absent".
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

pub fn has_truthy(payload: &Value, key: &str) -> bool {
    is_truthy(payload.get(key))
}

pub fn has_number(payload: &Value, key: &str) -> bool {
    payload.get(key).is_some_and(Value::is_number)
}

pub fn has_any(payload: &Value, keys: &[&str]) -> bool {
    keys.iter().any(|k| has_truthy(payload, k))
}

/// The agent replied with prose rather than a structured object.
pub fn looks_unstructured(payload: &Value) -> bool {
    payload.get(TEXT_KEY).is_some_and(Value::is_string)
}

pub fn text_of(payload: &Value) -> Option<&str> {
    payload
        .get(TEXT_KEY)
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
}
