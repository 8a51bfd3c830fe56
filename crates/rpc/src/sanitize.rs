//! Param sanitization for logging
//!
//! Request params are relayed untouched, but they may contain signing
//! payloads or calldata that must not land in logs verbatim.

use serde_json::Value;

const MAX_STR_LEN: usize = 64;

/// Renders `params` for logging: long strings are truncated and objects are
/// collapsed to their key count.
pub fn sanitized(params: &Value) -> String {
    sanitize_value(params).to_string()
}

fn sanitize_value(value: &Value) -> Value {
    match value {
        Value::String(s) if s.chars().count() > MAX_STR_LEN => {
            let head: String = s.chars().take(MAX_STR_LEN).collect();
            Value::String(format!("{head}…({} chars)", s.chars().count()))
        }
        Value::Array(items) => Value::Array(items.iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::String(format!("{{{} keys}}", map.len())),
        other => other.clone(),
    }
}
