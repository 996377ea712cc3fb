use serde_json::{Map, Value};
use shrike_core::RedactedKey;

/// Marker substituted for redacted values.
pub const REDACTED: &str = "[REDACTED]";

/// Redact a metadata tree, returning a new tree.
///
/// A map entry whose key matches any configured literal or pattern has its
/// entire value replaced with the marker, whatever its shape; matched
/// values are not recursed into. Non-matching maps are recursed into,
/// sequences element-wise, scalars pass through. Matching is by key name
/// only.
pub fn redact_metadata(metadata: &Map<String, Value>, keys: &[RedactedKey]) -> Map<String, Value> {
    if keys.is_empty() {
        return metadata.clone();
    }
    redact_map(metadata, keys)
}

fn redact_map(map: &Map<String, Value>, keys: &[RedactedKey]) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| {
            if keys.iter().any(|k| k.matches(key)) {
                (key.clone(), Value::String(REDACTED.to_string()))
            } else {
                (key.clone(), redact_value(value, keys))
            }
        })
        .collect()
}

fn redact_value(value: &Value, keys: &[RedactedKey]) -> Value {
    match value {
        Value::Object(map) => Value::Object(redact_map(map, keys)),
        Value::Array(items) => Value::Array(items.iter().map(|v| redact_value(v, keys)).collect()),
        scalar => scalar.clone(),
    }
}
