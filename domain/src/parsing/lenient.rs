//! Lenient field deserializers for model-produced JSON.
//!
//! Models routinely return a number where a string was requested, or a list
//! of small objects where a list of strings was requested. These helpers
//! normalise such values into the typed shape instead of failing the whole
//! stage. Structural mismatches (an object where a list is expected) still
//! fail.

use serde::de::{Deserializer, Error};
use serde::Deserialize;
use serde_json::Value;

/// Render a scalar or small object as a single line of text.
fn flatten(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(flatten).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .filter_map(|(k, v)| flatten(v).map(|text| format!("{}: {}", k, text)))
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
    }
}

/// Deserialize a string, accepting numbers and booleans as text.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(_) | Value::Bool(_) => Ok(flatten(&value).unwrap_or_default()),
        Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "expected a string, found {}",
            kind(other)
        ))),
    }
}

/// Deserialize a list of strings, flattening object items into text.
///
/// A bare string is accepted as a one-element list. Empty items are dropped.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Array(items) => Ok(items.iter().filter_map(flatten).collect()),
        Value::String(s) if !s.trim().is_empty() => Ok(vec![s.trim().to_string()]),
        Value::String(_) | Value::Null => Ok(Vec::new()),
        other => Err(D::Error::custom(format!(
            "expected a list, found {}",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
