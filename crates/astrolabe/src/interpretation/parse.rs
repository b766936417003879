use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::interpretation::templates::FieldSpec;

/// How much of an oracle response survived parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParseOutcome {
    Complete,
    Partial { missing: Vec<String> },
    Fallback,
}

/// Every expected key mapped to a string, in template order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInterpretation {
    pub values: Vec<(&'static str, String)>,
    pub outcome: ParseOutcome,
}

impl ParsedInterpretation {
    fn fallback(fields: &[FieldSpec]) -> Self {
        Self {
            values: fields
                .iter()
                .map(|f| (f.key, f.fallback.to_string()))
                .collect(),
            outcome: ParseOutcome::Fallback,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Move a value out, leaving an empty string behind.
    pub fn take(&mut self, key: &str) -> String {
        self.values
            .iter_mut()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| std::mem::take(v))
            .unwrap_or_default()
    }
}

/// Strict JSON parse of `raw` into the expected keys.
///
/// Anything other than a JSON object gives the complete fallback. Inside an object, a
/// key that is absent, `null` or an empty string gets its `missing` text; every other
/// value is coerced to a string.
pub fn parse_interpretation(raw: &str, fields: &[FieldSpec]) -> ParsedInterpretation {
    let object = match serde_json::from_str::<Value>(raw.trim()) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            log::warn!("Oracle returned JSON {} instead of an object", json_type(&other));
            return ParsedInterpretation::fallback(fields);
        }
        Err(e) => {
            log::warn!("Oracle returned malformed JSON: {}", e);
            return ParsedInterpretation::fallback(fields);
        }
    };

    let mut missing = Vec::new();
    let values: Vec<(&'static str, String)> = fields
        .iter()
        .map(|f| {
            let value = object.get(f.key).and_then(coerce).filter(|s| !s.is_empty());
            let text = value.unwrap_or_else(|| {
                missing.push(f.key.to_string());
                f.missing.to_string()
            });
            (f.key, text)
        })
        .collect();

    let outcome = if missing.is_empty() {
        ParseOutcome::Complete
    } else {
        log::debug!("Oracle response missing keys: {:?}", missing);
        ParseOutcome::Partial { missing }
    };
    ParsedInterpretation { values, outcome }
}

/// Plain-text responses fill a single field.
pub fn parse_plain(raw: &str, field: &FieldSpec) -> ParsedInterpretation {
    let text = raw.trim();
    if text.is_empty() {
        return ParsedInterpretation::fallback(std::slice::from_ref(field));
    }
    ParsedInterpretation {
        values: vec![(field.key, text.to_string())],
        outcome: ParseOutcome::Complete,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `None` for null. Objects become labeled lines.
fn coerce(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(coerce)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Value::Object(map) => Some(flatten_object(map)),
    }
}

fn flatten_object(map: &Map<String, Value>) -> String {
    let text = |key: &str| map.get(key).and_then(coerce).unwrap_or_default();
    if ["give", "take", "avoid"].iter().all(|k| map.contains_key(*k)) {
        return format!(
            "Give: {}\nTake: {}\nAvoid: {}",
            text("give"),
            text("take"),
            text("avoid")
        );
    }
    map.iter()
        .map(|(key, value)| format!("{}: {}", label(key), coerce(value).unwrap_or_default()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `key_alignments` → `Key alignments`
fn label(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
