use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{MeetScribeError, Result};

/// Placeholder table applied when the model omits a field.
pub const DEFAULT_SUMMARY: &str = "No summary provided.";
pub const DEFAULT_SENTIMENT: &str = "No sentiment analysis provided.";
pub const DEFAULT_TASK: &str = "No task specified";
pub const DEFAULT_OWNER: &str = "Unassigned";
pub const DEFAULT_DEADLINE: &str = "Not specified";

/// Validated result of a meeting analysis.
///
/// Built exactly once from the JSON object the model returned and never
/// mutated afterwards. Action items keep the order they arrived in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    pub summary: String,
    pub action_items: Vec<ActionItem>,
    pub sentiment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionItem {
    pub task: String,
    pub owner: String,
    pub deadline: String,
}

impl AnalysisRecord {
    /// Build a record from a parsed JSON value.
    ///
    /// Fails only when the top-level value is not an object. Missing or
    /// null fields fall back to the placeholder table; an `action_items`
    /// value that is not an array counts as empty, and array elements that
    /// are not objects are skipped.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| MeetScribeError::MalformedAnalysis {
                reason: format!("expected a JSON object, got {}", json_type_name(value)),
            })?;

        let action_items = map
            .get("action_items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(ActionItem::from_map)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            summary: string_field(map, "summary", DEFAULT_SUMMARY),
            action_items,
            sentiment: string_field(map, "sentiment", DEFAULT_SENTIMENT),
        })
    }
}

impl ActionItem {
    fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            task: string_field(map, "task", DEFAULT_TASK),
            owner: string_field(map, "owner", DEFAULT_OWNER),
            deadline: string_field(map, "deadline", DEFAULT_DEADLINE),
        }
    }
}

/// Look up a text field with a placeholder fallback.
///
/// Strings pass through unchanged, so an explicit empty string is kept.
/// Missing keys and nulls take the placeholder; any other value is coerced
/// to its JSON text.
fn string_field(map: &Map<String, Value>, key: &str, default: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => default.to_string(),
        Some(other) => other.to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
