//! Model-response parsing.
//!
//! The prompt tells the model to answer with a bare JSON object, but in
//! practice the reply sometimes arrives wrapped in a ```json fence with
//! stray whitespace around it. `extract_json` peels that wrapping off;
//! parsing and validation happen in `parse_analysis`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{MeetScribeError, Result};
use crate::types::AnalysisRecord;

static JSON_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```json\s*(\{.*?\})\s*```").expect("fence pattern compiles")
});

/// Extract the JSON payload from a raw model reply.
///
/// Returns the object inside the first ```json fence when one is present
/// (the fence label is matched case-insensitively), otherwise the reply
/// trimmed of surrounding whitespace. Never fails; the result may still be
/// invalid JSON, which `parse_analysis` reports. No repair of malformed
/// JSON is attempted.
pub fn extract_json(raw: &str) -> &str {
    match JSON_FENCE.captures(raw).and_then(|caps| caps.get(1)) {
        Some(object) => object.as_str(),
        None => raw.trim(),
    }
}

/// Parse a raw model reply into an [`AnalysisRecord`].
pub fn parse_analysis(raw: &str) -> Result<AnalysisRecord> {
    let json = extract_json(raw);
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| MeetScribeError::MalformedAnalysis {
            reason: format!("invalid JSON: {e}"),
        })?;
    AnalysisRecord::from_value(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DEFAULT_SENTIMENT, DEFAULT_SUMMARY};

    #[test]
    fn test_extract_json_fenced() {
        let raw = "```json\n{\"summary\": \"ok\"}\n```";
        assert_eq!(extract_json(raw), "{\"summary\": \"ok\"}");
    }

    #[test]
    fn test_extract_json_fence_label_is_case_insensitive() {
        let raw = "```JSON\n{\"summary\": \"ok\"}\n```";
        assert_eq!(extract_json(raw), "{\"summary\": \"ok\"}");
    }

    #[test]
    fn test_extract_json_fenced_with_surrounding_text() {
        let raw = "Here is the analysis:\n```json\n{\"a\": 1}\n```\nHope that helps!";
        assert_eq!(extract_json(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_json_fenced_nested_object() {
        let raw = "```json\n{\"a\": {\"b\": 1}}\n```";
        assert_eq!(extract_json(raw), "{\"a\": {\"b\": 1}}");
    }

    #[test]
    fn test_extract_json_no_fence_trims_whitespace() {
        let raw = "  \n{\"summary\": \"ok\"}\n  ";
        assert_eq!(extract_json(raw), "{\"summary\": \"ok\"}");
    }

    #[test]
    fn test_extract_json_never_fails_on_plain_text() {
        assert_eq!(extract_json("not json at all"), "not json at all");
        assert_eq!(extract_json(""), "");
    }

    #[test]
    fn test_parse_analysis_fenced_scenario() {
        let raw = " ```json\n{\"summary\":\"ok\",\"action_items\":[],\"sentiment\":\"calm\"}\n``` ";
        let record = parse_analysis(raw).unwrap();
        assert_eq!(record.summary, "ok");
        assert_eq!(record.sentiment, "calm");
        assert!(record.action_items.is_empty());
    }

    #[test]
    fn test_parse_analysis_bare_json_with_missing_fields() {
        let record = parse_analysis("{\"summary\":\"ok\"}").unwrap();
        assert_eq!(record.summary, "ok");
        assert_eq!(record.sentiment, DEFAULT_SENTIMENT);
        assert!(record.action_items.is_empty());
    }

    #[test]
    fn test_parse_analysis_rejects_plain_text() {
        let result = parse_analysis("not json at all");
        assert!(matches!(
            result,
            Err(MeetScribeError::MalformedAnalysis { .. })
        ));
    }

    #[test]
    fn test_parse_analysis_rejects_top_level_array() {
        let result = parse_analysis("[{\"summary\": \"ok\"}]");
        assert!(matches!(
            result,
            Err(MeetScribeError::MalformedAnalysis { .. })
        ));
    }

    #[test]
    fn test_parse_analysis_rejects_trailing_commas() {
        let result = parse_analysis("{\"summary\": \"ok\",}");
        assert!(matches!(
            result,
            Err(MeetScribeError::MalformedAnalysis { .. })
        ));
    }

    #[test]
    fn test_parse_analysis_empty_object_takes_placeholders() {
        let record = parse_analysis("{}").unwrap();
        assert_eq!(record.summary, DEFAULT_SUMMARY);
        assert_eq!(record.sentiment, DEFAULT_SENTIMENT);
    }
}
