use crate::types::AnalysisRecord;

/// Format an analysis record as human-readable markdown.
pub fn format_record_readable(record: &AnalysisRecord) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# MeetScribe Analysis Report\n\n");

    // Summary
    output.push_str("## Summary\n\n");
    output.push_str(&record.summary);
    output.push_str("\n\n");

    // Sentiment
    output.push_str("## Sentiment\n\n");
    output.push_str(&record.sentiment);
    output.push_str("\n\n");

    // Action Items
    output.push_str("## Action Items\n\n");
    if record.action_items.is_empty() {
        output.push_str("No action items were identified.\n");
    } else {
        for (i, item) in record.action_items.iter().enumerate() {
            output.push_str(&format!("{}. {}\n", i + 1, item.task));
            output.push_str(&format!(
                "   Owner: {} | Deadline: {}\n",
                item.owner, item.deadline
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionItem;

    #[test]
    fn test_format_record_readable_with_items() {
        let record = AnalysisRecord {
            summary: "Planning sync.".to_string(),
            action_items: vec![
                ActionItem {
                    task: "Ship the beta".to_string(),
                    owner: "Dana".to_string(),
                    deadline: "Friday".to_string(),
                },
                ActionItem {
                    task: "Write release notes".to_string(),
                    owner: "Unassigned".to_string(),
                    deadline: "Not specified".to_string(),
                },
            ],
            sentiment: "Upbeat.".to_string(),
        };

        let readable = format_record_readable(&record);
        assert!(readable.contains("# MeetScribe Analysis Report"));
        assert!(readable.contains("## Summary\n\nPlanning sync."));
        assert!(readable.contains("## Sentiment\n\nUpbeat."));
        assert!(readable.contains("1. Ship the beta"));
        assert!(readable.contains("2. Write release notes"));
        assert!(readable.contains("Owner: Dana | Deadline: Friday"));
    }

    #[test]
    fn test_format_record_readable_without_items() {
        let record = AnalysisRecord {
            summary: "Short call.".to_string(),
            action_items: Vec::new(),
            sentiment: "Neutral.".to_string(),
        };

        let readable = format_record_readable(&record);
        assert!(readable.contains("No action items were identified."));
        assert!(!readable.contains("Owner:"));
    }
}
