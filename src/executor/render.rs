//! Renders tool outcomes into the text fed back to the model.
//!
//! The exact phrasing is part of the conversation protocol: the same
//! outcomes must always render to the same text.

use crate::types::ToolCallResult;

/// Render outcomes in order, numbering from 1.
pub fn render_tool_results(outcomes: &[ToolCallResult]) -> String {
    let mut out = String::new();
    for (idx, outcome) in outcomes.iter().enumerate() {
        out.push_str(&format!("Tool {}: {}\n", idx + 1, outcome.tool));
        if outcome.success {
            out.push_str("Status: Success\n");
            out.push_str(&format!("Result: {}\n\n", payload_text(outcome.result.as_ref())));
        } else {
            out.push_str("Status: Failed\n");
            out.push_str(&format!(
                "Error: {}\n\n",
                outcome.error.as_deref().unwrap_or("unknown error")
            ));
        }
    }
    out
}

/// The user message that continues the loop after a tool round.
pub fn continuation_message(outcomes: &[ToolCallResult]) -> String {
    format!(
        "Tool execution results:\n\n{}Please continue based on these results.",
        render_tool_results(outcomes)
    )
}

fn payload_text(payload: Option<&serde_json::Value>) -> String {
    match payload {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn outcome(tool: &str, success: bool, result: Option<serde_json::Value>, error: Option<&str>) -> ToolCallResult {
        ToolCallResult {
            tool: tool.into(),
            success,
            result,
            error: error.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn renders_success_and_failure_in_order() {
        let text = render_tool_results(&[
            outcome("read_file", true, Some(serde_json::json!("hello")), None),
            outcome("search_files", false, None, Some("bad pattern")),
        ]);
        assert_eq!(
            text,
            "Tool 1: read_file\nStatus: Success\nResult: hello\n\n\
             Tool 2: search_files\nStatus: Failed\nError: bad pattern\n\n"
        );
    }

    #[test]
    fn structured_payloads_are_pretty_printed() {
        let text = render_tool_results(&[outcome(
            "list_directory",
            true,
            Some(serde_json::json!({"count": 1})),
            None,
        )]);
        assert_eq!(text, "Tool 1: list_directory\nStatus: Success\nResult: {\n  \"count\": 1\n}\n\n");
    }

    #[test]
    fn continuation_wraps_rendered_results() {
        let message = continuation_message(&[outcome("t", true, Some(serde_json::json!("ok")), None)]);
        assert_eq!(
            message,
            "Tool execution results:\n\nTool 1: t\nStatus: Success\nResult: ok\n\nPlease continue based on these results."
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let outcomes = vec![outcome("a", true, Some(serde_json::json!({"b": 1, "a": [1, 2]})), None)];
        assert_eq!(render_tool_results(&outcomes), render_tool_results(&outcomes));
    }
}
