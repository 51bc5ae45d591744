use serde_json::Value;

pub const SUMMARY_UNAVAILABLE: &str =
    "Unable to generate AI summary at this time. Please try again later.";
pub const SUMMARY_TIMED_OUT: &str =
    "AI summary generation timed out. Review the findings below for details.";
pub const SUMMARY_PLACEHOLDER: &str = "AI summary generated successfully.";

const RECOMMENDATIONS_HEADING: &str = "\n\n## Recommendations\n\n";

/// Render the summarizer reply `{summary?, recommendations?}` as Markdown.
///
/// Unknown or mistyped fields are ignored rather than rejected: a string
/// `summary` is used as-is, a non-empty `recommendations` array becomes a
/// bullet list, and an empty outcome falls back to [`SUMMARY_PLACEHOLDER`].
pub fn render_summary(reply: &Value) -> String {
    let mut markdown = reply
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if let Some(recommendations) = reply
        .get("recommendations")
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
    {
        markdown.push_str(RECOMMENDATIONS_HEADING);
        for item in recommendations {
            let text = match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            markdown.push_str("- ");
            markdown.push_str(&text);
            markdown.push('\n');
        }
    }

    if markdown.is_empty() {
        SUMMARY_PLACEHOLDER.to_string()
    } else {
        markdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_with_recommendations() {
        let rendered = render_summary(&json!({
            "summary": "Two headers are missing.",
            "recommendations": ["Add CSP", "Enable HSTS"],
        }));
        assert_eq!(
            rendered,
            "Two headers are missing.\n\n## Recommendations\n\n- Add CSP\n- Enable HSTS\n"
        );
    }

    #[test]
    fn recommendations_without_summary_start_with_heading() {
        let rendered =
            render_summary(&json!({ "recommendations": ["Add CSP"] }));
        assert_eq!(rendered, "\n\n## Recommendations\n\n- Add CSP\n");
    }

    #[test]
    fn empty_reply_uses_placeholder() {
        assert_eq!(render_summary(&json!({})), SUMMARY_PLACEHOLDER);
        assert_eq!(
            render_summary(&json!({ "summary": "", "recommendations": [] })),
            SUMMARY_PLACEHOLDER
        );
    }

    #[test]
    fn non_array_recommendations_are_ignored() {
        assert_eq!(
            render_summary(&json!({ "summary": "ok", "recommendations": "x" })),
            "ok"
        );
    }
}
