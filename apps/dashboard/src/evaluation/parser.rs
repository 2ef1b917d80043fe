//! Response Parser — turns raw model text into a typed `ScoringResponse`.

use thiserror::Error;

use crate::evaluation::models::{Category, ScoringResponse};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{category:?} score {value} is outside 0-100")]
    ScoreOutOfRange { category: Category, value: f64 },
}

/// Parses the scoring reply. Fails on invalid JSON, a missing category score,
/// or a score outside 0–100; there is no partial result.
pub fn parse_scoring_response(raw_text: &str) -> Result<ScoringResponse, ParseError> {
    let response: ScoringResponse = serde_json::from_str(strip_code_fences(raw_text))?;

    if let Some((category, value)) = response
        .scores
        .iter()
        .find(|(_, v)| !(MIN_SCORE..=MAX_SCORE).contains(v))
    {
        return Err(ParseError::ScoreOutOfRange { category, value });
    }

    Ok(response)
}

/// Strips ```json ... ``` or ``` ... ``` fences, including prose around them.
/// Text that already starts as a JSON object only loses a stray closing fence.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    if text.starts_with('{') {
        return text.strip_suffix("```").unwrap_or(text).trim_end();
    }
    let Some(open) = text.find("```") else {
        return text;
    };
    let after = &text[open + 3..];
    let after = after
        .strip_prefix("json")
        .or_else(|| after.strip_prefix("JSON"))
        .unwrap_or(after);
    let body = match after.rfind("```") {
        Some(close) => &after[..close],
        None => after,
    };
    body.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "scores": {"Performance": 90, "Initiative": 75, "Collaboration": 75, "Participation": 75, "Timeliness": 65},
        "plotting_evidence": {
            "Performance": "Kinerjanya bagus banget target tercapai",
            "Timeliness": "sering telat pas meeting"
        },
        "summary": "Strong delivery, weak punctuality.",
        "recommendation": "Arrive on time for meetings."
    }"#;

    #[test]
    fn test_strip_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_trailing_fence_only() {
        let input = "{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_parse_reply_with_stray_closing_fence() {
        let reply = format!("{VALID}\n```\n");
        let response = parse_scoring_response(&reply).unwrap();
        assert_eq!(response.scores.get(Category::Timeliness), 65.0);
    }

    #[test]
    fn test_strip_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_fences_with_leading_prose() {
        let input = "Here is the result:\n```json\n{\"key\": 1}\n```\n";
        assert_eq!(strip_code_fences(input), "{\"key\": 1}");
    }

    #[test]
    fn test_unfenced_json_keeps_backticks_inside_strings() {
        let input = "  {\"summary\": \"uses ``` often\"}  ";
        assert_eq!(strip_code_fences(input), "{\"summary\": \"uses ``` often\"}");
    }

    #[test]
    fn test_fenced_and_unfenced_parse_identically() {
        let fenced = format!("```json\n{VALID}\n```");
        let a = parse_scoring_response(&fenced).unwrap();
        let b = parse_scoring_response(VALID).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.scores.performance, 90.0);
        assert_eq!(a.plotting_evidence.timeliness, "sering telat pas meeting");
        assert_eq!(a.plotting_evidence.initiative, "-");
    }

    #[test]
    fn test_truncated_json_is_format_error() {
        let truncated = &VALID[..VALID.len() / 2];
        let err = parse_scoring_response(truncated).unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn test_missing_category_score_is_format_error() {
        let raw = r#"{
            "scores": {"Performance": 90, "Initiative": 75, "Collaboration": 75, "Participation": 75},
            "plotting_evidence": {},
            "summary": "s",
            "recommendation": "r"
        }"#;
        let err = parse_scoring_response(raw).unwrap_err();
        assert!(err.to_string().contains("Timeliness"), "{err}");
    }

    #[test]
    fn test_out_of_range_score_is_rejected() {
        let raw = VALID.replace("\"Performance\": 90", "\"Performance\": 120");
        let err = parse_scoring_response(&raw).unwrap_err();
        assert!(matches!(
            err,
            ParseError::ScoreOutOfRange {
                category: Category::Performance,
                ..
            }
        ));
    }

    #[test]
    fn test_non_json_prose_is_format_error() {
        assert!(parse_scoring_response("I cannot evaluate this person.").is_err());
    }
}
