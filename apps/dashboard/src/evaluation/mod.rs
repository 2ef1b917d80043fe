// Leader evaluation pipeline: prompt → LLM → parse → weighted score.
// All LLM calls go through llm_client — no direct Gemini calls here.

pub mod handlers;
pub mod models;
pub mod parser;
pub mod prompts;
pub mod scoring;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::llm_client::{LlmClient, LlmError};
use models::{EvaluationInput, EvaluationResult};
use parser::{parse_scoring_response, ParseError};
use prompts::build_prompt;

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("AI error: {0}")]
    Model(#[from] LlmError),

    /// The detail stays in the logs; users only see the fixed message.
    #[error("Could not read the AI output format.")]
    Format(#[from] ParseError),
}

/// Runs one Analyze action: builds the prompt, asks the model (with one
/// fallback), and parses the reply into a result.
pub async fn evaluate(
    llm: &LlmClient,
    api_key: &str,
    input: &EvaluationInput,
) -> Result<EvaluationResult, EvaluationError> {
    let prompt = build_prompt(&input.transcript, input.role.label());
    let raw = llm.score_transcript(api_key, &prompt).await?;

    let response = parse_scoring_response(&raw).map_err(|e| {
        warn!("Scoring reply rejected: {e}");
        debug!("Rejected scoring reply: {raw}");
        e
    })?;

    let result = EvaluationResult::new(input, response);
    info!(
        "Evaluation complete: role={}, final_score={:.1}",
        result.role.label(),
        result.final_score()
    );
    Ok(result)
}

#[cfg(test)]
pub mod fixtures {
    //! Canned transcript and model reply shared by tests.

    pub const SAMPLE_TRANSCRIPT: &str =
        "Kinerjanya bagus banget target tercapai, tapi sayangnya sering telat pas meeting";

    pub const SAMPLE_REPLY: &str = r#"```json
{
    "scores": {"Performance": 90, "Initiative": 75, "Collaboration": 75, "Participation": 75, "Timeliness": 65},
    "plotting_evidence": {
        "Performance": "Kinerjanya bagus banget target tercapai",
        "Initiative": "-",
        "Collaboration": "-",
        "Participation": "-",
        "Timeliness": "sering telat pas meeting"
    },
    "summary": "Delivers results but is often late to meetings.",
    "recommendation": "Improve punctuality."
}
```"#;
}
