// Evaluation prompt templates.
// All prompts for the scoring pipeline are defined here.

pub const SCORING_PROMPT_TEMPLATE: &str = r#"You are a professional HR evaluator. Your task is to analyze a transcript of what a user said about a {role}.

VOICE/TEXT INPUT: "{transcript}"

MAIN TASKS:
1. PLOTTING: Read the input and sort each sentence into one of these categories: Performance, Initiative, Collaboration, Participation, Timeliness.
2. SCORING: Give each category a score from 0 to 100 based on the sentiment of its sentences.
   - Positive words ("bagus", "cepat", "rajin", "good", "fast", "diligent") = high score (80-100).
   - Neutral words ("biasa", "cukup", "average", "okay") = medium score (70-79).
   - Negative words ("telat", "malas", "kurang", "late", "lazy", "lacking") = low score (below 70).
   - If there is no information about a category, give it 75 (neutral).
3. Quote evidence verbatim from the input, in the language it was spoken. Use "-" when a category has no supporting sentence.

OUTPUT MUST BE PURE JSON (no markdown):
{
    "scores": {
        "Performance": 0, "Initiative": 0, "Collaboration": 0, "Participation": 0, "Timeliness": 0
    },
    "plotting_evidence": {
        "Performance": "Quote the user's sentence about performance...",
        "Initiative": "Quote the user's sentence about initiative...",
        "Collaboration": "Quote the user's sentence about collaboration...",
        "Participation": "Quote the user's sentence about participation...",
        "Timeliness": "Quote the user's sentence about timeliness..."
    },
    "summary": "One long paragraph of professional narrative summary.",
    "recommendation": "A short recommendation."
}"#;

/// Fills the scoring template. Both inputs are interpolated verbatim.
pub fn build_prompt(transcript: &str, role: &str) -> String {
    SCORING_PROMPT_TEMPLATE
        .replace("{role}", role)
        .replace("{transcript}", transcript)
}
