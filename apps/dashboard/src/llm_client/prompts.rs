// Prompt fragments owned by the LLM client itself.
// Scoring prompts live with the evaluation module in evaluation/prompts.rs.

/// Sent alongside the recorded audio.
pub const TRANSCRIPTION_INSTRUCTION: &str = "Transcribe this audio exactly as spoken (verbatim). \
    The speech is in Indonesian; write the transcript in Indonesian. \
    Return only the transcript text.";

/// Shown in place of a transcript when transcription fails for any reason.
pub const TRANSCRIPTION_FALLBACK_TEXT: &str =
    "Transcription failed (audio model unavailable). Please type the evaluation manually.";
