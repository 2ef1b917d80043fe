use std::fmt::Write;

use crate::evaluation::models::{Category, EvaluationResult};
use crate::render::escape_html;

pub const GOOD_THRESHOLD: f64 = 80.0;
pub const NEUTRAL_THRESHOLD: f64 = 70.0;

/// Color band for a category score: ≥80 good, 70–79 neutral, <70 poor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Good,
    Neutral,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= GOOD_THRESHOLD {
            ScoreBand::Good
        } else if score >= NEUTRAL_THRESHOLD {
            ScoreBand::Neutral
        } else {
            ScoreBand::Poor
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ScoreBand::Good => "#16a34a",
            ScoreBand::Neutral => "#ca8a04",
            ScoreBand::Poor => "#dc2626",
        }
    }
}

/// Aspect / AI Score / Evidence Quote table, one row per category in fixed order.
/// Scores print as the model returned them: `90` stays `90`, `77.5` stays `77.5`.
pub fn evidence_table(result: &EvaluationResult) -> String {
    let mut rows = String::new();
    for category in Category::ALL {
        let score = result.scores.get(category);
        let _ = write!(
            rows,
            r#"<tr><td><b>{aspect}</b></td><td class="score" style="color:{color}">{score}</td><td class="col-quote"><i>"{quote}"</i></td></tr>"#,
            aspect = category.label(),
            color = ScoreBand::from_score(score).color(),
            quote = escape_html(result.evidence.get(category)),
        );
    }

    format!(
        r#"<table class="styled-table">
<thead><tr><th>Aspect</th><th>AI Score</th><th>Evidence Quote</th></tr></thead>
<tbody>{rows}</tbody>
</table>"#
    )
}
