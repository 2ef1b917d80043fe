use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::evaluation::scoring::compute_final_score;

/// Placeholder shown when the model gives no quote for a category.
pub const NO_EVIDENCE: &str = "-";

/// The five fixed evaluation dimensions, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Performance,
    Initiative,
    Collaboration,
    Participation,
    Timeliness,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Performance,
        Category::Initiative,
        Category::Collaboration,
        Category::Participation,
        Category::Timeliness,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Performance => "Performance",
            Category::Initiative => "Initiative",
            Category::Collaboration => "Collaboration",
            Category::Participation => "Participation",
            Category::Timeliness => "Timeliness",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[default]
    #[serde(rename = "Division Head", alias = "Ketua Divisi")]
    DivisionHead,
    #[serde(rename = "Deputy Head", alias = "Wakil Ketua")]
    DeputyHead,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::DivisionHead, Role::DeputyHead];

    pub fn label(self) -> &'static str {
        match self {
            Role::DivisionHead => "Division Head",
            Role::DeputyHead => "Deputy Head",
        }
    }
}

/// What the user fills in on the dashboard. Lives in the session and is
/// consumed by each Analyze action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationInput {
    pub target_name: String,
    #[serde(default)]
    pub role: Role,
    pub transcript: String,
}

impl EvaluationInput {
    pub fn has_transcript(&self) -> bool {
        !self.transcript.trim().is_empty()
    }
}

/// Per-category scores as returned by the model. Every category is required;
/// the original Indonesian keys are accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    #[serde(rename = "Performance", alias = "Kinerja")]
    pub performance: f64,
    #[serde(rename = "Initiative", alias = "Inisiatif")]
    pub initiative: f64,
    #[serde(rename = "Collaboration", alias = "Kolaborasi")]
    pub collaboration: f64,
    #[serde(rename = "Participation", alias = "Partisipasi")]
    pub participation: f64,
    #[serde(rename = "Timeliness", alias = "Waktu")]
    pub timeliness: f64,
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Performance => self.performance,
            Category::Initiative => self.initiative,
            Category::Collaboration => self.collaboration,
            Category::Participation => self.participation,
            Category::Timeliness => self.timeliness,
        }
    }

    /// Scores in fixed category order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

/// Supporting quote per category. Missing or blank quotes become `NO_EVIDENCE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(
        rename = "Performance",
        alias = "Kinerja",
        default = "no_evidence",
        deserialize_with = "quote_or_dash"
    )]
    pub performance: String,
    #[serde(
        rename = "Initiative",
        alias = "Inisiatif",
        default = "no_evidence",
        deserialize_with = "quote_or_dash"
    )]
    pub initiative: String,
    #[serde(
        rename = "Collaboration",
        alias = "Kolaborasi",
        default = "no_evidence",
        deserialize_with = "quote_or_dash"
    )]
    pub collaboration: String,
    #[serde(
        rename = "Participation",
        alias = "Partisipasi",
        default = "no_evidence",
        deserialize_with = "quote_or_dash"
    )]
    pub participation: String,
    #[serde(
        rename = "Timeliness",
        alias = "Waktu",
        default = "no_evidence",
        deserialize_with = "quote_or_dash"
    )]
    pub timeliness: String,
}

impl Default for Evidence {
    fn default() -> Self {
        Self {
            performance: no_evidence(),
            initiative: no_evidence(),
            collaboration: no_evidence(),
            participation: no_evidence(),
            timeliness: no_evidence(),
        }
    }
}

impl Evidence {
    pub fn get(&self, category: Category) -> &str {
        match category {
            Category::Performance => &self.performance,
            Category::Initiative => &self.initiative,
            Category::Collaboration => &self.collaboration,
            Category::Participation => &self.participation,
            Category::Timeliness => &self.timeliness,
        }
    }
}

fn no_evidence() -> String {
    NO_EVIDENCE.to_string()
}

fn quote_or_dash<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let quote = Option::<String>::deserialize(deserializer)?;
    Ok(quote
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .unwrap_or_else(no_evidence))
}

/// The JSON document the scoring prompt asks the model to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResponse {
    pub scores: CategoryScores,
    #[serde(default)]
    pub plotting_evidence: Evidence,
    pub summary: String,
    pub recommendation: String,
}

/// One completed analysis. Held in session state only.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub target_name: String,
    pub role: Role,
    pub scores: CategoryScores,
    pub evidence: Evidence,
    pub summary: String,
    pub recommendation: String,
    pub evaluated_at: DateTime<Utc>,
}

impl EvaluationResult {
    pub fn new(input: &EvaluationInput, response: ScoringResponse) -> Self {
        Self {
            target_name: input.target_name.trim().to_string(),
            role: input.role,
            scores: response.scores,
            evidence: response.plotting_evidence,
            summary: response.summary,
            recommendation: response.recommendation,
            evaluated_at: Utc::now(),
        }
    }

    /// Always derived from `scores`; never stored.
    pub fn final_score(&self) -> f64 {
        compute_final_score(&self.scores)
    }
}
