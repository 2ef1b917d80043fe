use crate::evaluation::models::{Category, CategoryScores};

pub const PERFORMANCE_WEIGHT: f64 = 0.30;
pub const INITIATIVE_WEIGHT: f64 = 0.15;
pub const COLLABORATION_WEIGHT: f64 = 0.20;
pub const PARTICIPATION_WEIGHT: f64 = 0.20;
pub const TIMELINESS_WEIGHT: f64 = 0.15;

pub fn weight(category: Category) -> f64 {
    match category {
        Category::Performance => PERFORMANCE_WEIGHT,
        Category::Initiative => INITIATIVE_WEIGHT,
        Category::Collaboration => COLLABORATION_WEIGHT,
        Category::Participation => PARTICIPATION_WEIGHT,
        Category::Timeliness => TIMELINESS_WEIGHT,
    }
}

/// Weighted final score: 0.30*perf + 0.15*init + 0.20*collab + 0.20*part + 0.15*time.
/// No clamping; range checks happen when the model output is parsed.
pub fn compute_final_score(scores: &CategoryScores) -> f64 {
    scores.iter().map(|(c, score)| weight(c) * score).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(p: f64, i: f64, c: f64, pa: f64, t: f64) -> CategoryScores {
        CategoryScores {
            performance: p,
            initiative: i,
            collaboration: c,
            participation: pa,
            timeliness: t,
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = Category::ALL.iter().map(|&c| weight(c)).sum();
        assert!((total - 1.0).abs() < 1e-12, "Weights summed to {total}");
    }

    #[test]
    fn test_all_hundred_is_hundred() {
        let score = compute_final_score(&scores(100.0, 100.0, 100.0, 100.0, 100.0));
        assert!((score - 100.0).abs() < 1e-9, "Score was {score}");
    }

    #[test]
    fn test_all_zero_is_zero() {
        assert_eq!(compute_final_score(&scores(0.0, 0.0, 0.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_mixed_scores() {
        // 80*0.3 + 75*0.15 + 70*0.2 + 90*0.2 + 60*0.15 = 24 + 11.25 + 14 + 18 + 9 = 76.25
        let score = compute_final_score(&scores(80.0, 75.0, 70.0, 90.0, 60.0));
        assert!((score - 76.25).abs() < 1e-9, "Score was {score}");
    }

    #[test]
    fn test_in_range_inputs_stay_in_range() {
        for p in [0.0, 33.0, 100.0] {
            for t in [0.0, 67.5, 100.0] {
                let score = compute_final_score(&scores(p, 100.0 - p, t, 50.0, 100.0 - t));
                assert!((0.0..=100.0).contains(&score), "Score was {score}");
            }
        }
    }

    #[test]
    fn test_out_of_range_input_is_not_clamped() {
        let score = compute_final_score(&scores(200.0, 0.0, 0.0, 0.0, 0.0));
        assert!((score - 60.0).abs() < 1e-9, "Score was {score}");
    }
}
