use std::collections::BTreeMap;

use super::bands::{metric_contribution, round_points, CORRECT_DEVIATION_PERCENT};
use super::{AnswerKey, Submission};

/// How one projected metric compared to the correct value.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricOutcome {
    pub correct_value: f64,
    pub user_value: f64,
    pub is_correct: bool,
    pub deviation_percent: f64,
    /// Banded score contribution of this metric
    pub contribution: u8,
}

/// Outcome of scoring a set of projected metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionResult {
    pub score: u8,
    pub per_metric: BTreeMap<String, MetricOutcome>,
}

impl ProjectionResult {
    pub fn correct_count(&self) -> usize {
        self.per_metric.values().filter(|m| m.is_correct).count()
    }
}

/// Relative deviation of a projected value, in percent.
///
/// A zero correct value has no scale, so the answer is either exactly right
/// (0) or fully wrong (100).
pub fn deviation_percent(user_value: f64, correct_value: f64) -> f64 {
    if correct_value == 0.0 {
        if user_value == 0.0 {
            0.0
        } else {
            100.0
        }
    } else {
        (user_value - correct_value).abs() / correct_value.abs() * 100.0
    }
}

/// Score projected metric values against the correct ones.
///
/// Each metric in the answer key is banded independently and the overall
/// score is the unweighted mean of the contributions. Metrics missing from
/// the submission count as 0.
pub fn evaluate_projection(user_answer: &Submission, answer_key: &AnswerKey) -> ProjectionResult {
    let mut per_metric = BTreeMap::new();
    let mut total: u32 = 0;

    for (metric, &correct_value) in answer_key {
        let user_value = user_answer.get(metric).copied().unwrap_or(0.0);
        let deviation = deviation_percent(user_value, correct_value);
        let contribution = metric_contribution(deviation);
        total += u32::from(contribution);

        per_metric.insert(
            metric.clone(),
            MetricOutcome {
                correct_value,
                user_value,
                is_correct: deviation <= CORRECT_DEVIATION_PERCENT,
                deviation_percent: deviation,
                contribution,
            },
        );
    }

    let score = if per_metric.is_empty() {
        100
    } else {
        round_points(f64::from(total) / per_metric.len() as f64) as u8
    };

    ProjectionResult { score, per_metric }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    fn sample_key() -> AnswerKey {
        answers(&[("CAC", 50.0), ("LTV", 90.0), ("ROI", 0.8), ("ROAS", 1.8)])
    }

    #[test]
    fn test_exact_match_scores_100() {
        let key = sample_key();
        let result = evaluate_projection(&key.clone(), &key);

        assert_eq!(result.score, 100);
        assert_eq!(result.per_metric.len(), 4);
        assert_eq!(result.correct_count(), 4);
        for outcome in result.per_metric.values() {
            assert!(outcome.is_correct);
            assert_eq!(outcome.deviation_percent, 0.0);
            assert_eq!(outcome.contribution, 100);
        }
    }

    #[test]
    fn test_ten_percent_boundary_is_correct() {
        let key = answers(&[("CAC", 50.0)]);
        let user = answers(&[("CAC", 55.0)]);
        let result = evaluate_projection(&user, &key);

        let cac = &result.per_metric["CAC"];
        assert_eq!(cac.deviation_percent, 10.0);
        assert!(cac.is_correct);
        assert_eq!(cac.contribution, 85);
        assert_eq!(result.score, 85);
    }

    #[test]
    fn test_zero_correct_value() {
        assert_eq!(deviation_percent(0.0, 0.0), 0.0);
        assert_eq!(deviation_percent(0.01, 0.0), 100.0);
        assert_eq!(deviation_percent(-3.0, 0.0), 100.0);
    }

    #[test]
    fn test_negative_correct_value_uses_magnitude() {
        // -40 vs -50: 10 off a magnitude of 50
        assert!((deviation_percent(-40.0, -50.0) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_metric_counts_as_zero() {
        let key = answers(&[("CAC", 50.0), ("LTV", 90.0)]);
        let user = answers(&[("CAC", 50.0)]);
        let result = evaluate_projection(&user, &key);

        let ltv = &result.per_metric["LTV"];
        assert_eq!(ltv.user_value, 0.0);
        assert_eq!(ltv.deviation_percent, 100.0);
        assert!(!ltv.is_correct);
        // (100 + 25) / 2 = 62.5 rounds up
        assert_eq!(result.score, 63);
    }

    #[test]
    fn test_mixed_bands_average() {
        let user = answers(&[("CAC", 52.0), ("LTV", 105.0), ("ROI", 0.5), ("ROAS", 1.8)]);
        let result = evaluate_projection(&user, &sample_key());

        // CAC 4% -> 95, LTV 16.7% -> 70, ROI 37.5% -> 25, ROAS 0% -> 100
        assert_eq!(result.per_metric["CAC"].contribution, 95);
        assert_eq!(result.per_metric["LTV"].contribution, 70);
        assert_eq!(result.per_metric["ROI"].contribution, 25);
        assert_eq!(result.per_metric["ROAS"].contribution, 100);
        assert_eq!(result.correct_count(), 2);
        // 290 / 4 = 72.5
        assert_eq!(result.score, 73);
    }

    #[test]
    fn test_extra_metrics_ignored() {
        let key = sample_key();
        let mut user = key.clone();
        user.insert("CTR".to_string(), 3.0);
        let result = evaluate_projection(&user, &key);

        assert_eq!(result.score, 100);
        assert!(!result.per_metric.contains_key("CTR"));
    }

    #[test]
    fn test_score_non_increasing_with_deviation() {
        let key = sample_key();
        let mut last = u8::MAX;
        for step in 0..=60 {
            let mut user = key.clone();
            user.insert("LTV".to_string(), 90.0 + step as f64);
            let result = evaluate_projection(&user, &key);
            assert!(result.score <= last);
            last = result.score;
        }
    }
}
