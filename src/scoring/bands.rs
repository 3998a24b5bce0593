//! Fixed scoring policy shared by both evaluators.
//!
//! Every band is evaluated high-priority first and ties fall to the lower
//! band (`<=` comparisons), so a deviation of exactly 5 points is still
//! "very close" and a metric off by exactly 10% still earns 85.

/// Deviation (in percentage points) at or below which an allocation is "very close".
pub const CLOSE_DEVIATION: f64 = 5.0;

/// Deviation (in percentage points) at or below which a direction hint is given.
pub const ADJUST_DEVIATION: f64 = 10.0;

/// Score points lost per average percentage point of allocation deviation.
pub const ALLOCATION_PENALTY: f64 = 2.0;

/// Relative deviation (%) at or below which a projected metric counts as correct.
pub const CORRECT_DEVIATION_PERCENT: f64 = 10.0;

/// Projection contribution bands: (upper bound inclusive, contribution).
/// Anything beyond the last bound contributes [`FLOOR_CONTRIBUTION`].
const CONTRIBUTION_BANDS: [(f64, u8); 5] = [
    (0.0, 100),
    (5.0, 95),
    (10.0, 85),
    (20.0, 70),
    (30.0, 50),
];

const FLOOR_CONTRIBUTION: u8 = 25;

/// Round half away from zero to a whole number of points.
///
/// Inputs here are never negative, where this matches half-up rounding.
pub fn round_points(value: f64) -> f64 {
    value.round()
}

/// Per-channel feedback for an allocation, picked by absolute deviation.
pub fn channel_feedback(user_value: f64, correct_value: f64) -> String {
    let deviation = (user_value - correct_value).abs();
    let amount = round_points(deviation);

    if deviation == 0.0 {
        "Perfect allocation!".to_string()
    } else if deviation <= CLOSE_DEVIATION {
        "Very close! Minor adjustment could optimize this.".to_string()
    } else if deviation <= ADJUST_DEVIATION {
        let direction = if user_value > correct_value {
            "decreasing"
        } else {
            "increasing"
        };
        format!("Consider {} by {}%.", direction, amount)
    } else if user_value > correct_value {
        format!(
            "Over-allocated by {}%. This channel may be too expensive for your goal.",
            amount
        )
    } else {
        format!(
            "Under-allocated by {}%. This channel offers better efficiency than you're using.",
            amount
        )
    }
}

/// Top-level message for an allocation score.
pub fn allocation_message(score: u8) -> &'static str {
    if score >= 90 {
        "Excellent work! Your allocation is nearly optimal."
    } else if score >= 75 {
        "Good job! A few tweaks could improve efficiency."
    } else if score >= 60 {
        "Not bad! Review the channel feedback to sharpen your strategy."
    } else {
        "Keep practicing! Compare your split against the channel feedback below."
    }
}

/// Score contribution of a single projected metric, as a step function of its deviation.
pub fn metric_contribution(deviation_percent: f64) -> u8 {
    CONTRIBUTION_BANDS
        .iter()
        .find(|(bound, _)| deviation_percent <= *bound)
        .map(|(_, contribution)| *contribution)
        .unwrap_or(FLOOR_CONTRIBUTION)
}

/// Narrative band for a projection score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionBand {
    Outstanding,
    Solid,
    Developing,
    NeedsWork,
}

impl ProjectionBand {
    pub fn for_score(score: u8) -> Self {
        if score >= 90 {
            ProjectionBand::Outstanding
        } else if score >= 75 {
            ProjectionBand::Solid
        } else if score >= 60 {
            ProjectionBand::Developing
        } else {
            ProjectionBand::NeedsWork
        }
    }

    pub fn narrative(self) -> &'static str {
        match self {
            ProjectionBand::Outstanding => {
                "Outstanding! Your projections show a strong command of campaign economics."
            }
            ProjectionBand::Solid => {
                "Solid work! Most of your metrics are close. Double-check the ones marked off."
            }
            ProjectionBand::Developing => {
                "You're getting there. Revisit the formulas for the metrics you missed."
            }
            ProjectionBand::NeedsWork => {
                "These projections need work. Review how each metric is derived and try again."
            }
        }
    }
}

/// Narrative shown after a projection submission.
pub fn projection_narrative(score: u8) -> &'static str {
    ProjectionBand::for_score(score).narrative()
}
