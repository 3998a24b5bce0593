use super::Submission;

/// Whether a raw answer field held a usable number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputStatus {
    Parsed,
    /// Left empty; scored as 0
    Blank,
    /// Not a number; scored as 0, same as an explicit 0
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoercedValue {
    pub value: f64,
    pub status: InputStatus,
}

impl CoercedValue {
    fn zero(status: InputStatus) -> Self {
        Self { value: 0.0, status }
    }
}

/// Turn a raw answer field into a number.
///
/// Accepts a leading `$`, a trailing `%` and `,` thousands separators.
/// Blank and unparseable fields both become 0 so they score like an explicit
/// zero; the status lets the caller warn about the unparseable ones.
pub fn coerce_input(raw: &str) -> CoercedValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CoercedValue::zero(InputStatus::Blank);
    }

    let unsigned = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let bare = unsigned.strip_suffix('%').unwrap_or(unsigned).trim();
    let cleaned: String = bare.chars().filter(|c| *c != ',').collect();

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => CoercedValue {
            value,
            status: InputStatus::Parsed,
        },
        _ => CoercedValue::zero(InputStatus::Invalid),
    }
}

/// Gate an allocation before it is scored.
///
/// Every channel must be within 0-100 and the submission must total exactly
/// 100. Returns all problems at once. Channels missing from the submission
/// count as 0.
pub fn validate_allocation(answer: &Submission, channels: &[String]) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for channel in channels {
        let value = answer.get(channel).copied().unwrap_or(0.0);
        if !(0.0..=100.0).contains(&value) {
            errors.push(format!(
                "{}: must be between 0 and 100 (got {})",
                channel, value
            ));
        }
    }

    let total: f64 = answer.values().sum();
    if total != 100.0 {
        errors.push(format!(
            "Allocations must total exactly 100% (currently {}%)",
            total
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
