use std::collections::BTreeMap;

use super::bands::{allocation_message, channel_feedback, round_points, ALLOCATION_PENALTY};
use super::{AnswerKey, Submission};

/// Outcome of scoring a budget allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationResult {
    pub score: u8,
    /// Top-level messages, currently always exactly one
    pub messages: Vec<String>,
    pub channel_feedback: BTreeMap<String, String>,
    /// Mean absolute deviation in percentage points
    pub average_deviation: f64,
}

/// Score a user's allocation against the optimal split.
///
/// The answer key's channels are authoritative: channels missing from the
/// submission count as 0%, channels only present in the submission are
/// ignored. The caller is responsible for rejecting submissions that do not
/// sum to exactly 100 before calling this.
pub fn evaluate_allocation(user_answer: &Submission, answer_key: &AnswerKey) -> AllocationResult {
    let mut total_deviation = 0.0;
    let mut feedback = BTreeMap::new();

    for (channel, &correct_value) in answer_key {
        let user_value = user_answer.get(channel).copied().unwrap_or(0.0);
        total_deviation += (user_value - correct_value).abs();
        feedback.insert(channel.clone(), channel_feedback(user_value, correct_value));
    }

    // An empty key has nothing to miss
    let average_deviation = if answer_key.is_empty() {
        0.0
    } else {
        total_deviation / answer_key.len() as f64
    };

    let score = round_points(100.0 - average_deviation * ALLOCATION_PENALTY).clamp(0.0, 100.0) as u8;

    AllocationResult {
        score,
        messages: vec![allocation_message(score).to_string()],
        channel_feedback: feedback,
        average_deviation,
    }
}
