use std::collections::HashMap;

use crate::scenario::ScenarioKind;

/// When projection hints become available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HintPolicy {
    /// Number of low-scoring submissions needed to unlock hints
    pub after_failures: u32,
    /// Scores below this count as low
    pub below_score: u8,
}

impl Default for HintPolicy {
    fn default() -> Self {
        Self {
            after_failures: 3,
            below_score: 70,
        }
    }
}

/// State owned by one practice run.
///
/// Evaluators never see this; the practice loop reads it to number attempts
/// and gate hints.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_name: String,
    policy: HintPolicy,
    attempts: HashMap<(ScenarioKind, String), u32>,
    low_scores: u32,
}

impl Session {
    pub fn new(user_name: impl Into<String>, policy: HintPolicy) -> Self {
        Self {
            user_name: user_name.into(),
            policy,
            attempts: HashMap::new(),
            low_scores: 0,
        }
    }

    /// Submissions made so far for a scenario.
    pub fn attempts(&self, kind: ScenarioKind, scenario_id: &str) -> u32 {
        self.attempts
            .get(&(kind, scenario_id.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Claim the attempt number for the next submission of a scenario.
    pub fn next_attempt(&mut self, kind: ScenarioKind, scenario_id: &str) -> u32 {
        let count = self
            .attempts
            .entry((kind, scenario_id.to_string()))
            .or_insert(0);
        *count += 1;
        *count
    }

    /// Count a scored submission toward the hint gate.
    pub fn record_score(&mut self, score: u8) {
        if score < self.policy.below_score {
            self.low_scores += 1;
        }
    }

    pub fn hints_unlocked(&self) -> bool {
        self.low_scores >= self.policy.after_failures
    }
}
