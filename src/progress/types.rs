use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scenario::ScenarioKind;
use crate::scoring::Submission;

/// One scored submission. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_name: String,
    pub scenario_kind: ScenarioKind,
    pub scenario_id: String,
    pub score: u8,
    pub user_answer: Submission,
    /// 1 for the first submission of a scenario, incremented on each retry
    pub attempt_number: u32,
    pub completed_at: DateTime<Utc>,
}

/// Every record read back from the log, in the order they were appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressLog {
    pub records: Vec<ProgressRecord>,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. No deduplication: resubmitting the same attempt is a
    /// second record.
    pub fn append(&mut self, record: ProgressRecord) {
        self.records.push(record);
    }

    /// A user's records in completion order.
    pub fn for_user<'a>(&'a self, user_name: &'a str) -> impl Iterator<Item = &'a ProgressRecord> {
        self.records
            .iter()
            .filter(move |r| r.user_name == user_name)
    }

    /// Highest score a user has reached on one scenario.
    pub fn best_score(&self, user_name: &str, kind: ScenarioKind, scenario_id: &str) -> Option<u8> {
        self.for_user(user_name)
            .filter(|r| r.scenario_kind == kind && r.scenario_id == scenario_id)
            .map(|r| r.score)
            .max()
    }
}
