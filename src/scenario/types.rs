use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::scoring::AnswerKey;

/// Current version of the scenario store document.
pub const SCENARIO_FILE_VERSION: u32 = 1;

/// Difficulty of an allocation scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Basic,
    Intermediate,
    Advanced,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Basic => "Basic",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
        };
        f.write_str(name)
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Level::Basic),
            "intermediate" => Ok(Level::Intermediate),
            "advanced" => Ok(Level::Advanced),
            other => Err(format!(
                "unknown level '{}' (expected basic, intermediate or advanced)",
                other
            )),
        }
    }
}

/// Which evaluator a scenario (and a progress record) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    Allocation,
    Projection,
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioKind::Allocation => f.write_str("allocation"),
            ScenarioKind::Projection => f.write_str("projection"),
        }
    }
}

impl FromStr for ScenarioKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allocation" => Ok(ScenarioKind::Allocation),
            "projection" => Ok(ScenarioKind::Projection),
            other => Err(format!(
                "unknown scenario kind '{}' (expected allocation or projection)",
                other
            )),
        }
    }
}

/// A budget allocation exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationScenario {
    pub id: String,
    pub level: Level,
    pub title: String,
    pub description: String,
    /// Budget in currency units, for display
    pub total_budget: f64,
    pub goal: String,
    /// Channel names in display order
    pub channels: Vec<String>,
    /// Optimal percentage per channel
    pub answer_key: AnswerKey,
    pub created_at: DateTime<Utc>,
}

/// A campaign metric projection exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionScenario {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Raw campaign inputs shown to the user (not scored)
    pub metrics: BTreeMap<String, f64>,
    /// Correct value per metric the user must compute
    pub answer_key: AnswerKey,
    #[serde(default)]
    pub hints: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl ProjectionScenario {
    pub fn hint(&self, metric: &str) -> Option<&str> {
        self.hints.get(metric).map(String::as_str)
    }
}

/// The whole scenario store document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub version: u32,
    #[serde(default)]
    pub allocation: Vec<AllocationScenario>,
    #[serde(default)]
    pub projection: Vec<ProjectionScenario>,
}

impl Default for ScenarioFile {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioFile {
    pub fn new() -> Self {
        Self {
            version: SCENARIO_FILE_VERSION,
            allocation: Vec::new(),
            projection: Vec::new(),
        }
    }
}
