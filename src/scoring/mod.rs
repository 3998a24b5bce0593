pub mod allocation;
pub mod bands;
pub mod projection;
pub mod validation;

use std::collections::BTreeMap;

/// Correct values keyed by channel or metric name.
pub type AnswerKey = BTreeMap<String, f64>;

/// A user's submitted values keyed by channel or metric name.
pub type Submission = BTreeMap<String, f64>;

pub use allocation::{evaluate_allocation, AllocationResult};
pub use bands::{projection_narrative, ProjectionBand};
pub use projection::{evaluate_projection, MetricOutcome, ProjectionResult};
pub use validation::{coerce_input, validate_allocation, CoercedValue, InputStatus};
