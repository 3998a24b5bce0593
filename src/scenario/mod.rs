pub mod seed;
pub mod store;
pub mod types;
pub mod validation;

pub use seed::seed_scenarios;
pub use store::{get_scenarios_path, ScenarioStore};
pub use types::{AllocationScenario, Level, ProjectionScenario, ScenarioFile, ScenarioKind};
pub use validation::{validate_allocation_scenario, validate_projection_scenario, validate_scenario_file};
