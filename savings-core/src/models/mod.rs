mod saved_estimate;
mod scenario;
mod scenario_params;

pub use saved_estimate::{NewSavedEstimate, SavedEstimate};
pub use scenario::{Scenario, ScenarioCode};
pub use scenario_params::{ScenarioParams, ScenarioParamsError};
