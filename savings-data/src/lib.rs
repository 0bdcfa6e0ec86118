pub mod loader;

pub use loader::{ScenarioParamsLoader, ScenarioParamsLoaderError, ScenarioParamsRecord};
