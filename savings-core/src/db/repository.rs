use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewSavedEstimate, SavedEstimate, Scenario, ScenarioCode, ScenarioParams};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[async_trait]
pub trait SavingsRepository: Send + Sync {
    // Scenarios
    async fn get_scenarios(&self) -> Result<Vec<Scenario>, RepositoryError>;
    async fn get_scenario_by_code(&self, code: ScenarioCode) -> Result<Scenario, RepositoryError>;
    async fn upsert_scenario(
        &self,
        code: ScenarioCode,
        name: &str,
    ) -> Result<Scenario, RepositoryError>;

    // Scenario parameters
    async fn get_params_for_scenario(
        &self,
        code: ScenarioCode,
    ) -> Result<ScenarioParams, RepositoryError>;

    async fn insert_scenario_params(
        &self,
        params: &ScenarioParams,
    ) -> Result<(), RepositoryError>;

    async fn delete_params_for_scenario(
        &self,
        code: ScenarioCode,
    ) -> Result<u64, RepositoryError>;

    // Saved estimates
    async fn create_saved_estimate(
        &self,
        estimate: NewSavedEstimate,
    ) -> Result<SavedEstimate, RepositoryError>;

    async fn get_saved_estimate(&self, id: i64) -> Result<SavedEstimate, RepositoryError>;

    async fn delete_saved_estimate(&self, id: i64) -> Result<(), RepositoryError>;

    async fn list_saved_estimates(
        &self,
        scenario: Option<ScenarioCode>,
    ) -> Result<Vec<SavedEstimate>, RepositoryError>;
}
