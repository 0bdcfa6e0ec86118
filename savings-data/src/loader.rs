use std::io::Read;

use rust_decimal::Decimal;
use savings_core::{
    RepositoryError, SavingsRepository, ScenarioCode, ScenarioParams, ScenarioParamsError,
};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading scenario calculator definitions.
#[derive(Debug, Error, PartialEq)]
pub enum ScenarioParamsLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unknown scenario code: {0}")]
    UnknownScenario(String),

    #[error("Invalid record for scenario '{0}': {1}")]
    InvalidRecord(String, ScenarioParamsError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for ScenarioParamsLoaderError {
    fn from(err: csv::Error) -> Self {
        ScenarioParamsLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the scenario calculator CSV file.
///
/// - `scenario_code`: catalog code (`surgery_cancellation`, `workers_comp`,
///   `pt_dropout`)
/// - `scenario_name`: display name for the scenario
/// - `*_field`: input field each calculator factor reads from
/// - `*_label`: prompt text shown for that field
/// - `preventable_fraction`: per-scenario override (empty to use the engine
///   default)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScenarioParamsRecord {
    pub scenario_code: String,
    pub scenario_name: String,
    pub dimension_a_field: String,
    pub dimension_a_label: String,
    pub dimension_b_field: String,
    pub dimension_b_label: String,
    pub affected_rate_field: String,
    pub affected_rate_label: String,
    pub value_per_event_field: String,
    pub value_per_event_label: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub preventable_fraction: Option<Decimal>,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for scenario calculator definitions from CSV files.
///
/// The loader reads CSV data and writes it through the `SavingsRepository`
/// trait, so it works with any database backend. One CSV record fully
/// describes one scenario: its display name, the four calculator field
/// bindings with their prompt labels, and an optional preventable fraction.
pub struct ScenarioParamsLoader;

impl ScenarioParamsLoader {
    /// Parse scenario records from a CSV reader.
    ///
    /// Returns a vector of parsed records. The reader can be any type that
    /// implements `Read`, such as a file or a string slice.
    pub fn parse<R: Read>(
        reader: R,
    ) -> Result<Vec<ScenarioParamsRecord>, ScenarioParamsLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: ScenarioParamsRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Load scenario records into the database.
    ///
    /// For each record, this method will:
    /// 1. Resolve and validate the calculator params
    /// 2. Upsert the scenario catalog row under its code
    /// 3. Delete any existing params for that scenario
    /// 4. Insert the new params
    ///
    /// This makes loading idempotent: running the same load multiple times
    /// produces the same result. When the CSV carries several records for
    /// one scenario, the last record wins.
    ///
    /// Returns the number of records loaded.
    pub async fn load<R: SavingsRepository>(
        repo: &R,
        records: &[ScenarioParamsRecord],
    ) -> Result<usize, ScenarioParamsLoaderError> {
        let mut loaded = 0;

        for record in records {
            let code = ScenarioCode::parse(&record.scenario_code).ok_or_else(|| {
                ScenarioParamsLoaderError::UnknownScenario(record.scenario_code.clone())
            })?;

            let params = ScenarioParams {
                scenario_code: code,
                dimension_a_field: record.dimension_a_field.clone(),
                dimension_a_label: record.dimension_a_label.clone(),
                dimension_b_field: record.dimension_b_field.clone(),
                dimension_b_label: record.dimension_b_label.clone(),
                affected_rate_field: record.affected_rate_field.clone(),
                affected_rate_label: record.affected_rate_label.clone(),
                value_per_event_field: record.value_per_event_field.clone(),
                value_per_event_label: record.value_per_event_label.clone(),
                preventable_fraction: record.preventable_fraction,
            };
            params.validate().map_err(|e| {
                ScenarioParamsLoaderError::InvalidRecord(record.scenario_code.clone(), e)
            })?;

            repo.upsert_scenario(code, &record.scenario_name).await?;
            repo.delete_params_for_scenario(code).await?;
            repo.insert_scenario_params(&params).await?;
            loaded += 1;
        }

        Ok(loaded)
    }
}
