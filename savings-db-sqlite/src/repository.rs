use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use savings_core::{
    NewSavedEstimate, RepositoryError, SavedEstimate, SavingsRepository, Scenario, ScenarioCode,
    ScenarioParams,
};
use sqlx::{
    Row,
    sqlite::{SqliteConnectOptions, SqlitePool},
};

use crate::decimal::{decimal_to_f64, get_decimal, get_optional_decimal};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {}", database_url))?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            tracing::debug!(file = %path.display(), "applying seed file");
            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_scenario(row: &sqlx::sqlite::SqliteRow) -> Result<Scenario, RepositoryError> {
    let code_str: String = row
        .try_get("code")
        .map_err(|e| RepositoryError::Database(e.to_string()))?;
    let code = ScenarioCode::parse(&code_str)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid scenario code: {}", code_str)))?;

    Ok(Scenario {
        id: row
            .try_get("id")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        code,
        name: row
            .try_get("name")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
    })
}

fn row_to_scenario_params(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<ScenarioParams, RepositoryError> {
    let code_str: String = row
        .try_get("scenario_code")
        .map_err(|e| RepositoryError::Database(e.to_string()))?;
    let scenario_code = ScenarioCode::parse(&code_str)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid scenario code: {}", code_str)))?;

    Ok(ScenarioParams {
        scenario_code,
        dimension_a_field: row
            .try_get("dimension_a_field")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        dimension_a_label: row
            .try_get("dimension_a_label")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        dimension_b_field: row
            .try_get("dimension_b_field")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        dimension_b_label: row
            .try_get("dimension_b_label")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        affected_rate_field: row
            .try_get("affected_rate_field")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        affected_rate_label: row
            .try_get("affected_rate_label")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        value_per_event_field: row
            .try_get("value_per_event_field")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        value_per_event_label: row
            .try_get("value_per_event_label")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        preventable_fraction: get_optional_decimal(row, "preventable_fraction")?,
    })
}

fn row_to_saved_estimate(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<SavedEstimate, RepositoryError> {
    let code_str: String = row
        .try_get("scenario_code")
        .map_err(|e| RepositoryError::Database(e.to_string()))?;
    let scenario_code = ScenarioCode::parse(&code_str)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid scenario code: {}", code_str)))?;

    Ok(SavedEstimate {
        id: row
            .try_get("id")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        scenario_code,
        label: row
            .try_get("label")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        dimension_a: get_decimal(row, "dimension_a")?,
        dimension_b: get_decimal(row, "dimension_b")?,
        affected_rate_percent: get_decimal(row, "affected_rate_percent")?,
        value_per_event: get_decimal(row, "value_per_event")?,
        preventable_fraction: get_decimal(row, "preventable_fraction")?,
        savings: get_optional_decimal(row, "savings")?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {}", e)))?,
    })
}

#[async_trait]
impl SavingsRepository for SqliteRepository {
    async fn get_scenarios(&self) -> Result<Vec<Scenario>, RepositoryError> {
        let rows = sqlx::query("SELECT id, code, name FROM scenario ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_scenario).collect()
    }

    async fn get_scenario_by_code(
        &self,
        code: ScenarioCode,
    ) -> Result<Scenario, RepositoryError> {
        let row = sqlx::query("SELECT id, code, name FROM scenario WHERE code = ?")
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        row_to_scenario(&row)
    }

    async fn upsert_scenario(
        &self,
        code: ScenarioCode,
        name: &str,
    ) -> Result<Scenario, RepositoryError> {
        sqlx::query(
            "INSERT INTO scenario (code, name) VALUES (?, ?)
             ON CONFLICT(code) DO UPDATE SET name = excluded.name",
        )
        .bind(code.as_str())
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        self.get_scenario_by_code(code).await
    }

    async fn get_params_for_scenario(
        &self,
        code: ScenarioCode,
    ) -> Result<ScenarioParams, RepositoryError> {
        let row = sqlx::query(
            "SELECT scenario_code, dimension_a_field, dimension_a_label,
                    dimension_b_field, dimension_b_label,
                    affected_rate_field, affected_rate_label,
                    value_per_event_field, value_per_event_label,
                    preventable_fraction
             FROM scenario_params WHERE scenario_code = ?",
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        row_to_scenario_params(&row)
    }

    async fn insert_scenario_params(
        &self,
        params: &ScenarioParams,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO scenario_params (
                scenario_code, dimension_a_field, dimension_a_label,
                dimension_b_field, dimension_b_label,
                affected_rate_field, affected_rate_label,
                value_per_event_field, value_per_event_label,
                preventable_fraction
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(params.scenario_code.as_str())
        .bind(&params.dimension_a_field)
        .bind(&params.dimension_a_label)
        .bind(&params.dimension_b_field)
        .bind(&params.dimension_b_label)
        .bind(&params.affected_rate_field)
        .bind(&params.affected_rate_label)
        .bind(&params.value_per_event_field)
        .bind(&params.value_per_event_label)
        .bind(params.preventable_fraction.map(decimal_to_f64))
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete_params_for_scenario(
        &self,
        code: ScenarioCode,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM scenario_params WHERE scenario_code = ?")
            .bind(code.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn create_saved_estimate(
        &self,
        estimate: NewSavedEstimate,
    ) -> Result<SavedEstimate, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO saved_estimate (
                scenario_code, label, dimension_a, dimension_b,
                affected_rate_percent, value_per_event, preventable_fraction,
                savings, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(estimate.scenario_code.as_str())
        .bind(&estimate.label)
        .bind(decimal_to_f64(estimate.dimension_a))
        .bind(decimal_to_f64(estimate.dimension_b))
        .bind(decimal_to_f64(estimate.affected_rate_percent))
        .bind(decimal_to_f64(estimate.value_per_event))
        .bind(decimal_to_f64(estimate.preventable_fraction))
        .bind(estimate.savings.map(decimal_to_f64))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_saved_estimate(id).await
    }

    async fn get_saved_estimate(
        &self,
        id: i64,
    ) -> Result<SavedEstimate, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, scenario_code, label, dimension_a, dimension_b,
                    affected_rate_percent, value_per_event, preventable_fraction,
                    savings, created_at, updated_at
             FROM saved_estimate WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        row_to_saved_estimate(&row)
    }

    async fn delete_saved_estimate(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM saved_estimate WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_saved_estimates(
        &self,
        scenario: Option<ScenarioCode>,
    ) -> Result<Vec<SavedEstimate>, RepositoryError> {
        const BASE_QUERY: &str =
            "SELECT id, scenario_code, label, dimension_a, dimension_b,
                    affected_rate_percent, value_per_event, preventable_fraction,
                    savings, created_at, updated_at
             FROM saved_estimate";

        let rows = match scenario {
            Some(code) => {
                sqlx::query(&format!(
                    "{} WHERE scenario_code = ? ORDER BY updated_at DESC",
                    BASE_QUERY
                ))
                .bind(code.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!("{} ORDER BY updated_at DESC", BASE_QUERY))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_saved_estimate).collect()
    }
}
