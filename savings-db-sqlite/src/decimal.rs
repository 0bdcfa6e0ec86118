use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use savings_core::RepositoryError;
use sqlx::{Row, TypeInfo, ValueRef};

/// Read a decimal value from a row, accepting both INTEGER and REAL SQLite
/// storage.
pub fn get_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("No column '{}' in row: {}", column, e)))?;

    match value_ref.type_info().name() {
        "INTEGER" => {
            let whole: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to read INTEGER '{}': {}", column, e))
            })?;
            Ok(Decimal::from(whole))
        }
        "REAL" => {
            let approx: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to read REAL '{}': {}", column, e))
            })?;
            Decimal::try_from(approx).map_err(|e| {
                RepositoryError::Database(format!("REAL {} does not fit a Decimal: {}", approx, e))
            })
        }
        "NULL" => Ok(Decimal::ZERO),
        other => Err(RepositoryError::Database(format!(
            "Unsupported type '{}' in column '{}'",
            other, column
        ))),
    }
}

/// Read an optional decimal value from a row, returning None for NULL.
pub fn get_optional_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("No column '{}' in row: {}", column, e)))?;

    if value_ref.is_null() {
        return Ok(None);
    }

    get_decimal(row, column).map(Some)
}

/// Convert a Decimal to f64 for SQLite binding.
pub fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};

    use super::*;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::query(
            "CREATE TABLE sample_values (
                id INTEGER PRIMARY KEY,
                count_value INTEGER,
                amount_value REAL,
                missing_value REAL,
                note_value TEXT
            )",
        )
        .execute(&pool)
        .await
        .expect("Failed to create test table");
        pool
    }

    /// Insert `literal` into `column` of a fresh database and fetch the row
    /// back with only that column selected.
    async fn row_with(column: &str, literal: &str) -> SqliteRow {
        let pool = setup_test_db().await;
        let insert = format!(
            "INSERT INTO sample_values (id, {}) VALUES (1, {})",
            column, literal
        );
        sqlx::query(&insert)
            .execute(&pool)
            .await
            .expect("Failed to insert test data");
        let select = format!("SELECT {} FROM sample_values WHERE id = 1", column);
        sqlx::query(&select)
            .fetch_one(&pool)
            .await
            .expect("Failed to fetch row")
    }

    // get_decimal tests

    #[tokio::test]
    async fn test_get_decimal_integer_storage() {
        let row = row_with("count_value", "2500").await;
        assert_eq!(get_decimal(&row, "count_value"), Ok(dec!(2500)));
    }

    #[tokio::test]
    async fn test_get_decimal_negative_integer() {
        let row = row_with("count_value", "-120").await;
        assert_eq!(get_decimal(&row, "count_value"), Ok(dec!(-120)));
    }

    #[tokio::test]
    async fn test_get_decimal_real_storage() {
        let row = row_with("amount_value", "0.6").await;
        assert_eq!(get_decimal(&row, "amount_value"), Ok(dec!(0.6)));
    }

    #[tokio::test]
    async fn test_get_decimal_whole_real() {
        let row = row_with("amount_value", "360000.0").await;
        assert_eq!(get_decimal(&row, "amount_value"), Ok(dec!(360000)));
    }

    #[tokio::test]
    async fn test_get_decimal_negative_real() {
        let row = row_with("amount_value", "-82.5").await;
        assert_eq!(get_decimal(&row, "amount_value"), Ok(dec!(-82.5)));
    }

    #[tokio::test]
    async fn test_get_decimal_null_reads_as_zero() {
        let row = row_with("missing_value", "NULL").await;
        assert_eq!(get_decimal(&row, "missing_value"), Ok(Decimal::ZERO));
    }

    #[tokio::test]
    async fn test_get_decimal_missing_column() {
        let row = row_with("count_value", "1").await;
        let result = get_decimal(&row, "nonexistent_column");
        assert!(matches!(result, Err(RepositoryError::Database(msg)) if msg.starts_with("No column 'nonexistent_column' in row:")));
    }

    #[tokio::test]
    async fn test_get_decimal_rejects_text_storage() {
        let row = row_with("note_value", "'not a number'").await;
        assert_eq!(
            get_decimal(&row, "note_value"),
            Err(RepositoryError::Database(
                "Unsupported type 'TEXT' in column 'note_value'".to_string()
            ))
        );
    }

    // get_optional_decimal tests

    #[tokio::test]
    async fn test_get_optional_decimal_present_integer() {
        let row = row_with("count_value", "250").await;
        assert_eq!(get_optional_decimal(&row, "count_value"), Ok(Some(dec!(250))));
    }

    #[tokio::test]
    async fn test_get_optional_decimal_present_real() {
        let row = row_with("amount_value", "0.35").await;
        assert_eq!(get_optional_decimal(&row, "amount_value"), Ok(Some(dec!(0.35))));
    }

    #[tokio::test]
    async fn test_get_optional_decimal_null_is_none() {
        let row = row_with("missing_value", "NULL").await;
        assert_eq!(get_optional_decimal(&row, "missing_value"), Ok(None));
    }

    #[tokio::test]
    async fn test_get_optional_decimal_missing_column() {
        let row = row_with("count_value", "1").await;
        let result = get_optional_decimal(&row, "nonexistent_column");
        assert!(matches!(result, Err(RepositoryError::Database(msg)) if msg.starts_with("No column 'nonexistent_column' in row:")));
    }

    #[tokio::test]
    async fn test_get_optional_decimal_rejects_text_storage() {
        let row = row_with("note_value", "'text'").await;
        assert_eq!(
            get_optional_decimal(&row, "note_value"),
            Err(RepositoryError::Database(
                "Unsupported type 'TEXT' in column 'note_value'".to_string()
            ))
        );
    }

    // decimal_to_f64 tests

    #[test]
    fn test_decimal_to_f64_fraction() {
        assert_eq!(decimal_to_f64(dec!(0.6)), 0.6);
    }

    #[test]
    fn test_decimal_to_f64_negative() {
        assert_eq!(decimal_to_f64(dec!(-82.5)), -82.5);
    }

    #[test]
    fn test_decimal_to_f64_zero() {
        assert_eq!(decimal_to_f64(Decimal::ZERO), 0.0);
    }

    #[test]
    fn test_decimal_to_f64_large_value() {
        assert_eq!(decimal_to_f64(dec!(125000000.5)), 125000000.5);
    }
}
