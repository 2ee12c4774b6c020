//! Column helpers for the nullable numeric summary fields of a quote.
//!
//! SQLite stores a REAL column value as INTEGER when it has no fractional
//! part, so readers accept both storage classes.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};
use solar_core::RepositoryError;

/// Reads a nullable numeric column as a decimal.
pub fn get_optional_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    if value_ref.is_null() {
        return Ok(None);
    }

    let type_name = value_ref.type_info().name().to_string();
    match type_name.as_str() {
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get INTEGER from '{}': {}", column, e))
            })?;
            Ok(Some(Decimal::from(val)))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get REAL from '{}': {}", column, e))
            })?;
            Decimal::try_from(val).map(Some).map_err(|e| {
                RepositoryError::Database(format!("Failed to convert {} to Decimal: {}", val, e))
            })
        }
        _ => Err(RepositoryError::Database(format!(
            "Unexpected type '{}' for column '{}'",
            type_name, column
        ))),
    }
}

/// Reads a nullable non-negative count such as the number of panels.
pub fn get_optional_count(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<u32>, RepositoryError> {
    let value: Option<i64> = row
        .try_get(column)
        .map_err(|e| RepositoryError::Database(format!("Failed to get '{}': {}", column, e)))?;

    value
        .map(|v| {
            u32::try_from(v).map_err(|_| {
                RepositoryError::Database(format!("Value {} in '{}' is not a valid count", v, column))
            })
        })
        .transpose()
}

/// Converts a nullable decimal for storage in a REAL column.
pub fn optional_decimal_to_f64(d: Option<Decimal>) -> Option<f64> {
    d.map(|d| d.to_f64().unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

    use super::*;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        sqlx::query(
            "CREATE TABLE summary (
                id INTEGER PRIMARY KEY,
                price REAL,
                panels INTEGER,
                note TEXT
            )",
        )
        .execute(&pool)
        .await
        .expect("Failed to create test table");
        pool
    }

    async fn fetch(
        pool: &SqlitePool,
        insert: &str,
    ) -> SqliteRow {
        sqlx::query(insert)
            .execute(pool)
            .await
            .expect("Failed to insert test data");
        sqlx::query("SELECT price, panels, note FROM summary WHERE id = 1")
            .fetch_one(pool)
            .await
            .expect("Failed to fetch row")
    }

    // get_optional_decimal tests

    #[tokio::test]
    async fn test_whole_peso_amount_reads_back() {
        let pool = setup_test_db().await;
        let row = fetch(&pool, "INSERT INTO summary (id, price) VALUES (1, 18500000.0)").await;

        assert_eq!(get_optional_decimal(&row, "price"), Ok(Some(dec!(18500000))));
    }

    #[tokio::test]
    async fn test_fractional_value_reads_back() {
        let pool = setup_test_db().await;
        let row = fetch(&pool, "INSERT INTO summary (id, price) VALUES (1, 4.12)").await;

        assert_eq!(get_optional_decimal(&row, "price"), Ok(Some(dec!(4.12))));
    }

    #[tokio::test]
    async fn test_null_reads_as_none() {
        let pool = setup_test_db().await;
        let row = fetch(&pool, "INSERT INTO summary (id) VALUES (1)").await;

        assert_eq!(get_optional_decimal(&row, "price"), Ok(None));
        assert_eq!(get_optional_count(&row, "panels"), Ok(None));
    }

    #[tokio::test]
    async fn test_text_is_rejected() {
        let pool = setup_test_db().await;
        let row = fetch(&pool, "INSERT INTO summary (id, note) VALUES (1, 'n/a')").await;

        assert_eq!(
            get_optional_decimal(&row, "note"),
            Err(RepositoryError::Database(
                "Unexpected type 'TEXT' for column 'note'".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_missing_column_is_reported() {
        let pool = setup_test_db().await;
        let row = fetch(&pool, "INSERT INTO summary (id) VALUES (1)").await;

        let result = get_optional_decimal(&row, "npv");

        assert!(matches!(result, Err(RepositoryError::Database(msg)) if msg.starts_with("Column 'npv' not found:")));
    }

    // get_optional_count tests

    #[tokio::test]
    async fn test_panel_count_reads_back() {
        let pool = setup_test_db().await;
        let row = fetch(&pool, "INSERT INTO summary (id, panels) VALUES (1, 14)").await;

        assert_eq!(get_optional_count(&row, "panels"), Ok(Some(14)));
    }

    #[tokio::test]
    async fn test_negative_count_is_rejected() {
        let pool = setup_test_db().await;
        let row = fetch(&pool, "INSERT INTO summary (id, panels) VALUES (1, -3)").await;

        assert!(get_optional_count(&row, "panels").is_err());
    }

    // optional_decimal_to_f64 tests

    #[test]
    fn test_optional_decimal_to_f64() {
        assert_eq!(optional_decimal_to_f64(Some(dec!(-1500000.25))), Some(-1500000.25));
        assert_eq!(optional_decimal_to_f64(None), None);
    }
}
