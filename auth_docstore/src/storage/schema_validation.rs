use sqlx::{Pool, Postgres, Row, Sqlite};

use super::errors::StorageError;

/// Validates that a SQLite table schema matches what we expect
pub(super) async fn validate_sqlite_table_schema(
    pool: &Pool<Sqlite>,
    table_name: &str,
    expected_columns: &[(&str, &str)],
) -> Result<(), StorageError> {
    let rows = sqlx::query("SELECT name, type FROM pragma_table_info(?)")
        .bind(table_name)
        .fetch_all(pool)
        .await?;

    if rows.is_empty() {
        return Err(StorageError::Schema(format!(
            "Table '{table_name}' does not exist"
        )));
    }

    let actual_columns: Vec<(String, String)> = rows
        .iter()
        .map(|row| (row.get("name"), row.get("type")))
        .collect();

    compare_columns(table_name, expected_columns, &actual_columns)
}

/// Validates that a PostgreSQL table schema matches what we expect
pub(super) async fn validate_postgres_table_schema(
    pool: &Pool<Postgres>,
    table_name: &str,
    expected_columns: &[(&str, &str)],
) -> Result<(), StorageError> {
    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_name = $1)",
    )
    .bind(table_name)
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Err(StorageError::Schema(format!(
            "Table '{table_name}' does not exist"
        )));
    }

    let rows = sqlx::query(
        "SELECT column_name, data_type FROM information_schema.columns
         WHERE table_name = $1 ORDER BY column_name",
    )
    .bind(table_name)
    .fetch_all(pool)
    .await?;

    let actual_columns: Vec<(String, String)> = rows
        .iter()
        .map(|row| (row.get("column_name"), row.get("data_type")))
        .collect();

    compare_columns(table_name, expected_columns, &actual_columns)
}

fn compare_columns(
    table_name: &str,
    expected_columns: &[(&str, &str)],
    actual_columns: &[(String, String)],
) -> Result<(), StorageError> {
    for (expected_name, expected_type) in expected_columns {
        let found = actual_columns
            .iter()
            .find(|(name, _)| name == expected_name);

        match found {
            Some((_, actual_type)) if actual_type.eq_ignore_ascii_case(expected_type) => {}
            Some((_, actual_type)) => {
                return Err(StorageError::Schema(format!(
                    "Column '{expected_name}' in '{table_name}' has type '{actual_type}' but expected '{expected_type}'"
                )));
            }
            None => {
                return Err(StorageError::Schema(format!(
                    "Missing column '{expected_name}' in '{table_name}'"
                )));
            }
        }
    }

    for (actual_name, _) in actual_columns {
        if !expected_columns
            .iter()
            .any(|(name, _)| *name == actual_name)
        {
            tracing::warn!(
                "Extra column '{}' found in table '{}'",
                actual_name,
                table_name
            );
        }
    }

    Ok(())
}
