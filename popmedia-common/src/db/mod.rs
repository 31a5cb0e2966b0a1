//! Read-only access to the PinUP catalog database
//!
//! The catalog belongs to PinUP Popper. POPMedia tools only read it, so every
//! connection is opened read-only.

use crate::{Error, Result};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Row, SqlitePool};
use std::path::Path;

/// Connect to the catalog database in read-only mode
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        return Err(Error::NotFound(format!(
            "Catalog database not found: {}",
            db_path.display()
        )));
    }

    tracing::debug!("Connecting to catalog database: {}", db_path.display());

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true);
    let pool = SqlitePool::connect_with(options).await?;
    Ok(pool)
}

/// Column names of `table` in declaration order (from `PRAGMA table_info`)
///
/// A table that does not exist yields an empty list rather than an error.
pub async fn table_columns(pool: &SqlitePool, table: &str) -> Result<Vec<String>> {
    let query = format!("PRAGMA table_info({})", quote_identifier(table));
    let rows = sqlx::query(&query).fetch_all(pool).await?;

    rows.iter()
        .map(|row| row.try_get::<String, _>("name").map_err(Error::from))
        .collect()
}

/// Quote an SQL identifier for interpolation into a statement
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
