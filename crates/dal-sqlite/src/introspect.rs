//! Table introspection feeding the record generator.

use dal_core::{codegen, Error, Result};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use tracing::debug;

/// Returns the `(name, declared type)` pairs of `table`, in table order.
///
/// # Errors
///
/// Fails with [`Error::NotFound`] when the table does not exist and with
/// [`Error::Execution`] when the pragma fails.
pub async fn columns(pool: &SqlitePool, table: &str) -> Result<Vec<(String, String)>> {
    let sql = format!("PRAGMA table_info({})", quote_identifier(table));
    debug!(sql = %sql, "Introspecting table");

    let rows = sqlx::query(&sql)
        .fetch_all(pool)
        .await
        .map_err(Error::execution)?;
    if rows.is_empty() {
        return Err(Error::NotFound);
    }

    rows.iter()
        .map(|row| {
            let name: String = row.try_get("name").map_err(Error::execution)?;
            let data_type: String = row.try_get("type").map_err(Error::execution)?;
            Ok((name, data_type))
        })
        .collect()
}

/// Generates the source of a record type mirroring `table`.
///
/// # Errors
///
/// Fails like [`columns`].
pub async fn generate_record(pool: &SqlitePool, table: &str, struct_name: &str) -> Result<String> {
    let columns = columns(pool, table).await?;
    Ok(codegen::generate_record(struct_name, &columns))
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
