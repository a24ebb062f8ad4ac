//! Buffered result rows.

use std::fmt;

use dal_core::rows::scan_values;
use dal_core::{Error, Result, Rows, Slot, SqlValue};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// The rows of one query, fetched in full.
///
/// Column names come from the first row, so an empty result reports no
/// columns.
#[derive(Default)]
pub struct SqliteRows {
    columns: Vec<String>,
    rows: Vec<SqliteRow>,
    position: Option<usize>,
}

impl SqliteRows {
    /// Wraps rows returned by `sqlx`.
    #[must_use]
    pub fn new(rows: Vec<SqliteRow>) -> Self {
        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|c| String::from(c.name()))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            columns,
            rows,
            position: None,
        }
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether the query returned no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn current(&self) -> Result<&SqliteRow> {
        self.position
            .and_then(|p| self.rows.get(p))
            .ok_or_else(|| Error::InvalidArgument(String::from("cursor is not on a row")))
    }
}

impl fmt::Debug for SqliteRows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteRows")
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("position", &self.position)
            .finish()
    }
}

impl Rows for SqliteRows {
    fn next_row(&mut self) -> Result<bool> {
        let next = self.position.map_or(0, |p| p + 1);
        self.position = Some(next.min(self.rows.len()));
        Ok(next < self.rows.len())
    }

    fn columns(&self) -> Result<Vec<String>> {
        Ok(self.columns.clone())
    }

    fn scan(&mut self, slots: &mut [Slot<'_>]) -> Result<()> {
        let row = self.current()?;
        let values = (0..row.len())
            .map(|index| decode(row, index))
            .collect::<Result<Vec<_>>>()?;
        scan_values(&self.columns, values, slots)
    }
}

/// Decodes one column by its SQLite storage class.
fn decode(row: &SqliteRow, index: usize) -> Result<SqlValue> {
    let raw = row.try_get_raw(index).map_err(Error::execution)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let storage = raw.type_info().name().to_ascii_uppercase();

    let value = match storage.as_str() {
        "INTEGER" => SqlValue::Int(row.try_get(index).map_err(Error::execution)?),
        "BOOLEAN" => SqlValue::Bool(row.try_get(index).map_err(Error::execution)?),
        "REAL" => SqlValue::Float(row.try_get(index).map_err(Error::execution)?),
        "BLOB" => SqlValue::Blob(row.try_get(index).map_err(Error::execution)?),
        _ => SqlValue::Text(row.try_get_unchecked(index).map_err(Error::execution)?),
    };
    Ok(value)
}
