//! INSERT lowering for a record's writable columns.

use super::value::SqlValue;
use crate::dialect::{rewrite_placeholders, Dialect};
use crate::schema::{Projection, TypeDescriptor};
use crate::tag::FieldFlags;

/// Builds an `INSERT` for one record.
///
/// `values` is the record's [`Record::values`](crate::Record::values)
/// output. Columns flagged `auto` are never written; columns flagged
/// `omitempty` are skipped while their value is zero. When nothing is left
/// the statement falls back to `DEFAULT VALUES`.
#[must_use]
pub fn insert_sql<D: Dialect + ?Sized>(
    descriptor: &TypeDescriptor,
    values: &[SqlValue],
    dialect: &D,
) -> (String, Vec<SqlValue>) {
    let mut columns = Vec::new();
    let mut params = Vec::new();

    for field in descriptor.projected(Projection::Insert) {
        let value = values.get(field.target).cloned().unwrap_or(SqlValue::Null);
        if field.flags.contains(FieldFlags::OMIT_EMPTY) && value.is_zero() {
            continue;
        }
        columns.push(field.column.as_str());
        params.push(value);
    }

    let table = descriptor.table();
    let sql = if columns.is_empty() {
        format!("INSERT INTO {table} DEFAULT VALUES")
    } else {
        let placeholders = vec![SqlValue::placeholder(); columns.len()];
        format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        )
    };

    (rewrite_placeholders(&sql, dialect), params)
}
