//! Immutable query specifications.
//!
//! A [`QuerySpec`] accumulates predicates, orderings and a limit. Every
//! chain method borrows the spec and returns a new one, so a base query can
//! be specialized along several branches:
//!
//! ```rust
//! use dal_core::QuerySpec;
//!
//! let active = QuerySpec::new().filter("active = ?", [true]);
//! let admins = active.filter("role = ?", ["admin"]);
//! let recent = active.order("created_at DESC").limit(10);
//!
//! assert_eq!(active.predicates().len(), 1);
//! assert_eq!(admins.predicates().len(), 2);
//! assert_eq!(recent.limit_value(), Some(10));
//! ```

use std::sync::Arc;

use super::value::SqlValue;
use crate::dialect::{rewrite_placeholders, Dialect};
use crate::error::{Error, Result};
use crate::schema::{Projection, TypeDescriptor};

/// One `WHERE` predicate with its positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    expr: Arc<str>,
    args: Arc<[SqlValue]>,
}

impl Predicate {
    /// Returns the SQL expression text.
    #[must_use]
    pub fn expr(&self) -> &str {
        &self.expr
    }

    /// Returns the arguments bound by the expression's placeholders.
    #[must_use]
    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }
}

/// Accumulated filter, order and limit state of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    predicates: Arc<[Predicate]>,
    orders: Arc<[Arc<str>]>,
    limit: Option<i64>,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            predicates: Arc::from(Vec::new()),
            orders: Arc::from(Vec::new()),
            limit: None,
        }
    }
}

/// Empty argument list for predicates without placeholders.
pub const NO_ARGS: [SqlValue; 0] = [];

fn appended<T: Clone>(items: &Arc<[T]>, item: T) -> Arc<[T]> {
    items.iter().cloned().chain(std::iter::once(item)).collect()
}

impl QuerySpec {
    /// Creates an empty specification.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate, conjoined with the existing ones.
    ///
    /// `expr` is trusted SQL using `?` for each argument; only `args` are
    /// parameterized.
    #[must_use]
    pub fn filter<I>(&self, expr: &str, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SqlValue>,
    {
        let predicate = Predicate {
            expr: Arc::from(expr),
            args: args.into_iter().map(Into::into).collect(),
        };
        Self {
            predicates: appended(&self.predicates, predicate),
            orders: Arc::clone(&self.orders),
            limit: self.limit,
        }
    }

    /// Adds an `ORDER BY` expression after the existing ones.
    ///
    /// `expr` is trusted SQL and is not validated.
    #[must_use]
    pub fn order(&self, expr: &str) -> Self {
        Self {
            predicates: Arc::clone(&self.predicates),
            orders: appended(&self.orders, Arc::from(expr)),
            limit: self.limit,
        }
    }

    /// Sets the row limit. Values below 1 disable it.
    #[must_use]
    pub fn limit(&self, n: i64) -> Self {
        Self {
            predicates: Arc::clone(&self.predicates),
            orders: Arc::clone(&self.orders),
            limit: Some(n),
        }
    }

    /// Returns the predicates in the order they were added.
    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Returns the `ORDER BY` expressions in the order they were added.
    pub fn orders(&self) -> impl Iterator<Item = &str> {
        self.orders.iter().map(|o| &**o)
    }

    /// Returns the effective limit, if any.
    #[must_use]
    pub fn limit_value(&self) -> Option<i64> {
        self.limit.filter(|n| *n > 0)
    }

    /// Lowers the specification into a `SELECT` over the projected columns.
    ///
    /// Columns are qualified with the table name. Arguments follow the
    /// predicates in insertion order, then the limit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `projection` admits no column
    /// of the record.
    pub fn to_sql<D: Dialect + ?Sized>(
        &self,
        descriptor: &TypeDescriptor,
        projection: Projection,
        dialect: &D,
    ) -> Result<(String, Vec<SqlValue>)> {
        let table = descriptor.table();
        let columns: Vec<String> = descriptor
            .columns(projection)
            .into_iter()
            .map(|column| format!("{table}.{column}"))
            .collect();
        if columns.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "{} has no column to select for {projection:?}",
                descriptor.record()
            )));
        }

        let mut sql = format!("SELECT {} FROM {table}", columns.join(", "));
        let mut params = Vec::new();

        if !self.predicates.is_empty() {
            let exprs: Vec<&str> = self.predicates.iter().map(Predicate::expr).collect();
            sql.push_str(" WHERE ");
            sql.push_str(&exprs.join(" AND "));
            for predicate in self.predicates.iter() {
                params.extend_from_slice(predicate.args());
            }
        }

        if !self.orders.is_empty() {
            let orders: Vec<&str> = self.orders().collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&orders.join(", "));
        }

        if let Some(limit) = self.limit_value() {
            sql.push_str(" LIMIT ");
            sql.push_str(SqlValue::placeholder());
            params.push(SqlValue::Int(limit));
        }

        Ok((rewrite_placeholders(&sql, dialect), params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_keeps_argument_order() {
        let spec = QuerySpec::new()
            .filter("a = ? AND b = ?", [SqlValue::Int(1), SqlValue::from("x")])
            .filter("c = ?", [true]);

        let args: Vec<&SqlValue> = spec.predicates().iter().flat_map(Predicate::args).collect();
        assert_eq!(
            args,
            [
                &SqlValue::Int(1),
                &SqlValue::Text(String::from("x")),
                &SqlValue::Bool(true)
            ]
        );
    }

    #[test]
    fn test_branches_do_not_interfere() {
        let base = QuerySpec::new().filter("a = ?", [1_i64]);
        let left = base.filter("b = ?", [2_i64]);
        let right = base.order("a");

        assert_eq!(base.predicates().len(), 1);
        assert_eq!(left.predicates().len(), 2);
        assert_eq!(right.predicates().len(), 1);
        assert_eq!(right.orders().collect::<Vec<_>>(), ["a"]);
        assert_eq!(left.orders().count(), 0);
    }

    #[test]
    fn test_unmodified_parts_are_shared() {
        let base = QuerySpec::new().filter("a = ?", [1_i64]).order("a");
        let limited = base.limit(5);
        let filtered = base.filter("b = ?", [2_i64]);

        assert!(Arc::ptr_eq(&base.predicates, &limited.predicates));
        assert!(Arc::ptr_eq(&base.orders, &filtered.orders));
    }

    #[test]
    fn test_predicate_without_args() {
        let spec = QuerySpec::new().filter("deleted_at IS NULL", NO_ARGS);
        assert!(spec.predicates()[0].args().is_empty());
    }

    #[test]
    fn test_non_positive_limit_is_ignored() {
        assert_eq!(QuerySpec::new().limit(0).limit_value(), None);
        assert_eq!(QuerySpec::new().limit(-3).limit_value(), None);
        assert_eq!(QuerySpec::new().limit(0).limit(4).limit_value(), Some(4));
    }
}
