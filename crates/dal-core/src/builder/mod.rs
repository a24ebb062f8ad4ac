//! Query construction.
//!
//! [`QuerySpec`] lowers filters, orderings and a limit against a
//! [`TypeDescriptor`](crate::TypeDescriptor); [`insert_sql`] lowers one
//! record's writable columns.
//!
//! # Example
//!
//! ```rust
//! use dal_core::{DescriptorCache, PostgresDialect, Projection, QuerySpec};
//! use dal_derive::Record;
//!
//! #[derive(Debug, Default, Record)]
//! pub struct Book {
//!     #[dal("id,auto")]
//!     pub id: i64,
//!     #[dal("name")]
//!     pub title: String,
//! }
//!
//! let cache = DescriptorCache::new();
//! let book = cache.describe::<Book>().unwrap();
//! let (sql, params) = QuerySpec::new()
//!     .filter("name = ?", ["Gopherbumps"])
//!     .limit(1)
//!     .to_sql(&book, Projection::Select, &PostgresDialect::new())
//!     .unwrap();
//!
//! assert_eq!(sql, "SELECT Book.id, Book.name FROM Book WHERE name = $1 LIMIT $2");
//! assert_eq!(params.len(), 2);
//! ```

mod insert;
mod spec;
pub mod value;

pub use insert::insert_sql;
pub use spec::{Predicate, QuerySpec, NO_ARGS};
pub use value::{DecodeError, Scan, SqlValue, ToSqlValue};
