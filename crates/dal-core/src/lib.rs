//! # dal-core
//!
//! A lightweight mapping layer between query results and record types.
//!
//! This crate provides:
//! - A per-type descriptor cache built from `#[dal("...")]` field tags
//! - An immutable query specification lowered to parameterized SQL
//! - A row unmarshaler that binds result columns to record fields by name
//! - Placeholder translation for numbered dialects
//!
//! ## Mapping a record
//!
//! ```rust
//! use dal_core::{DescriptorCache, MemoryRows, Rows, SqlValue, Table, unmarshal};
//! use dal_derive::Record;
//!
//! #[derive(Debug, Default, Record)]
//! pub struct Book {
//!     #[dal("books")]
//!     dal_table: Table,
//!     #[dal("id,auto")]
//!     pub id: i64,
//!     #[dal("name")]
//!     pub title: String,
//!     #[dal("-")]
//!     pub shelf: i64,
//! }
//!
//! let cache = DescriptorCache::new();
//! let mut rows = MemoryRows::new(
//!     ["id", "name", "ignored"],
//!     vec![vec![SqlValue::Int(1), SqlValue::from("GopherTales"), SqlValue::Null]],
//! );
//!
//! let mut book = Book::default();
//! assert!(rows.next_row().unwrap());
//! unmarshal(&cache, &mut rows, &mut book).unwrap();
//!
//! assert_eq!(book.id, 1);
//! assert_eq!(book.title, "GopherTales");
//! assert_eq!(book.shelf, 0);
//! assert_eq!(cache.describe::<Book>().unwrap().table(), "books");
//! ```

extern crate self as dal_core;

pub mod builder;
pub mod codegen;
pub mod dialect;
mod error;
pub mod rows;
pub mod schema;
pub mod tag;

pub use builder::{
    insert_sql, DecodeError, Predicate, QuerySpec, Scan, SqlValue, ToSqlValue, NO_ARGS,
};
pub use dialect::{rewrite_placeholders, Dialect, GenericDialect, PostgresDialect};
pub use error::{BoxError, Error, Outcome, Result};
pub use rows::{collect, unmarshal, unmarshal_any, MemoryRows, Rows, Slot};
pub use schema::{
    DescriptorCache, FieldDef, FieldDescriptor, FieldKind, Projection, Record, Table,
    TypeDescriptor, TABLE_FIELD,
};
pub use tag::{parse_tag, FieldFlags, ParsedTag, TagError};
