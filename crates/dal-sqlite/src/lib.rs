//! # dal-sqlite
//!
//! SQLite executor for dal, built on `sqlx`.
//!
//! [`Db`] lowers a [`QuerySpec`](dal_core::QuerySpec) against a record's
//! descriptor, runs it on a pool and unmarshals the buffered rows.
//!
//! ## Quick Start
//!
//! ```ignore
//! use dal_core::{QuerySpec, Table};
//! use dal_derive::Record;
//! use dal_sqlite::{Db, DbOptions};
//!
//! #[derive(Debug, Default, Record)]
//! pub struct Book {
//!     #[dal("books")]
//!     dal_table: Table,
//!     #[dal("id,auto")]
//!     pub id: i64,
//!     #[dal("name")]
//!     pub title: String,
//! }
//!
//! async fn example() -> dal_core::Result<()> {
//!     let db = Db::connect(&DbOptions::from_env()?).await?;
//!
//!     db.save(&Book { title: "GopherTales".into(), ..Book::default() }).await?;
//!
//!     let book: Book = db
//!         .get(&QuerySpec::new().filter("name = ?", ["GopherTales"]))
//!         .await?;
//!     let recent: Vec<Book> = db.all(&QuerySpec::new().order("id DESC").limit(10)).await?;
//!
//!     Ok(())
//! }
//! ```

mod config;
mod db;
pub mod introspect;
mod rows;

pub use config::{DbOptions, DATABASE_URL, MAX_CONNECTIONS};
pub use db::Db;
pub use rows::SqliteRows;
