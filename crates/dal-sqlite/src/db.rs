//! Database handle.

use std::sync::Arc;

use dal_core::{
    collect, insert_sql, DescriptorCache, Error, GenericDialect, Projection, QuerySpec, Record,
    Result, SqlValue,
};
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqlitePoolOptions};
use sqlx::Sqlite;
use tracing::debug;

use crate::config::DbOptions;
use crate::rows::SqliteRows;

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// A SQLite connection pool paired with a descriptor cache.
#[derive(Debug, Clone)]
pub struct Db {
    pool: SqlitePool,
    cache: Arc<DescriptorCache>,
}

impl Db {
    /// Opens a pool according to `options`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Execution`] when the pool cannot connect.
    pub async fn connect(options: &DbOptions) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections)
            .connect(&options.url)
            .await
            .map_err(Error::execution)?;
        Ok(Self::from_pool(pool))
    }

    /// Wraps an existing pool with a fresh descriptor cache.
    #[must_use]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            cache: Arc::new(DescriptorCache::new()),
        }
    }

    /// Replaces the descriptor cache, e.g. to share one between handles.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<DescriptorCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the descriptor cache.
    #[must_use]
    pub fn cache(&self) -> &DescriptorCache {
        &self.cache
    }

    /// Runs `sql` and buffers every returned row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Execution`] when the statement fails.
    pub async fn query(&self, sql: &str, args: Vec<SqlValue>) -> Result<SqliteRows> {
        debug!(sql = %sql, args = args.len(), "Executing SQL");
        let rows = bind_all(sqlx::query(sql), args)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::execution)?;
        Ok(SqliteRows::new(rows))
    }

    /// Runs a statement and returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Execution`] when the statement fails.
    pub async fn execute(&self, sql: &str, args: Vec<SqlValue>) -> Result<u64> {
        debug!(sql = %sql, args = args.len(), "Executing SQL");
        let result = bind_all(sqlx::query(sql), args)
            .execute(&self.pool)
            .await
            .map_err(Error::execution)?;
        Ok(result.rows_affected())
    }

    /// Returns every record matching `spec`.
    ///
    /// # Errors
    ///
    /// Propagates descriptor, lowering, execution and unmarshal errors.
    pub async fn all<R: Record + Default>(&self, spec: &QuerySpec) -> Result<Vec<R>> {
        let descriptor = self.cache.describe::<R>()?;
        let (sql, args) = spec.to_sql(&descriptor, Projection::Select, &GenericDialect::new())?;
        let mut rows = self.query(&sql, args).await?;
        collect(&self.cache, &mut rows)
    }

    /// Returns the first record matching `spec`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NotFound`] when nothing matches, otherwise like
    /// [`Db::all`].
    pub async fn get<R: Record + Default>(&self, spec: &QuerySpec) -> Result<R> {
        self.all(&spec.limit(1))
            .await?
            .into_iter()
            .next()
            .ok_or(Error::NotFound)
    }

    /// Inserts `record` into its table and returns the new row id.
    ///
    /// `auto` columns are left to the database; zero `omitempty` columns are
    /// left to their column defaults.
    ///
    /// # Errors
    ///
    /// Propagates descriptor errors and returns [`Error::Execution`] when the
    /// insert fails.
    pub async fn save<R: Record>(&self, record: &R) -> Result<i64> {
        let descriptor = self.cache.describe::<R>()?;
        let (sql, args) = insert_sql(&descriptor, &record.values(), &GenericDialect::new());
        debug!(sql = %sql, args = args.len(), "Executing SQL");
        let result = bind_all(sqlx::query(&sql), args)
            .execute(&self.pool)
            .await
            .map_err(Error::execution)?;
        Ok(result.last_insert_rowid())
    }
}

fn bind_all(query: SqliteQuery<'_>, args: Vec<SqlValue>) -> SqliteQuery<'_> {
    args.into_iter().fold(query, bind_value)
}

fn bind_value(query: SqliteQuery<'_>, value: SqlValue) -> SqliteQuery<'_> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Blob(b) => query.bind(b),
    }
}
