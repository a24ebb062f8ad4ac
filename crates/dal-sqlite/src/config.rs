//! Connection options.

use std::env;

use dal_core::{Error, Result};
use serde::Deserialize;

/// Environment variable holding the database URL.
pub const DATABASE_URL: &str = "DATABASE_URL";

/// Environment variable holding the pool size.
pub const MAX_CONNECTIONS: &str = "DAL_MAX_CONNECTIONS";

/// Options for opening a [`Db`](crate::Db).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DbOptions {
    /// SQLite connection URL, e.g. `sqlite:db.sqlite3`.
    pub url: String,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
}

impl Default for DbOptions {
    fn default() -> Self {
        Self {
            url: String::from("sqlite::memory:"),
            max_connections: 1,
        }
    }
}

impl DbOptions {
    /// Creates options for `url` with the default pool size.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Sets the maximum number of pooled connections.
    #[must_use]
    pub const fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    /// Reads options from `DATABASE_URL` and `DAL_MAX_CONNECTIONS`, falling
    /// back to the defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `DAL_MAX_CONNECTIONS` is not a
    /// number.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut options = Self::default();
        if let Some(url) = lookup(DATABASE_URL) {
            options.url = url;
        }
        if let Some(raw) = lookup(MAX_CONNECTIONS) {
            options.max_connections = raw.trim().parse().map_err(|_| {
                Error::InvalidArgument(format!("{MAX_CONNECTIONS} is not a pool size: {raw}"))
            })?;
        }
        Ok(options)
    }
}
