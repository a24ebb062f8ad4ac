//! PostgreSQL dialect.

use super::Dialect;

/// PostgreSQL: positional `$n` placeholders.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn numbered_placeholders(&self) -> bool {
        true
    }
}
