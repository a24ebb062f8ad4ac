//! SQL dialect support.
//!
//! Queries are built with the neutral `?` placeholder. A dialect decides
//! whether the final SQL keeps it or rewrites it into numbered markers.

mod generic;
mod postgres;

pub use generic::GenericDialect;
pub use postgres::PostgresDialect;

/// Trait for SQL dialect-specific behavior.
pub trait Dialect {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns whether placeholders are numbered (`$1`, `$2`, ...).
    fn numbered_placeholders(&self) -> bool {
        false
    }

    /// Returns the placeholder for the 1-based argument `index`.
    fn placeholder(&self, index: usize) -> String {
        if self.numbered_placeholders() {
            format!("${index}")
        } else {
            String::from("?")
        }
    }
}

/// Rewrites every neutral `?` placeholder into the dialect's form.
///
/// Placeholders are numbered left to right. Text inside single-quoted
/// string literals and double-quoted identifiers is copied untouched, with
/// doubled quotes treated as escapes. Dialects that use `?` natively get
/// the input back unchanged.
#[must_use]
pub fn rewrite_placeholders<D: Dialect + ?Sized>(sql: &str, dialect: &D) -> String {
    if !dialect.numbered_placeholders() {
        return String::from(sql);
    }

    let mut out = String::with_capacity(sql.len() + 8);
    let mut quote: Option<char> = None;
    let mut index = 0;

    for c in sql.chars() {
        match quote {
            // A doubled quote closes and immediately reopens the literal,
            // which copies both characters through unchanged.
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None if c == '?' => {
                index += 1;
                out.push_str(&dialect.placeholder(index));
                continue;
            }
            None => {
                if c == '\'' || c == '"' {
                    quote = Some(c);
                }
            }
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_keeps_neutral_placeholders() {
        let sql = "SELECT a FROM t WHERE a = ? AND b = ?";
        assert_eq!(rewrite_placeholders(sql, &GenericDialect::new()), sql);
    }

    #[test]
    fn test_postgres_numbers_left_to_right() {
        let sql = "SELECT a FROM t WHERE a = ? AND b = ? LIMIT ?";
        assert_eq!(
            rewrite_placeholders(sql, &PostgresDialect::new()),
            "SELECT a FROM t WHERE a = $1 AND b = $2 LIMIT $3"
        );
    }

    #[test]
    fn test_postgres_skips_string_literals() {
        let sql = "SELECT a FROM t WHERE note = 'why?' AND b = ?";
        assert_eq!(
            rewrite_placeholders(sql, &PostgresDialect::new()),
            "SELECT a FROM t WHERE note = 'why?' AND b = $1"
        );
    }

    #[test]
    fn test_postgres_skips_escaped_quotes_and_identifiers() {
        let sql = r#"SELECT "odd?col" FROM t WHERE s = 'it''s ?' AND x = ?"#;
        assert_eq!(
            rewrite_placeholders(sql, &PostgresDialect::new()),
            r#"SELECT "odd?col" FROM t WHERE s = 'it''s ?' AND x = $1"#
        );
    }

    #[test]
    fn test_no_placeholders() {
        assert_eq!(
            rewrite_placeholders("SELECT 1", &PostgresDialect::new()),
            "SELECT 1"
        );
    }
}
