//! Error types for mapping and query operations.

use thiserror::Error;

use crate::builder::value::DecodeError;
use crate::tag::TagError;

/// Boxed error raised by an executor.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by the mapping core and its executors.
#[derive(Debug, Error)]
pub enum Error {
    /// A value of the wrong kind was passed where a record was required.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A field tag is malformed.
    #[error("invalid tag on {record}.{field}: {source}")]
    Tag {
        /// Record type name.
        record: &'static str,
        /// Declared field name.
        field: &'static str,
        /// What is wrong with the tag.
        source: TagError,
    },

    /// The query returned no rows.
    #[error("no record found")]
    NotFound,

    /// A column value could not be stored into its field.
    #[error("cannot decode column `{column}`: {source}")]
    Decode {
        /// Column name.
        column: String,
        /// Conversion failure.
        source: DecodeError,
    },

    /// The executor failed (connectivity, SQL syntax, constraints...).
    #[error(transparent)]
    Execution(BoxError),
}

impl Error {
    /// Wraps an executor failure.
    #[must_use]
    pub fn execution(err: impl Into<BoxError>) -> Self {
        Self::Execution(err.into())
    }

    /// Returns whether this is a hard failure rather than an empty result.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        !self.is_empty()
    }

    /// Returns whether the query simply found nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Result type alias for mapping operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure/emptiness queries on a [`Result`].
///
/// `Ok` answers "no failure, not empty, no message", so call sites can branch
/// without matching on the error.
pub trait Outcome {
    /// Returns whether the operation failed for a reason other than an empty
    /// result.
    fn failed(&self) -> bool;

    /// Returns whether the operation found no rows.
    fn empty(&self) -> bool;

    /// Returns the error message, or an empty string.
    fn message(&self) -> String;
}

impl<T> Outcome for Result<T> {
    fn failed(&self) -> bool {
        self.as_ref().err().is_some_and(Error::is_failure)
    }

    fn empty(&self) -> bool {
        self.as_ref().err().is_some_and(Error::is_empty)
    }

    fn message(&self) -> String {
        self.as_ref().err().map(ToString::to_string).unwrap_or_default()
    }
}
