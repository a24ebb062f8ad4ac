//! Field tag parsing.
//!
//! A tag is the string attached to a record field with `#[dal("...")]`:
//!
//! ```text
//! name            column "name"
//! name,auto       column "name", filled in by the store
//! ,omitempty      column named after the field, skipped on insert when zero
//! -               field is not mapped at all
//! ```

use std::fmt;
use std::ops::BitOr;

use thiserror::Error;

/// Tag value excluding a field from mapping.
pub const EXCLUDE: &str = "-";

/// Behavioral flags of a mapped field.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FieldFlags(u8);

impl FieldFlags {
    /// No flags.
    pub const NONE: Self = Self(0);
    /// The field is a selectable column. Set on every mapped field.
    pub const ELEMENT: Self = Self(1);
    /// The column is populated by the store and never written.
    pub const AUTO: Self = Self(1 << 1);
    /// The column is left out of writes when the value is zero.
    pub const OMIT_EMPTY: Self = Self(1 << 2);

    /// Returns whether every flag in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns whether any flag in `other` is set.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for FieldFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for FieldFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (Self::ELEMENT, "ELEMENT"),
            (Self::AUTO, "AUTO"),
            (Self::OMIT_EMPTY, "OMIT_EMPTY"),
        ]
        .iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| *name)
        .collect();
        write!(f, "FieldFlags({})", names.join(" | "))
    }
}

/// The result of parsing one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTag {
    /// Resolved column name.
    pub column: String,
    /// Flags; always includes [`FieldFlags::ELEMENT`].
    pub flags: FieldFlags,
}

/// A malformed tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    /// A flag token is not one of `auto`, `omitempty`.
    #[error("unknown flag `{0}`")]
    UnknownFlag(String),
    /// A flag position holds nothing, as in `name,,auto` or `name,`.
    #[error("empty flag")]
    EmptyFlag,
}

/// Returns whether `tag` excludes its field from mapping.
///
/// A tag whose name token is `-` excludes the field whatever flags follow.
#[must_use]
pub fn is_excluded(tag: &str) -> bool {
    tag.split(',').next() == Some(EXCLUDE)
}

/// Parses the tag of the field declared as `field`.
///
/// An empty name token falls back to the declared field name. The exclude
/// sentinel is not handled here; see [`is_excluded`].
///
/// # Errors
///
/// Returns a [`TagError`] for an unknown or empty flag token.
pub fn parse_tag(field: &str, tag: &str) -> Result<ParsedTag, TagError> {
    let mut tokens = tag.split(',');
    let name = tokens.next().unwrap_or_default();

    let mut flags = FieldFlags::ELEMENT;
    for token in tokens {
        flags = flags
            | match token {
                "auto" => FieldFlags::AUTO,
                "omitempty" => FieldFlags::OMIT_EMPTY,
                "" => return Err(TagError::EmptyFlag),
                other => return Err(TagError::UnknownFlag(String::from(other))),
            };
    }

    let column = if name.is_empty() { field } else { name };
    Ok(ParsedTag {
        column: String::from(column),
        flags,
    })
}
