//! SQL values, parameter conversion and column decoding.
//!
//! [`SqlValue`] is the currency between the mapping core and an executor:
//! query arguments are lowered to it, and result columns arrive as it before
//! being decoded into record fields through [`Scan`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

/// A SQL value that can be used as a parameter or read from a column.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns the name of the value's kind, as used in decode errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }

    /// Returns whether this is the zero value of its kind.
    ///
    /// Fields tagged `omitempty` are left out of inserts when this holds.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !b,
            Self::Int(n) => *n == 0,
            Self::Float(f) => *f == 0.0,
            Self::Text(s) => s.is_empty(),
            Self::Blob(b) => b.is_empty(),
        }
    }

    /// Returns the parameter placeholder.
    #[must_use]
    pub const fn placeholder() -> &'static str {
        "?"
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(String::from(value))
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Trait for field types that can be written as SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(&self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(&self) -> SqlValue {
        self.clone()
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Bool(*self)
    }
}

macro_rules! impl_to_sql_int {
    ($($ty:ty),+) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(&self) -> SqlValue {
                    SqlValue::Int(i64::from(*self))
                }
            }
        )+
    };
}

impl_to_sql_int!(i8, i16, i32, u8, u16, u32);

impl ToSqlValue for i64 {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Int(*self)
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Float(*self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Float(f64::from(*self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Blob(self.clone())
    }
}

impl ToSqlValue for NaiveDate {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.format(DATE_FORMAT).to_string())
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.format(DATETIME_FORMAT).to_string())
    }
}

impl ToSqlValue for DateTime<Utc> {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.to_rfc3339())
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(&self) -> SqlValue {
        self.as_ref().map_or(SqlValue::Null, ToSqlValue::to_sql_value)
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Error produced when a column value cannot be stored into a field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The value's kind is not accepted by the field type.
    #[error("expected {expected}, found {found}")]
    Mismatch {
        /// The kind the field accepts.
        expected: &'static str,
        /// The kind that arrived.
        found: &'static str,
    },
    /// The value does not fit the field type.
    #[error("value {value} out of range for {target}")]
    OutOfRange {
        /// The integer that arrived.
        value: i64,
        /// The field type.
        target: &'static str,
    },
    /// Text could not be parsed into the field type.
    #[error("cannot parse {input:?} as {target}")]
    Parse {
        /// The offending text.
        input: String,
        /// The field type.
        target: &'static str,
    },
}

impl DecodeError {
    const fn mismatch(expected: &'static str, found: &SqlValue) -> Self {
        Self::Mismatch {
            expected,
            found: found.kind(),
        }
    }
}

/// A scan destination: a field able to take a column value.
pub trait Scan {
    /// Stores `value` into the destination.
    fn scan(&mut self, value: SqlValue) -> Result<(), DecodeError>;
}

impl Scan for SqlValue {
    fn scan(&mut self, value: SqlValue) -> Result<(), DecodeError> {
        *self = value;
        Ok(())
    }
}

impl Scan for bool {
    fn scan(&mut self, value: SqlValue) -> Result<(), DecodeError> {
        *self = match value {
            SqlValue::Bool(b) => b,
            SqlValue::Int(n) => n != 0,
            other => return Err(DecodeError::mismatch("bool", &other)),
        };
        Ok(())
    }
}

macro_rules! impl_scan_int {
    ($($ty:ty),+) => {
        $(
            impl Scan for $ty {
                fn scan(&mut self, value: SqlValue) -> Result<(), DecodeError> {
                    match value {
                        SqlValue::Int(n) => {
                            *self = Self::try_from(n).map_err(|_| DecodeError::OutOfRange {
                                value: n,
                                target: stringify!($ty),
                            })?;
                            Ok(())
                        }
                        SqlValue::Bool(b) => {
                            *self = Self::from(b);
                            Ok(())
                        }
                        other => Err(DecodeError::mismatch("integer", &other)),
                    }
                }
            }
        )+
    };
}

impl_scan_int!(i8, i16, i32, u8, u16, u32, u64);

impl Scan for i64 {
    fn scan(&mut self, value: SqlValue) -> Result<(), DecodeError> {
        *self = match value {
            SqlValue::Int(n) => n,
            SqlValue::Bool(b) => Self::from(b),
            other => return Err(DecodeError::mismatch("integer", &other)),
        };
        Ok(())
    }
}

impl Scan for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn scan(&mut self, value: SqlValue) -> Result<(), DecodeError> {
        *self = match value {
            SqlValue::Float(f) => f,
            SqlValue::Int(n) => n as f64,
            other => return Err(DecodeError::mismatch("float", &other)),
        };
        Ok(())
    }
}

impl Scan for f32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn scan(&mut self, value: SqlValue) -> Result<(), DecodeError> {
        *self = match value {
            SqlValue::Float(f) => f as f32,
            SqlValue::Int(n) => n as f32,
            other => return Err(DecodeError::mismatch("float", &other)),
        };
        Ok(())
    }
}

impl Scan for String {
    fn scan(&mut self, value: SqlValue) -> Result<(), DecodeError> {
        *self = match value {
            SqlValue::Text(s) => s,
            SqlValue::Blob(bytes) => Self::from_utf8(bytes).map_err(|e| DecodeError::Parse {
                input: Self::from_utf8_lossy(e.as_bytes()).into_owned(),
                target: "String",
            })?,
            other => return Err(DecodeError::mismatch("text", &other)),
        };
        Ok(())
    }
}

impl Scan for Vec<u8> {
    fn scan(&mut self, value: SqlValue) -> Result<(), DecodeError> {
        *self = match value {
            SqlValue::Blob(bytes) => bytes,
            SqlValue::Text(s) => s.into_bytes(),
            other => return Err(DecodeError::mismatch("blob", &other)),
        };
        Ok(())
    }
}

fn scan_text<T>(
    value: SqlValue,
    target: &'static str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, DecodeError> {
    match value {
        SqlValue::Text(s) => parse(&s).ok_or(DecodeError::Parse { input: s, target }),
        other => Err(DecodeError::mismatch("text", &other)),
    }
}

impl Scan for NaiveDate {
    fn scan(&mut self, value: SqlValue) -> Result<(), DecodeError> {
        *self = scan_text(value, "NaiveDate", |s| {
            Self::parse_from_str(s, DATE_FORMAT).ok()
        })?;
        Ok(())
    }
}

impl Scan for NaiveDateTime {
    fn scan(&mut self, value: SqlValue) -> Result<(), DecodeError> {
        *self = scan_text(value, "NaiveDateTime", |s| {
            Self::parse_from_str(s, DATETIME_FORMAT)
                .or_else(|_| Self::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
                .ok()
        })?;
        Ok(())
    }
}

impl Scan for DateTime<Utc> {
    fn scan(&mut self, value: SqlValue) -> Result<(), DecodeError> {
        *self = scan_text(value, "DateTime<Utc>", |s| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        })?;
        Ok(())
    }
}

impl<T: Scan + Default> Scan for Option<T> {
    fn scan(&mut self, value: SqlValue) -> Result<(), DecodeError> {
        if value == SqlValue::Null {
            *self = None;
            return Ok(());
        }
        let mut inner = T::default();
        inner.scan(value)?;
        *self = Some(inner);
        Ok(())
    }
}
