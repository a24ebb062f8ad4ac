//! Result cursors and row unmarshaling.
//!
//! An executor hands back something implementing [`Rows`]. [`unmarshal`]
//! binds the current row into a record by column name; [`collect`] walks the
//! whole cursor.

use std::any::Any;

use crate::builder::value::{DecodeError, Scan, SqlValue};
use crate::error::{Error, Result};
use crate::schema::{DescriptorCache, Record, TypeDescriptor};

/// A scan destination for one result column.
pub enum Slot<'a> {
    /// A record field.
    Field(&'a mut dyn Scan),
    /// Accepts any value and drops it.
    Discard,
}

impl Slot<'_> {
    /// Stores `value` into the slot.
    ///
    /// # Errors
    ///
    /// Returns the field's [`DecodeError`] when it rejects `value`.
    pub fn scan(&mut self, value: SqlValue) -> std::result::Result<(), DecodeError> {
        match self {
            Self::Field(target) => target.scan(value),
            Self::Discard => Ok(()),
        }
    }

    /// Returns whether the slot drops its value.
    #[must_use]
    pub const fn is_discard(&self) -> bool {
        matches!(self, Self::Discard)
    }
}

/// A multi-row result owned by an executor.
pub trait Rows {
    /// Advances to the next row. Returns `false` once exhausted.
    fn next_row(&mut self) -> Result<bool>;

    /// Returns the column names of the result, in order.
    fn columns(&self) -> Result<Vec<String>>;

    /// Scans the current row into `slots`, one per column in column order.
    fn scan(&mut self, slots: &mut [Slot<'_>]) -> Result<()>;
}

/// Scans `values` into `slots`, attributing decode failures to `columns`.
///
/// Executors that materialize a row as [`SqlValue`]s can implement
/// [`Rows::scan`] with this.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] when the value and slot counts differ,
/// and [`Error::Decode`] for the first value its slot rejects.
pub fn scan_values(
    columns: &[String],
    values: Vec<SqlValue>,
    slots: &mut [Slot<'_>],
) -> Result<()> {
    if values.len() != slots.len() {
        return Err(Error::InvalidArgument(format!(
            "expected {} scan destinations, got {}",
            values.len(),
            slots.len()
        )));
    }
    for ((slot, value), column) in slots.iter_mut().zip(values).zip(columns) {
        slot.scan(value).map_err(|source| Error::Decode {
            column: column.clone(),
            source,
        })?;
    }
    Ok(())
}

/// Rows held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRows {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
    position: Option<usize>,
    scans: usize,
}

impl MemoryRows {
    /// Creates a cursor over `rows` with the given column names.
    #[must_use]
    pub fn new<C: Into<String>>(
        columns: impl IntoIterator<Item = C>,
        rows: Vec<Vec<SqlValue>>,
    ) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows,
            position: None,
            scans: 0,
        }
    }

    /// Returns how many times [`Rows::scan`] was called.
    #[must_use]
    pub const fn scans(&self) -> usize {
        self.scans
    }
}

impl Rows for MemoryRows {
    fn next_row(&mut self) -> Result<bool> {
        let next = self.position.map_or(0, |p| p + 1);
        self.position = Some(next.min(self.rows.len()));
        Ok(next < self.rows.len())
    }

    fn columns(&self) -> Result<Vec<String>> {
        Ok(self.columns.clone())
    }

    fn scan(&mut self, slots: &mut [Slot<'_>]) -> Result<()> {
        self.scans += 1;
        let row = self
            .position
            .and_then(|p| self.rows.get(p))
            .ok_or_else(|| Error::InvalidArgument(String::from("cursor is not on a row")))?;
        scan_values(&self.columns, row.clone(), slots)
    }
}

/// Binds the current row of `rows` into `dest`.
///
/// Columns are matched to fields by resolved column name; columns without a
/// field are discarded. The cursor is not advanced.
///
/// # Errors
///
/// Propagates descriptor, column and scan errors. On error `dest` may be
/// partially written.
pub fn unmarshal<R: Record, C: Rows + ?Sized>(
    cache: &DescriptorCache,
    rows: &mut C,
    dest: &mut R,
) -> Result<()> {
    let descriptor = cache.describe::<R>()?;
    bind(&descriptor, rows, dest.targets())
}

/// Binds the current row of `rows` into a record known only at runtime.
///
/// `dest` must itself be a record whose type is registered in `cache`.
///
/// # Errors
///
/// Anything else, boxed or borrowed records included, fails with
/// [`Error::InvalidArgument`] before the cursor is touched. Otherwise fails
/// like [`unmarshal`].
pub fn unmarshal_any<C: Rows + ?Sized>(
    cache: &DescriptorCache,
    rows: &mut C,
    dest: &mut dyn Any,
) -> Result<()> {
    let type_id = (*dest).type_id();
    let descriptor = cache.lookup(type_id).ok_or_else(|| {
        Error::InvalidArgument(String::from(
            "unmarshal destination is not a registered record",
        ))
    })?;
    let targets = descriptor.targets(dest).ok_or_else(|| {
        Error::InvalidArgument(String::from("unmarshal destination has the wrong type"))
    })?;
    bind(&descriptor, rows, targets)
}

fn bind<C: Rows + ?Sized>(
    descriptor: &TypeDescriptor,
    rows: &mut C,
    targets: Vec<&mut dyn Scan>,
) -> Result<()> {
    let columns = rows.columns()?;
    let mut targets: Vec<Option<&mut dyn Scan>> = targets.into_iter().map(Some).collect();

    let mut slots: Vec<Slot<'_>> = columns
        .iter()
        .map(|column| {
            descriptor
                .field(column)
                .and_then(|field| targets.get_mut(field.target))
                .and_then(Option::take)
                .map_or(Slot::Discard, Slot::Field)
        })
        .collect();

    rows.scan(&mut slots)
}

/// Reads every remaining row of `rows` into a new record.
///
/// # Errors
///
/// Stops at the first cursor or [`unmarshal`] error.
pub fn collect<R: Record + Default, C: Rows + ?Sized>(
    cache: &DescriptorCache,
    rows: &mut C,
) -> Result<Vec<R>> {
    let mut records = Vec::new();
    while rows.next_row()? {
        let mut record = R::default();
        unmarshal(cache, rows, &mut record)?;
        records.push(record);
    }
    Ok(records)
}
