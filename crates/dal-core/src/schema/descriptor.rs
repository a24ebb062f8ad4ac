//! Type and field descriptors.

use std::any::Any;
use std::fmt;

use crate::builder::value::Scan;
use crate::tag::FieldFlags;

/// Column-level description of one mapped field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Index path through the declared fields, one step per embedded record.
    pub path: Vec<usize>,
    /// Declared field name.
    pub field: &'static str,
    /// Resolved column name.
    pub column: String,
    /// Behavioral flags.
    pub flags: FieldFlags,
    /// Position of the field in [`Record::targets`](super::Record::targets)
    /// and [`Record::values`](super::Record::values).
    pub target: usize,
}

/// Which columns a statement touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Every mapped column.
    Select,
    /// Writable columns: everything not flagged `auto`.
    Insert,
}

impl Projection {
    /// Returns whether a field with `flags` is part of this projection.
    #[must_use]
    pub const fn admits(self, flags: FieldFlags) -> bool {
        match self {
            Self::Select => flags.contains(FieldFlags::ELEMENT),
            Self::Insert => {
                flags.contains(FieldFlags::ELEMENT) && !flags.intersects(FieldFlags::AUTO)
            }
        }
    }
}

pub(crate) type Binder = for<'a> fn(&'a mut dyn Any) -> Option<Vec<&'a mut dyn Scan>>;

/// Mapping description of one record type.
///
/// Built once per type by the [`DescriptorCache`](super::DescriptorCache) and
/// shared read-only afterwards.
pub struct TypeDescriptor {
    pub(crate) record: &'static str,
    pub(crate) table: String,
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) binder: Binder,
}

impl TypeDescriptor {
    /// Returns the record type's name.
    #[must_use]
    pub const fn record(&self) -> &'static str {
        self.record
    }

    /// Returns the table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the mapped fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Returns the field mapped to `column`.
    #[must_use]
    pub fn field(&self, column: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.column == column)
    }

    /// Returns the fields admitted by `projection`.
    pub fn projected(&self, projection: Projection) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(move |f| projection.admits(f.flags))
    }

    /// Returns the column names admitted by `projection`.
    #[must_use]
    pub fn columns(&self, projection: Projection) -> Vec<&str> {
        self.projected(projection)
            .map(|f| f.column.as_str())
            .collect()
    }

    /// Returns the scan targets of `value` if it is this descriptor's record
    /// type.
    pub(crate) fn targets<'a>(&self, value: &'a mut dyn Any) -> Option<Vec<&'a mut dyn Scan>> {
        (self.binder)(value)
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.record == other.record && self.table == other.table && self.fields == other.fields
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("record", &self.record)
            .field("table", &self.table)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_admits() {
        let plain = FieldFlags::ELEMENT;
        let auto = FieldFlags::ELEMENT | FieldFlags::AUTO;
        let omit = FieldFlags::ELEMENT | FieldFlags::OMIT_EMPTY;

        assert!(Projection::Select.admits(plain));
        assert!(Projection::Select.admits(auto));
        assert!(Projection::Insert.admits(plain));
        assert!(Projection::Insert.admits(omit));
        assert!(!Projection::Insert.admits(auto));
        assert!(!Projection::Select.admits(FieldFlags::NONE));
    }
}
