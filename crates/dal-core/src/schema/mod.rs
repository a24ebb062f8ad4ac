//! Record registration and type descriptors.
//!
//! A record type registers its fields through the [`Record`] trait, which is
//! normally implemented by `#[derive(Record)]`. The [`DescriptorCache`]
//! turns that static registration into a [`TypeDescriptor`] once per type.

mod cache;
mod descriptor;

pub use cache::DescriptorCache;
pub use descriptor::{FieldDescriptor, Projection, TypeDescriptor};

use crate::builder::value::{Scan, SqlValue};

/// Declared name of the field that carries the table name.
///
/// A record field with this name (of type [`Table`]) is never mapped to a
/// column; its tag names the table instead.
pub const TABLE_FIELD: &str = "dal_table";

/// Zero-sized marker type for the [`TABLE_FIELD`] field.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Table;

/// How a declared field participates in the mapping.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A plain column.
    Column,
    /// A nested record whose fields are mapped in place.
    Embedded(fn() -> &'static [FieldDef]),
}

/// Static registration of one declared field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// Declared field name.
    pub name: &'static str,
    /// Raw tag string, if the field carries one.
    pub tag: Option<&'static str>,
    /// Whether the field is visible outside its module.
    pub public: bool,
    /// Column or embedded record.
    pub kind: FieldKind,
}

impl FieldDef {
    /// Returns whether the field has a scan target and a value slot.
    ///
    /// This is the rule [`Record::targets`] and [`Record::values`] follow:
    /// public, not excluded by its tag, and not the table marker.
    #[must_use]
    pub fn is_mapped(&self) -> bool {
        self.public
            && self.name != TABLE_FIELD
            && !self.tag.is_some_and(crate::tag::is_excluded)
    }
}

/// A record type mapped to one table.
///
/// `targets` and `values` must list exactly the fields for which
/// [`FieldDef::is_mapped`] holds, in declaration order, with embedded records
/// flattened in place. `#[derive(Record)]` upholds this.
pub trait Record: 'static {
    /// The type's own name; the default table name.
    const NAME: &'static str;

    /// Declared fields, in declaration order.
    fn fields() -> &'static [FieldDef];

    /// Mutable scan destinations of the mapped fields.
    fn targets(&mut self) -> Vec<&mut dyn Scan>;

    /// Current values of the mapped fields.
    fn values(&self) -> Vec<SqlValue>;
}
