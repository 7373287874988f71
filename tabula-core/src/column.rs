use crate::{Record, Result, Value};

/// Metadata for one mapped field: the column name and how the column takes
/// part in generated statements.
///
/// The accessors resolve the field by name through the instance's [`Record`]
/// implementation, so the same descriptor works for any instance of the mapped
/// type.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnDescriptor {
    name: &'static str,
    /// Member of the primary key.
    pub primary_key: bool,
    /// Generated by the database on insert.
    pub serial: bool,
    /// Never written by insert or update statements.
    pub read_only: bool,
}

impl ColumnDescriptor {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            primary_key: false,
            serial: false,
            read_only: false,
        }
    }

    pub const fn primary_key(mut self, value: bool) -> Self {
        self.primary_key = value;
        self
    }

    pub const fn serial(mut self, value: bool) -> Self {
        self.serial = value;
        self
    }

    pub const fn read_only(mut self, value: bool) -> Self {
        self.read_only = value;
        self
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Read the field value from `instance`.
    pub fn get<R: Record + ?Sized>(&self, instance: &R) -> Result<Value> {
        instance.field_value(self.name)
    }

    /// Write `value` into the field of `instance`.
    pub fn set<R: Record + ?Sized>(&self, instance: &mut R, value: Value) -> Result<()> {
        instance.set_field(self.name, value)
    }
}
