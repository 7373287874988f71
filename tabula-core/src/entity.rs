use crate::{ColumnSet, MappingError, Result, RowLabeled, Value};

/// Registered metadata of a mapped type: the type tag, the table it maps to and
/// its columns.
#[derive(Debug)]
pub struct TableMeta {
    /// Type tag, usually the Rust type name.
    pub type_name: &'static str,
    /// Table name, written as is in the generated statements.
    pub table: &'static str,
    pub columns: ColumnSet,
}

impl TableMeta {
    pub fn new(type_name: &'static str, table: &'static str, columns: ColumnSet) -> Self {
        Self {
            type_name,
            table,
            columns,
        }
    }
}

/// Name-indexed field access of a mapped instance.
///
/// Object safe, so batches of records can be handled as `&mut dyn Record`.
/// Usually implemented through `#[derive(Entity)]`.
pub trait Record: Send + Sync {
    /// Metadata of the runtime type of this record.
    fn table(&self) -> &'static TableMeta;

    /// Current value of the field mapped to `column`.
    fn field_value(&self, column: &str) -> Result<Value>;

    /// Assign the field mapped to `column`.
    fn set_field(&mut self, column: &str, value: Value) -> Result<()>;
}

/// A mapped type that can also be constructed when reading rows.
pub trait Entity: Record + Default + Sized {
    fn table_meta() -> &'static TableMeta;

    fn table_name() -> &'static str {
        Self::table_meta().table
    }

    fn columns() -> &'static ColumnSet {
        &Self::table_meta().columns
    }

    /// New instance with the `columns` values of `row` bound onto it.
    fn from_row(row: &RowLabeled, columns: &ColumnSet) -> Result<Self> {
        let mut entity = Self::default();
        bind_row(&mut entity, row, columns)?;
        Ok(entity)
    }
}

/// Table name registered for `E`.
pub fn table_name_for<E: Entity>() -> &'static str {
    E::table_name()
}

/// Columns registered for `E`.
pub fn columns_for<E: Entity>() -> &'static ColumnSet {
    E::columns()
}

/// Write the value of every column of `columns` found in `row` into `record`.
pub fn bind_row<R: Record + ?Sized>(
    record: &mut R,
    row: &RowLabeled,
    columns: &ColumnSet,
) -> Result<()> {
    for column in columns {
        let value = row
            .get_column(column.name())
            .ok_or(MappingError::MissingColumn(column.name()))?;
        column.set(record, value.clone())?;
    }
    Ok(())
}

/// Error for a column name that the type does not map.
pub fn unknown_column(type_name: &'static str, column: &str) -> crate::Error {
    MappingError::UnknownColumn {
        type_name,
        column: column.into(),
    }
    .into()
}
