use crate::{ColumnDescriptor, Entity, MappingError, Record, Value};
use std::sync::Arc;

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
}

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Row) -> Self {
        Self { labels, values }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values[i])
    }
}

/// Outcome of one statement: the affected row count and the returned rows.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub rows_affected: u64,
    pub rows: Vec<RowLabeled>,
}

impl QueryResult {
    /// Number of rows returned, or affected when the statement returned none.
    pub fn row_count(&self) -> u64 {
        if self.rows.is_empty() {
            self.rows_affected
        } else {
            self.rows.len() as u64
        }
    }

    pub fn rows(&self) -> &[RowLabeled] {
        &self.rows
    }

    pub fn first(&self) -> Option<&RowLabeled> {
        self.rows.first()
    }

    /// Values of `column` across all rows, `Value::Null` where it is missing.
    pub fn column(&self, column: &str) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| row.get_column(column).cloned().unwrap_or_default())
            .collect()
    }

    /// First row bound into a new `E`, `None` when there are no rows.
    pub fn bind_one<E: Entity>(&self) -> crate::Result<Option<E>> {
        let columns = E::columns().not_read_only();
        self.rows
            .first()
            .map(|row| E::from_row(row, &columns))
            .transpose()
    }

    /// Every row bound into a new `E`.
    pub fn bind_all<E: Entity>(&self) -> crate::Result<Vec<E>> {
        let columns = E::columns().not_read_only();
        self.rows
            .iter()
            .map(|row| E::from_row(row, &columns))
            .collect()
    }

    /// Write `column` of the first returned row into `record`, if a row was returned.
    pub fn bind_returning<R: Record + ?Sized>(
        &self,
        record: &mut R,
        column: &ColumnDescriptor,
    ) -> crate::Result<()> {
        if let Some(row) = self.rows.first() {
            let value = row
                .get_column(column.name())
                .ok_or(MappingError::MissingColumn(column.name()))?;
            column.set(record, value.clone())?;
        }
        Ok(())
    }
}

impl From<RowsAffected> for QueryResult {
    fn from(value: RowsAffected) -> Self {
        QueryResult {
            rows_affected: value.rows_affected,
            rows: Vec::new(),
        }
    }
}

impl From<&QueryResult> for RowsAffected {
    fn from(value: &QueryResult) -> Self {
        RowsAffected {
            rows_affected: value.rows_affected,
        }
    }
}
