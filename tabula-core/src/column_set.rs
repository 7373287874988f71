use crate::{ColumnDescriptor, MappingError, Record, Result, Value};
use std::{collections::HashMap, slice};

/// Ordered column metadata of one mapped type.
///
/// The order of `all` is the registration order and drives the order of column
/// names, positional tokens and parameter values in every generated statement.
/// Filters never mutate the receiver, they build a new set that keeps the
/// relative order of the retained columns.
#[derive(Default, Debug, Clone)]
pub struct ColumnSet {
    all: Vec<ColumnDescriptor>,
    lookup: HashMap<&'static str, usize>,
}

static NO_COLUMN: ColumnDescriptor = ColumnDescriptor::new("");

impl ColumnSet {
    /// Build a set from the descriptors of a type.
    ///
    /// # Panics
    /// When two descriptors share a name. Registration happens once per type,
    /// use [`ColumnSet::try_from_iter`] to handle the error instead.
    pub fn new(columns: impl IntoIterator<Item = ColumnDescriptor>) -> Self {
        match Self::try_from_iter(columns) {
            Ok(v) => v,
            Err(e) => panic!("{e:#}"),
        }
    }

    pub fn try_from_iter(columns: impl IntoIterator<Item = ColumnDescriptor>) -> Result<Self> {
        let mut result = Self::default();
        result.add_many(columns)?;
        Ok(result)
    }

    /// Append a column.
    pub fn add(&mut self, column: ColumnDescriptor) -> Result<&mut Self> {
        if self.lookup.contains_key(column.name()) {
            return Err(MappingError::DuplicateColumn(column.name()).into());
        }
        self.lookup.insert(column.name(), self.all.len());
        self.all.push(column);
        Ok(self)
    }

    /// Append every column, stopping at the first duplicate name.
    pub fn add_many(
        &mut self,
        columns: impl IntoIterator<Item = ColumnDescriptor>,
    ) -> Result<&mut Self> {
        for column in columns {
            self.add(column)?;
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// First column, or the empty descriptor when the set is empty.
    pub fn first(&self) -> &ColumnDescriptor {
        self.all.first().unwrap_or(&NO_COLUMN)
    }

    pub fn get(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.lookup.get(name).map(|i| &self.all[*i])
    }

    /// Mutable access to the flags of a column, the name cannot change.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ColumnDescriptor> {
        self.lookup.get(name).map(|i| &mut self.all[*i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    pub fn iter(&self) -> slice::Iter<'_, ColumnDescriptor> {
        self.all.iter()
    }

    pub fn as_slice(&self) -> &[ColumnDescriptor] {
        &self.all
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.all.iter().map(ColumnDescriptor::name).collect()
    }

    /// Field values of `instance`, one per column.
    pub fn values<R: Record + ?Sized>(&self, instance: &R) -> Result<Vec<Value>> {
        self.all.iter().map(|c| c.get(instance)).collect()
    }

    /// Positional placeholders `$1`, `$2`, ... one per column.
    pub fn tokens(&self) -> Vec<String> {
        let mut buffer = itoa::Buffer::new();
        (1..=self.all.len())
            .map(|i| {
                let mut token = String::with_capacity(4);
                token.push('$');
                token.push_str(buffer.format(i));
                token
            })
            .collect()
    }

    /// Columns satisfying `predicate`, keeping their order.
    pub fn filter(&self, predicate: impl Fn(&ColumnDescriptor) -> bool) -> ColumnSet {
        let all: Vec<_> = self.all.iter().copied().filter(|c| predicate(c)).collect();
        let lookup = all.iter().enumerate().map(|(i, c)| (c.name(), i)).collect();
        ColumnSet { all, lookup }
    }

    pub fn primary_key(&self) -> ColumnSet {
        self.filter(|c| c.primary_key)
    }

    pub fn not_primary_key(&self) -> ColumnSet {
        self.filter(|c| !c.primary_key)
    }

    pub fn serial(&self) -> ColumnSet {
        self.filter(|c| c.serial)
    }

    pub fn not_serial(&self) -> ColumnSet {
        self.filter(|c| !c.serial)
    }

    pub fn read_only(&self) -> ColumnSet {
        self.filter(|c| c.read_only)
    }

    pub fn not_read_only(&self) -> ColumnSet {
        self.filter(|c| !c.read_only)
    }

    /// Columns written by an insert.
    pub fn insert_columns(&self) -> ColumnSet {
        self.not_read_only().not_serial()
    }

    /// Columns written by an update.
    pub fn update_columns(&self) -> ColumnSet {
        self.not_read_only().not_serial().not_primary_key()
    }
}

impl PartialEq for ColumnSet {
    fn eq(&self, other: &Self) -> bool {
        self.all == other.all
    }
}

impl Eq for ColumnSet {}

impl<'a> IntoIterator for &'a ColumnSet {
    type Item = &'a ColumnDescriptor;
    type IntoIter = slice::Iter<'a, ColumnDescriptor>;
    fn into_iter(self) -> Self::IntoIter {
        self.all.iter()
    }
}
