use crate::{ColumnDescriptor, ColumnSet, Record, Result, Value, separated_by};
use std::fmt::{self, Display};

/// SQL text together with its ordered positional parameters.
///
/// Tokens are only ever written by [`Statement::push_param`], which appends the
/// value and the matching `$n` in the same step, so the n-th token always refers
/// to `params[n - 1]`.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append `value` as the next parameter and write its token into `out`.
    fn push_param_into(params: &mut Vec<Value>, out: &mut String, value: Value) {
        params.push(value);
        let mut buffer = itoa::Buffer::new();
        out.push('$');
        out.push_str(buffer.format(params.len()));
    }

    /// Append `value` as the next parameter and write its token at the end of the SQL.
    pub fn push_param(&mut self, value: Value) -> &mut Self {
        Self::push_param_into(&mut self.params, &mut self.sql, value);
        self
    }

    fn write_identifier(out: &mut String, value: &str) {
        out.push('"');
        for c in value.chars() {
            if c == '"' {
                out.push('"');
            }
            out.push(c);
        }
        out.push('"');
    }

    /// Table names may be schema qualified, every part is quoted separately.
    fn write_table(&mut self, table: &str) {
        separated_by(
            &mut self.sql,
            table.split('.'),
            |out, part| Self::write_identifier(out, part),
            ".",
        );
    }

    fn write_names<'a>(out: &mut String, columns: impl IntoIterator<Item = &'a ColumnDescriptor>) {
        separated_by(
            out,
            columns,
            |out, c| Self::write_identifier(out, c.name()),
            ", ",
        );
    }

    /// `k1 = $i AND k2 = $j`, one parameter per key.
    fn write_conditions(
        &mut self,
        keys: &ColumnSet,
        values: impl IntoIterator<Item = Value>,
    ) {
        let params = &mut self.params;
        separated_by(
            &mut self.sql,
            keys.iter().zip(values),
            |out, (column, value)| {
                Self::write_identifier(out, column.name());
                out.push_str(" = ");
                Self::push_param_into(params, out, value);
            },
            " AND ",
        );
    }

    /// Names and tokens of `columns` for an insert, parameters read from `record`.
    fn write_insert<R: Record + ?Sized>(
        &mut self,
        table: &str,
        columns: &ColumnSet,
        record: &R,
    ) -> Result<()> {
        self.sql.push_str("INSERT INTO ");
        self.write_table(table);
        if columns.is_empty() {
            self.sql.push_str(" DEFAULT VALUES");
            return Ok(());
        }
        let mut names = String::with_capacity(columns.len() * 16);
        let mut tokens = String::with_capacity(columns.len() * 4);
        for column in columns {
            if !names.is_empty() {
                names.push_str(", ");
                tokens.push_str(", ");
            }
            Self::write_identifier(&mut names, column.name());
            Self::push_param_into(&mut self.params, &mut tokens, column.get(record)?);
        }
        self.sql.push_str(" (");
        self.sql.push_str(&names);
        self.sql.push_str(") VALUES (");
        self.sql.push_str(&tokens);
        self.sql.push(')');
        Ok(())
    }

    fn write_returning(&mut self, returning: Option<&ColumnDescriptor>) {
        if let Some(column) = returning {
            self.sql.push_str(" RETURNING ");
            Self::write_identifier(&mut self.sql, column.name());
        }
    }

    /// `SELECT <columns> FROM <table> WHERE k1 = $1 AND ...`
    ///
    /// `key_values` must hold one value per key column, in key order.
    pub fn select(
        table: &str,
        columns: &ColumnSet,
        keys: &ColumnSet,
        key_values: impl IntoIterator<Item = Value>,
    ) -> Self {
        let mut result = Self::select_all(table, columns);
        result.sql.push_str(" WHERE ");
        result.write_conditions(keys, key_values);
        result
    }

    /// `SELECT <columns> FROM <table>`
    pub fn select_all(table: &str, columns: &ColumnSet) -> Self {
        let mut result = Self::new(String::with_capacity(128));
        result.sql.push_str("SELECT ");
        if columns.is_empty() {
            result.sql.push('*');
        } else {
            Self::write_names(&mut result.sql, columns);
        }
        result.sql.push_str(" FROM ");
        result.write_table(table);
        result
    }

    /// `INSERT INTO <table> (<columns>) VALUES (<tokens>) [RETURNING <column>]`
    pub fn insert<R: Record + ?Sized>(
        table: &str,
        columns: &ColumnSet,
        record: &R,
        returning: Option<&ColumnDescriptor>,
    ) -> Result<Self> {
        let mut result = Self::new(String::with_capacity(128));
        result.write_insert(table, columns, record)?;
        result.write_returning(returning);
        Ok(result)
    }

    /// `UPDATE <table> SET c1 = $1, ... WHERE k1 = $n AND ...`
    pub fn update<R: Record + ?Sized>(
        table: &str,
        columns: &ColumnSet,
        keys: &ColumnSet,
        record: &R,
    ) -> Result<Self> {
        let mut result = Self::new(String::with_capacity(128));
        result.sql.push_str("UPDATE ");
        result.write_table(table);
        result.sql.push_str(" SET ");
        let mut assignments = String::with_capacity(columns.len() * 20);
        for column in columns {
            if !assignments.is_empty() {
                assignments.push_str(", ");
            }
            Self::write_identifier(&mut assignments, column.name());
            assignments.push_str(" = ");
            Self::push_param_into(&mut result.params, &mut assignments, column.get(record)?);
        }
        result.sql.push_str(&assignments);
        result.sql.push_str(" WHERE ");
        let key_values = keys.values(record)?;
        result.write_conditions(keys, key_values);
        Ok(result)
    }

    /// `INSERT ... ON CONFLICT (<keys>) DO UPDATE SET c = EXCLUDED.c, ... [RETURNING <column>]`
    ///
    /// Falls back to `DO NOTHING` when `update_columns` is empty.
    pub fn upsert<R: Record + ?Sized>(
        table: &str,
        insert_columns: &ColumnSet,
        update_columns: &ColumnSet,
        keys: &ColumnSet,
        record: &R,
        returning: Option<&ColumnDescriptor>,
    ) -> Result<Self> {
        let mut result = Self::new(String::with_capacity(256));
        result.write_insert(table, insert_columns, record)?;
        result.sql.push_str(" ON CONFLICT (");
        Self::write_names(&mut result.sql, keys);
        result.sql.push(')');
        if update_columns.is_empty() {
            result.sql.push_str(" DO NOTHING");
        } else {
            result.sql.push_str(" DO UPDATE SET ");
            separated_by(
                &mut result.sql,
                update_columns,
                |out, column| {
                    Self::write_identifier(out, column.name());
                    out.push_str(" = EXCLUDED.");
                    Self::write_identifier(out, column.name());
                },
                ", ",
            );
        }
        result.write_returning(returning);
        Ok(result)
    }

    /// `DELETE FROM <table> WHERE k1 = $1 AND ...`
    pub fn delete<R: Record + ?Sized>(table: &str, keys: &ColumnSet, record: &R) -> Result<Self> {
        let mut result = Self::new(String::with_capacity(64));
        result.sql.push_str("DELETE FROM ");
        result.write_table(table);
        result.sql.push_str(" WHERE ");
        let key_values = keys.values(record)?;
        result.write_conditions(keys, key_values);
        Ok(result)
    }

    /// `TRUNCATE <table> [RESTART IDENTITY]`
    pub fn truncate(table: &str, restart_identity: bool) -> Self {
        let mut result = Self::new(String::with_capacity(64));
        result.sql.push_str("TRUNCATE ");
        result.write_table(table);
        if restart_identity {
            result.sql.push_str(" RESTART IDENTITY");
        }
        result
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

impl From<&str> for Statement {
    fn from(value: &str) -> Self {
        Statement::new(value)
    }
}

impl From<String> for Statement {
    fn from(value: String) -> Self {
        Statement::new(value)
    }
}
