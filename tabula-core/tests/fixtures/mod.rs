#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, LazyLock, Mutex},
};
use tabula_core::{
    AsValue, ColumnDescriptor, ColumnSet, Connection, Entity, Error, Executor, QueryResult, Record,
    Result, RowLabeled, Statement, TableMeta, Value, unknown_column,
};

#[derive(Default, Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub owner: String,
    pub balance: i32,
    pub audit: Option<String>,
}

impl Record for Account {
    fn table(&self) -> &'static TableMeta {
        Self::table_meta()
    }
    fn field_value(&self, column: &str) -> Result<Value> {
        Ok(match column {
            "id" => self.id.as_value(),
            "owner" => self.owner.clone().as_value(),
            "balance" => self.balance.as_value(),
            "audit" => self.audit.clone().as_value(),
            _ => return Err(unknown_column(Self::table_meta().type_name, column)),
        })
    }
    fn set_field(&mut self, column: &str, value: Value) -> Result<()> {
        match column {
            "id" => self.id = AsValue::try_from_value(value)?,
            "owner" => self.owner = AsValue::try_from_value(value)?,
            "balance" => self.balance = AsValue::try_from_value(value)?,
            "audit" => self.audit = AsValue::try_from_value(value)?,
            _ => return Err(unknown_column(Self::table_meta().type_name, column)),
        }
        Ok(())
    }
}

impl Entity for Account {
    fn table_meta() -> &'static TableMeta {
        static META: LazyLock<TableMeta> = LazyLock::new(|| {
            TableMeta::new(
                "Account",
                "accounts",
                ColumnSet::new([
                    ColumnDescriptor::new("id").primary_key(true).serial(true),
                    ColumnDescriptor::new("owner"),
                    ColumnDescriptor::new("balance"),
                    ColumnDescriptor::new("audit").read_only(true),
                ]),
            )
        });
        &META
    }
}

/// Composite key, schema qualified table.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Pair {
    pub a: i32,
    pub b: String,
    pub note: String,
}

impl Record for Pair {
    fn table(&self) -> &'static TableMeta {
        Self::table_meta()
    }
    fn field_value(&self, column: &str) -> Result<Value> {
        Ok(match column {
            "a" => self.a.as_value(),
            "b" => self.b.clone().as_value(),
            "note" => self.note.clone().as_value(),
            _ => return Err(unknown_column(Self::table_meta().type_name, column)),
        })
    }
    fn set_field(&mut self, column: &str, value: Value) -> Result<()> {
        match column {
            "a" => self.a = AsValue::try_from_value(value)?,
            "b" => self.b = AsValue::try_from_value(value)?,
            "note" => self.note = AsValue::try_from_value(value)?,
            _ => return Err(unknown_column(Self::table_meta().type_name, column)),
        }
        Ok(())
    }
}

impl Entity for Pair {
    fn table_meta() -> &'static TableMeta {
        static META: LazyLock<TableMeta> = LazyLock::new(|| {
            TableMeta::new(
                "Pair",
                "ledger.pairs",
                ColumnSet::new([
                    ColumnDescriptor::new("a").primary_key(true),
                    ColumnDescriptor::new("b").primary_key(true),
                    ColumnDescriptor::new("note"),
                ]),
            )
        });
        &META
    }
}

/// No primary key.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Loose {
    pub label: String,
}

impl Record for Loose {
    fn table(&self) -> &'static TableMeta {
        Self::table_meta()
    }
    fn field_value(&self, column: &str) -> Result<Value> {
        match column {
            "label" => Ok(self.label.clone().as_value()),
            _ => Err(unknown_column(Self::table_meta().type_name, column)),
        }
    }
    fn set_field(&mut self, column: &str, value: Value) -> Result<()> {
        match column {
            "label" => self.label = AsValue::try_from_value(value)?,
            _ => return Err(unknown_column(Self::table_meta().type_name, column)),
        }
        Ok(())
    }
}

impl Entity for Loose {
    fn table_meta() -> &'static TableMeta {
        static META: LazyLock<TableMeta> = LazyLock::new(|| {
            TableMeta::new("Loose", "loose", ColumnSet::new([ColumnDescriptor::new("label")]))
        });
        &META
    }
}

/// Only a primary key, nothing to update.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct OnlyKey {
    pub code: String,
}

impl Record for OnlyKey {
    fn table(&self) -> &'static TableMeta {
        Self::table_meta()
    }
    fn field_value(&self, column: &str) -> Result<Value> {
        match column {
            "code" => Ok(self.code.clone().as_value()),
            _ => Err(unknown_column(Self::table_meta().type_name, column)),
        }
    }
    fn set_field(&mut self, column: &str, value: Value) -> Result<()> {
        match column {
            "code" => self.code = AsValue::try_from_value(value)?,
            _ => return Err(unknown_column(Self::table_meta().type_name, column)),
        }
        Ok(())
    }
}

impl Entity for OnlyKey {
    fn table_meta() -> &'static TableMeta {
        static META: LazyLock<TableMeta> = LazyLock::new(|| {
            TableMeta::new(
                "OnlyKey",
                "only_key",
                ColumnSet::new([ColumnDescriptor::new("code").primary_key(true)]),
            )
        });
        &META
    }
}

#[derive(Default, Debug)]
pub struct Log {
    pub statements: Vec<Statement>,
    pub responses: VecDeque<QueryResult>,
    pub failures: VecDeque<String>,
    pub released: bool,
}

impl Log {
    pub fn sql(&self) -> Vec<&str> {
        self.statements.iter().map(|s| s.sql.as_str()).collect()
    }
}

/// Connection that records every statement and answers from a queue.
#[derive(Default, Clone)]
pub struct Recorder {
    pub log: Arc<Mutex<Log>>,
}

impl Recorder {
    pub fn respond(&self, result: QueryResult) -> &Self {
        self.log.lock().unwrap().responses.push_back(result);
        self
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.log.lock().unwrap().failures.push_back(message.into());
        self
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.log.lock().unwrap().statements.clone()
    }

    pub fn sql(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .sql()
            .into_iter()
            .map(Into::into)
            .collect()
    }

    pub fn released(&self) -> bool {
        self.log.lock().unwrap().released
    }
}

impl Executor for Recorder {
    async fn execute(&mut self, statement: Statement) -> Result<QueryResult> {
        let mut log = self.log.lock().unwrap();
        log.statements.push(statement);
        if let Some(message) = log.failures.pop_front() {
            return Err(Error::msg(message));
        }
        Ok(log.responses.pop_front().unwrap_or_default())
    }
}

impl Connection for Recorder {
    async fn release(self) -> Result<()> {
        self.log.lock().unwrap().released = true;
        Ok(())
    }
}

/// Result returning `rows`, one per item.
pub fn rows(labels: &[&str], rows: impl IntoIterator<Item = Vec<Value>>) -> QueryResult {
    let labels: Arc<[String]> = labels.iter().map(|v| v.to_string()).collect();
    let rows: Vec<_> = rows
        .into_iter()
        .map(|values| RowLabeled::new(labels.clone(), values.into()))
        .collect();
    QueryResult {
        rows_affected: rows.len() as u64,
        rows,
    }
}

pub fn affected(rows_affected: u64) -> QueryResult {
    QueryResult {
        rows_affected,
        rows: Vec::new(),
    }
}
