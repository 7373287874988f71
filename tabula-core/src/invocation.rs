use crate::{
    Connection, Entity, MappingError, QueryResult, Record, Result, RowsAffected, Statement,
    TableMeta, Value, truncate_long,
};

/// Empty parameter list for [`Invocation::exec`] and [`Invocation::query`].
pub const NO_PARAMS: [Value; 0] = [];

/// Transaction state of an [`Invocation`].
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Every statement is its own implicit unit of work.
    #[default]
    Idle,
    /// Statements join the transaction opened by `begin`.
    Active,
}

/// Unit of work bound to one connection.
///
/// Every statement issued through the same invocation runs on the same
/// connection, so a transaction opened with [`Invocation::begin`] covers all of
/// them until [`Invocation::commit`] or [`Invocation::rollback`].
///
/// Mapping errors (missing primary key, wrong key count, mixed batch) are
/// returned before anything is sent. Driver errors are returned unchanged, an
/// open transaction stays open until the caller rolls it back.
pub struct Invocation<C: Connection> {
    connection: C,
    state: TransactionState,
}

impl<C: Connection> Invocation<C> {
    pub fn new(connection: C) -> Self {
        Self {
            connection,
            state: TransactionState::Idle,
        }
    }

    /// Run `f` on a new invocation and close it afterwards, whether `f` succeeded or not.
    pub async fn scoped<T, F>(connection: C, f: F) -> Result<T>
    where
        F: AsyncFnOnce(&mut Invocation<C>) -> Result<T>,
    {
        let mut invocation = Self::new(connection);
        let result = f(&mut invocation).await;
        let closed = invocation.close().await;
        match (result, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(..), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_error)) => {
                log::error!("While closing after a failure: {:#}", close_error);
                Err(e)
            }
        }
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn in_transaction(&self) -> bool {
        self.state == TransactionState::Active
    }

    pub fn connection(&mut self) -> &mut C {
        &mut self.connection
    }

    async fn run(&mut self, statement: Statement) -> Result<QueryResult> {
        log::debug!(
            "{} ({} parameters)",
            truncate_long!(statement.sql),
            statement.params.len()
        );
        self.connection.execute(statement).await
    }

    /// Run a statement, discarding its result.
    pub async fn exec<P>(&mut self, sql: &str, params: P) -> Result<()>
    where
        P: IntoIterator,
        P::Item: Into<Value>,
    {
        self.query(sql, params).await.map(|_| ())
    }

    /// Run a statement and return its rows.
    pub async fn query<P>(&mut self, sql: &str, params: P) -> Result<QueryResult>
    where
        P: IntoIterator,
        P::Item: Into<Value>,
    {
        let statement = Statement {
            sql: sql.into(),
            params: params.into_iter().map(Into::into).collect(),
        };
        self.run(statement).await
    }

    pub async fn begin(&mut self) -> Result<()> {
        if self.in_transaction() {
            return Err(MappingError::TransactionActive.into());
        }
        self.connection.begin().await?;
        self.state = TransactionState::Active;
        Ok(())
    }

    pub async fn commit(&mut self) -> Result<()> {
        if !self.in_transaction() {
            log::warn!("Commit requested while no transaction is active");
        }
        self.connection.commit().await?;
        self.state = TransactionState::Idle;
        Ok(())
    }

    pub async fn rollback(&mut self) -> Result<()> {
        if !self.in_transaction() {
            log::warn!("Rollback requested while no transaction is active");
        }
        self.connection.rollback().await?;
        self.state = TransactionState::Idle;
        Ok(())
    }

    /// Release the connection, the invocation cannot be used afterwards.
    pub async fn close(self) -> Result<()> {
        if self.in_transaction() {
            log::warn!("Closing an invocation with an open transaction");
        }
        self.connection.release().await
    }

    /// Row of `E` identified by `keys` (in primary key order), `None` if it does not exist.
    pub async fn get<E, K>(&mut self, keys: K) -> Result<Option<E>>
    where
        E: Entity,
        K: IntoIterator,
        K::Item: Into<Value>,
    {
        let meta = E::table_meta();
        let primary_key = primary_key(meta)?;
        let keys: Vec<Value> = keys.into_iter().map(Into::into).collect();
        if keys.len() != primary_key.len() {
            return Err(MappingError::ArgumentCount {
                type_name: meta.type_name,
                expected: primary_key.len(),
                actual: keys.len(),
            }
            .into());
        }
        let columns = meta.columns.not_read_only();
        let statement = Statement::select(meta.table, &columns, &primary_key, keys);
        let result = self.run(statement).await?;
        result
            .first()
            .map(|row| E::from_row(row, &columns))
            .transpose()
    }

    /// Every row of `E`, in the order returned by the database.
    pub async fn get_all<E: Entity>(&mut self) -> Result<Vec<E>> {
        let meta = E::table_meta();
        let statement = Statement::select_all(meta.table, &meta.columns.not_read_only());
        self.run(statement).await?.bind_all()
    }

    /// Insert `record`, the generated value of its first serial column is written back.
    pub async fn create<R: Record + ?Sized>(&mut self, record: &mut R) -> Result<()> {
        let meta = record.table();
        let columns = meta.columns.insert_columns();
        let serial = meta.columns.serial();
        let returning = (!serial.is_empty()).then(|| *serial.first());
        let statement = Statement::insert(meta.table, &columns, &*record, returning.as_ref())?;
        let result = self.run(statement).await?;
        if let Some(column) = returning {
            result.bind_returning(record, &column)?;
        }
        Ok(())
    }

    /// Insert every record in order. All records must have the same mapped type,
    /// otherwise nothing is sent.
    pub async fn create_many<'a, R, I>(&mut self, records: I) -> Result<()>
    where
        R: Record + ?Sized + 'a,
        I: IntoIterator<Item = &'a mut R>,
    {
        let records: Vec<&mut R> = records.into_iter().collect();
        if let Some(first) = records.first() {
            let expected = first.table().type_name;
            if let Some(other) = records
                .iter()
                .map(|r| r.table().type_name)
                .find(|v| *v != expected)
            {
                return Err(MappingError::MixedTypes {
                    expected,
                    found: other,
                }
                .into());
            }
        }
        for record in records {
            self.create(record).await?;
        }
        Ok(())
    }

    /// Update the row identified by the primary key of `record`. Primary key
    /// columns are not assigned.
    pub async fn update<R: Record + ?Sized>(&mut self, record: &R) -> Result<RowsAffected> {
        let meta = record.table();
        let primary_key = primary_key(meta)?;
        let columns = meta.columns.update_columns();
        if columns.is_empty() {
            log::debug!("`{}` has no updatable columns", meta.type_name);
            return Ok(RowsAffected::default());
        }
        let statement = Statement::update(meta.table, &columns, &primary_key, record)?;
        Ok((&self.run(statement).await?).into())
    }

    /// Insert `record` or, when its primary key already exists, update it, in a single statement.
    ///
    /// Serial columns that are part of the primary key are written too, otherwise
    /// the conflict on the key could never be detected. A record whose serial key
    /// is still unassigned (NULL or zero) has no row yet and is created instead,
    /// so the database generates its key.
    pub async fn upsert<R: Record + ?Sized>(&mut self, record: &mut R) -> Result<()> {
        let meta = record.table();
        let primary_key = primary_key(meta)?;
        for column in primary_key.serial().iter() {
            if is_unassigned(&column.get(&*record)?) {
                log::debug!(
                    "`{}` has no generated key yet, creating it",
                    meta.type_name
                );
                return self.create(record).await;
            }
        }
        let serial = meta.columns.serial();
        let returning = (!serial.is_empty()).then(|| *serial.first());
        let statement = Statement::upsert(
            meta.table,
            &meta
                .columns
                .not_read_only()
                .filter(|c| !c.serial || c.primary_key),
            &meta.columns.update_columns(),
            &primary_key,
            &*record,
            returning.as_ref(),
        )?;
        let result = self.run(statement).await?;
        if let Some(column) = returning {
            result.bind_returning(record, &column)?;
        }
        Ok(())
    }

    /// Delete the row identified by the primary key of `record`.
    pub async fn delete<R: Record + ?Sized>(&mut self, record: &R) -> Result<RowsAffected> {
        let meta = record.table();
        let primary_key = primary_key(meta)?;
        let statement = Statement::delete(meta.table, &primary_key, record)?;
        Ok((&self.run(statement).await?).into())
    }

    /// Remove every row of `E`, restarting the identity when it has a serial column.
    pub async fn truncate<E: Entity>(&mut self) -> Result<()> {
        let meta = E::table_meta();
        let statement = Statement::truncate(meta.table, !meta.columns.serial().is_empty());
        self.run(statement).await.map(|_| ())
    }
}

fn is_unassigned(value: &Value) -> bool {
    value.is_null()
        || matches!(
            value,
            Value::Int16(Some(0)) | Value::Int32(Some(0)) | Value::Int64(Some(0))
        )
}

fn primary_key(meta: &TableMeta) -> Result<crate::ColumnSet> {
    let result = meta.columns.primary_key();
    if result.is_empty() {
        return Err(MappingError::NoPrimaryKey(meta.type_name).into());
    }
    Ok(result)
}
