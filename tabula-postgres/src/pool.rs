use crate::PostgresConnection;
use std::sync::Arc;
use tabula_core::{Connection, Context, Executor, Invocation, QueryResult, Result, Statement};
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

/// Settings of a [`PostgresPool`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub url: String,
    /// Maximum number of connections checked out at the same time.
    pub max_size: usize,
}

impl PoolConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_size: 10,
        }
    }

    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size.max(1);
        self
    }
}

struct PoolInner {
    config: PoolConfig,
    idle: Mutex<Vec<PostgresConnection>>,
    permits: Arc<Semaphore>,
}

/// Bounded set of reusable [`PostgresConnection`]s.
///
/// Cloning is cheap, all clones share the same connections.
#[derive(Clone)]
pub struct PostgresPool {
    inner: Arc<PoolInner>,
}

impl PostgresPool {
    /// Create the pool and establish its first connection.
    pub async fn open(config: PoolConfig) -> Result<Self> {
        let connection = PostgresConnection::connect(&config.url).await?;
        let permits = Arc::new(Semaphore::new(config.max_size));
        Ok(Self {
            inner: Arc::new(PoolInner {
                config,
                idle: Mutex::new(vec![connection]),
                permits,
            }),
        })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Check out a connection, waiting while `max_size` of them are in use.
    pub async fn acquire(&self) -> Result<PooledConnection> {
        let permit = self
            .inner
            .permits
            .clone()
            .acquire_owned()
            .await
            .context("The pool was closed")?;
        let idle = loop {
            let Some(connection) = self.inner.idle.lock().await.pop() else {
                break None;
            };
            if !connection.is_closed() {
                break Some(connection);
            }
            log::debug!("Dropping a closed connection from the pool");
        };
        let connection = match idle {
            Some(connection) => connection,
            None => PostgresConnection::connect(&self.inner.config.url).await?,
        };
        Ok(PooledConnection {
            connection,
            pool: self.inner.clone(),
            transaction: false,
            _permit: permit,
        })
    }

    /// Check out a connection wrapped in a fresh [`Invocation`].
    pub async fn invoke(&self) -> Result<Invocation<PooledConnection>> {
        Ok(Invocation::new(self.acquire().await?))
    }

    /// Connections ready to be handed out without connecting.
    pub async fn idle_count(&self) -> usize {
        self.inner.idle.lock().await.len()
    }

    /// Drop the idle connections and refuse further checkouts.
    pub async fn close(&self) {
        self.inner.permits.close();
        self.inner.idle.lock().await.clear();
    }
}

/// A [`PostgresConnection`] on loan from a [`PostgresPool`].
pub struct PooledConnection {
    connection: PostgresConnection,
    pool: Arc<PoolInner>,
    transaction: bool,
    _permit: OwnedSemaphorePermit,
}

impl PooledConnection {
    pub fn in_transaction(&self) -> bool {
        self.transaction
    }
}

impl Executor for PooledConnection {
    async fn execute(&mut self, statement: Statement) -> Result<QueryResult> {
        let effect = transaction_effect(&statement.sql);
        let result = self.connection.execute(statement).await?;
        if let Some(transaction) = effect {
            self.transaction = transaction;
        }
        Ok(result)
    }
}

/// Whether a successful `sql` leaves the session inside a transaction, `None`
/// when it does not change the transaction status. A failed statement changes
/// nothing, so a connection whose COMMIT failed is not reused.
fn transaction_effect(sql: &str) -> Option<bool> {
    let mut words = sql
        .split(|c: char| c.is_whitespace() || c == ';')
        .filter(|v| !v.is_empty());
    let first = words.next()?;
    if first.eq_ignore_ascii_case("BEGIN") || first.eq_ignore_ascii_case("START") {
        Some(true)
    } else if first.eq_ignore_ascii_case("ROLLBACK") {
        match words.next() {
            Some(v) if v.eq_ignore_ascii_case("TO") => None,
            _ => Some(false),
        }
    } else if ["COMMIT", "END", "ABORT"]
        .iter()
        .any(|v| first.eq_ignore_ascii_case(v))
    {
        Some(false)
    } else {
        None
    }
}

impl Connection for PooledConnection {
    /// Return the connection to the idle list, unless it still has an open
    /// transaction or the session is gone, in which case it is dropped.
    ///
    /// Transactions are tracked from the statements sent through this
    /// connection (`BEGIN`, `START TRANSACTION`, `COMMIT`, `ROLLBACK` and their
    /// aliases), including raw ones passed to [`Invocation::exec`]. A transaction
    /// opened any other way is not seen.
    async fn release(self) -> Result<()> {
        if self.transaction {
            log::warn!("Released a connection with an open transaction, dropping it");
            return Ok(());
        }
        if self.connection.is_closed() || self.pool.permits.is_closed() {
            return Ok(());
        }
        self.pool.idle.lock().await.push(self.connection);
        Ok(())
    }
}
