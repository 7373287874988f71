use crate::{QueryResult, Result, Statement};
use futures::TryFutureExt;
use std::future::Future;

pub trait Executor: Send {
    /// Send one statement with its positional parameters and collect the outcome.
    ///
    /// Driver failures are returned as produced by the driver, without retries.
    fn execute(&mut self, statement: Statement) -> impl Future<Output = Result<QueryResult>> + Send;
}

/// A single database session checked out for exclusive use.
///
/// Transaction control defaults to plain `BEGIN`/`COMMIT`/`ROLLBACK` statements
/// sent through [`Executor::execute`], so they are scoped to this session.
pub trait Connection: Executor + Sized {
    fn begin(&mut self) -> impl Future<Output = Result<()>> + Send {
        self.execute("BEGIN".into()).map_ok(|_| ())
    }

    fn commit(&mut self) -> impl Future<Output = Result<()>> + Send {
        self.execute("COMMIT".into()).map_ok(|_| ())
    }

    fn rollback(&mut self) -> impl Future<Output = Result<()>> + Send {
        self.execute("ROLLBACK".into()).map_ok(|_| ())
    }

    /// Give the session back to where it came from (usually a pool).
    fn release(self) -> impl Future<Output = Result<()>> + Send;
}
