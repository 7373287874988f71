mod batch;
mod keyed;
mod ledger;
mod people;
mod raw;
mod transaction;

use crate::{
    batch::batch, keyed::keyed, ledger::ledger, people::people, raw::raw,
    transaction::transaction,
};
use log::LevelFilter;
use std::env;
use tabula::{Connection, Invocation, Result};

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Run every scenario, `connect` must hand out a new session on each call
/// (at least two can be alive at the same time).
pub async fn execute_tests<C, F>(connect: F)
where
    C: Connection,
    F: AsyncFn() -> Result<C>,
{
    let mut invocation = Invocation::new(connect().await.expect("Could not connect"));
    people(&mut invocation).await;
    ledger(&mut invocation).await;
    keyed(&mut invocation).await;
    batch(&mut invocation).await;
    raw(&mut invocation).await;
    invocation
        .close()
        .await
        .expect("Could not close the invocation");
    transaction(&connect).await;
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
