mod as_value;
mod column;
mod column_set;
mod connection;
mod entity;
mod error;
mod invocation;
mod query;
mod statement;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use column::*;
pub use column_set::*;
pub use connection::*;
pub use entity::*;
pub use error::*;
pub use invocation::*;
pub use query::*;
pub use statement::*;
pub use util::*;
pub use value::*;
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
