//! Tabula maps Rust structs to relational rows.
//!
//! A type describes its table and columns once (usually with
//! `#[derive(Entity)]`), an [`Invocation`] then generates and runs the
//! statements for it on a single connection:
//!
//! ```rust,ignore
//! use tabula::{Entity, Invocation};
//!
//! #[derive(Default, Entity)]
//! #[tabula(table = "people")]
//! struct Person {
//!     #[tabula(primary_key, serial)]
//!     id: i32,
//!     name: String,
//! }
//!
//! let mut invocation = Invocation::new(connection);
//! let mut person = Person { name: "Ada".into(), ..Default::default() };
//! invocation.create(&mut person).await?;
//! let found = invocation.get::<Person, _>([person.id]).await?;
//! invocation.close().await?;
//! ```
pub use tabula_core::*;
pub use tabula_macros::Entity;
