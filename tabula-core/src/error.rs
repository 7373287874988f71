use thiserror::Error;

/// Errors detected from the mapping metadata, always raised before any
/// statement reaches the connection.
///
/// They travel inside [`crate::Error`], use `error.downcast_ref::<MappingError>()`
/// to inspect them. Driver failures are never converted into this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("invalid type `{0}`; no primary keys")]
    NoPrimaryKey(&'static str),

    #[error("type `{type_name}` has {expected} primary key column(s) but {actual} value(s) were supplied")]
    ArgumentCount {
        type_name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("createMany requires the objects to all be of the same type (found `{expected}` and `{found}`)")]
    MixedTypes {
        expected: &'static str,
        found: &'static str,
    },

    #[error("type `{type_name}` has no column `{column}`")]
    UnknownColumn {
        type_name: &'static str,
        column: String,
    },

    #[error("result row does not contain the column `{0}`")]
    MissingColumn(&'static str),

    #[error("column `{0}` is declared more than once")]
    DuplicateColumn(&'static str),

    #[error("a transaction is already active on this invocation")]
    TransactionActive,
}
