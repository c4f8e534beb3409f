//! Session error types.

use thiserror::Error;

/// Unit of work errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A write or flush was attempted outside a transaction
    #[error("No active transaction")]
    NoActiveTransaction,

    /// `begin` was called while a transaction is open
    #[error("Transaction already active")]
    TransactionAlreadyActive,

    /// Entity not found
    #[error("Entity {id} not found in table '{table}'")]
    EntityNotFound { table: String, id: u64 },

    /// Entity already exists
    #[error("Entity {id} already exists in table '{table}'")]
    DuplicateEntity { table: String, id: u64 },
}
