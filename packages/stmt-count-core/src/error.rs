//! Statement counting error types.

use thiserror::Error;

use crate::assertion::StatementCountFailure;

/// Errors raised while evaluating statement counts.
#[derive(Error, Debug, Clone)]
pub enum CountError {
    /// One or more statement kinds did not match the declared count
    #[error("{0}")]
    AssertionFailed(StatementCountFailure),

    /// Flushing the persistence context failed
    #[error("Flush failed: {0}")]
    FlushFailed(String),

    /// A transaction is active but no persistence context is registered
    #[error("No persistence context registered for test '{test}'")]
    PersistenceContextUnavailable { test: String },

    /// Another lifecycle listener failed
    #[error("Listener '{listener}' failed: {message}")]
    Listener { listener: String, message: String },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CountError {
    /// Returns the assertion failure if this error is one.
    pub fn as_assertion_failure(&self) -> Option<&StatementCountFailure> {
        match self {
            CountError::AssertionFailed(failure) => Some(failure),
            _ => None,
        }
    }
}
