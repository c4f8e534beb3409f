//! Core types for counting SQL statements during a test method.
//!
//! Provides the statement recorder, SQL classification, expected-count
//! declarations and the aggregated assertion over them.

pub mod assertion;
pub mod capability;
pub mod config;
pub mod error;
pub mod inspector;
pub mod statement;
pub mod statistics;

pub use assertion::{
    AssertionResult, AssertionResultSet, ExpectedCount, KindMismatch, StatementCountFailure,
    Verdict,
};
pub use capability::{probe_fn, FnProbe, PersistenceContext, TransactionProbe};
pub use config::{CountConfig, LOWEST_PRECEDENCE};
pub use error::CountError;
pub use inspector::StatementInspector;
pub use statement::StatementKind;
pub use statistics::{StatementObserver, StatementStatistics, StatisticsSnapshot};
