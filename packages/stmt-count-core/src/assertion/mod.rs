//! Expected-count declarations and their aggregated evaluation.

mod expected;
mod failure;
mod result;

pub use expected::ExpectedCount;
pub use failure::{KindMismatch, StatementCountFailure};
pub use result::{AssertionResult, AssertionResultSet, Verdict};
