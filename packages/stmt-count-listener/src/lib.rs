//! Test lifecycle hooks that assert SQL statement counts.
//!
//! A [`StatementCountTestListener`] resets the shared recorder before each
//! test method and, for methods declaring an
//! [`ExpectedCount`](stmt_count_core::ExpectedCount), flushes the
//! persistence context and validates the observed counts afterwards.

pub mod chain;
pub mod context;
pub mod count_listener;
pub mod listener;

pub use chain::ListenerChain;
pub use context::{ApplicationContext, TestContext, TestMethod};
pub use count_listener::StatementCountTestListener;
pub use listener::{TestExecutionListener, HIGHEST_PRECEDENCE, LOWEST_PRECEDENCE};
