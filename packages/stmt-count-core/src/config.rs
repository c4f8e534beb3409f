//! Statement count evaluation configuration.

use serde::Deserialize;

use crate::error::CountError;

/// Lowest ordering precedence; the listener's after hook runs first.
pub const LOWEST_PRECEDENCE: i32 = i32::MAX;

/// Configuration for statement count evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CountConfig {
    /// Flush the persistence context before evaluating when a transaction is active
    pub flush_before_evaluation: bool,
    /// Include the observed SQL of failing kinds in failure messages
    pub report_statements: bool,
    /// Maximum statements listed per failing kind (the rest are summarised)
    pub max_reported_statements: usize,
    /// Ordering priority among test listeners
    pub order: i32,
}

impl Default for CountConfig {
    fn default() -> Self {
        Self {
            flush_before_evaluation: true,
            report_statements: true,
            max_reported_statements: 20,
            order: LOWEST_PRECEDENCE,
        }
    }
}

impl CountConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, CountError> {
        serde_json::from_str(json).map_err(|e| CountError::Config(e.to_string()))
    }

    /// Returns the per-kind statement cap used when rendering failures.
    ///
    /// `None` when statements are not reported at all.
    pub fn statement_limit(&self) -> Option<usize> {
        self.report_statements.then_some(self.max_reported_statements)
    }
}
