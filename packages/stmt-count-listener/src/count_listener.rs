//! Listener resetting, flushing and validating statement counts.

use std::sync::Arc;

use stmt_count_core::{
    AssertionResultSet, CountConfig, CountError, ExpectedCount, StatementStatistics,
    TransactionProbe,
};

use crate::context::TestContext;
use crate::listener::TestExecutionListener;

/// Asserts per-test SQL statement counts.
///
/// Runs with [`LOWEST_PRECEDENCE`](crate::LOWEST_PRECEDENCE) by default, so
/// its after hook runs before a transactional listener rolls back and the
/// pending writes can still be flushed.
pub struct StatementCountTestListener {
    statistics: Arc<StatementStatistics>,
    transaction_probe: Arc<dyn TransactionProbe>,
    config: CountConfig,
}

impl StatementCountTestListener {
    /// Creates a listener with the default configuration.
    ///
    /// # Arguments
    /// * `statistics` - Recorder fed by the SQL instrumentation
    /// * `transaction_probe` - Reports whether the test's transaction is open
    pub fn new(
        statistics: Arc<StatementStatistics>,
        transaction_probe: Arc<dyn TransactionProbe>,
    ) -> Self {
        Self::with_config(statistics, transaction_probe, CountConfig::default())
    }

    pub fn with_config(
        statistics: Arc<StatementStatistics>,
        transaction_probe: Arc<dyn TransactionProbe>,
        config: CountConfig,
    ) -> Self {
        Self {
            statistics,
            transaction_probe,
            config,
        }
    }

    pub fn statistics(&self) -> &Arc<StatementStatistics> {
        &self.statistics
    }

    pub fn config(&self) -> &CountConfig {
        &self.config
    }

    /// Flushes buffered writes so they are counted, if a transaction is open.
    fn flush_existing_persistence_context(&self, context: &TestContext) -> Result<(), CountError> {
        if !self.config.flush_before_evaluation {
            return Ok(());
        }
        if !self.transaction_probe.is_active() {
            tracing::debug!(
                "No active transaction for {}, skipping flush",
                context.test_method().name()
            );
            return Ok(());
        }

        let persistence_context = context
            .application_context()
            .persistence_context()
            .ok_or_else(|| CountError::PersistenceContextUnavailable {
                test: context.test_method().name().to_string(),
            })?;
        tracing::debug!(
            "Flushing persistence context for {}",
            context.test_method().name()
        );
        persistence_context.flush()
    }

    fn evaluate(&self, context: &TestContext, expected: &ExpectedCount) -> Result<(), CountError> {
        let results = AssertionResultSet::evaluate(&self.statistics, expected);
        match results.validate_with(&self.config) {
            Ok(()) => {
                tracing::debug!(
                    "Statement counts of {} match {:?}",
                    context.test_method().name(),
                    expected
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    "Statement counts of {} do not match: {}",
                    context.test_method().name(),
                    e
                );
                Err(e)
            }
        }
    }
}

impl TestExecutionListener for StatementCountTestListener {
    fn name(&self) -> &str {
        "statement-count"
    }

    fn order(&self) -> i32 {
        self.config.order
    }

    fn before_test_method(&self, context: &TestContext) -> Result<(), CountError> {
        tracing::debug!(
            "Resetting statement statistics for {}",
            context.test_method().name()
        );
        self.statistics.reset();
        Ok(())
    }

    fn after_test_method(&self, context: &TestContext) -> Result<(), CountError> {
        let Some(expected) = context.test_method().expected_count() else {
            return Ok(());
        };

        self.flush_existing_persistence_context(context)?;
        self.evaluate(context, expected)
    }
}

impl std::fmt::Debug for StatementCountTestListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementCountTestListener")
            .field("statistics", &self.statistics)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
