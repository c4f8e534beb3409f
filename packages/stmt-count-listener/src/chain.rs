//! Ordered sequence of test lifecycle listeners.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use stmt_count_core::CountError;

use crate::context::TestContext;
use crate::listener::TestExecutionListener;

/// Runs registered listeners around a test body.
///
/// Before hooks run in ascending order, after hooks in descending order.
/// Listeners with equal order keep their registration order.
#[derive(Default)]
pub struct ListenerChain {
    listeners: Vec<Arc<dyn TestExecutionListener>>,
}

impl ListenerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener.
    pub fn register(&mut self, listener: Arc<dyn TestExecutionListener>) {
        self.listeners.push(listener);
        self.listeners.sort_by_key(|listener| listener.order());
    }

    /// Registers a listener, builder style.
    pub fn with(mut self, listener: Arc<dyn TestExecutionListener>) -> Self {
        self.register(listener);
        self
    }

    /// Listener names in before-hook order.
    pub fn names(&self) -> Vec<&str> {
        self.listeners.iter().map(|listener| listener.name()).collect()
    }

    /// Runs every before hook, stopping at the first failure.
    pub fn before_test_method(&self, context: &TestContext) -> Result<(), CountError> {
        for listener in &self.listeners {
            listener.before_test_method(context)?;
        }
        Ok(())
    }

    /// Runs every after hook and returns the first failure.
    pub fn after_test_method(&self, context: &TestContext) -> Result<(), CountError> {
        let mut first_error = None;
        for listener in self.listeners.iter().rev() {
            if let Err(e) = listener.after_test_method(context) {
                tracing::error!(
                    "Listener {} failed after {}: {}",
                    listener.name(),
                    context.test_method().name(),
                    e
                );
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Runs `body` between the before and after hooks.
    ///
    /// When a before hook fails the body is skipped, the after hooks still
    /// run, and the before failure is returned. When the body panics the
    /// after hooks run before the panic resumes.
    pub fn run<F, R>(&self, context: &TestContext, body: F) -> Result<R, CountError>
    where
        F: FnOnce(&TestContext) -> R,
    {
        if let Err(e) = self.before_test_method(context) {
            if let Err(after) = self.after_test_method(context) {
                tracing::warn!(
                    "Discarding after hook failure for {} in favour of before hook failure ({}): {}",
                    context.test_method().name(),
                    e,
                    after
                );
            }
            return Err(e);
        }

        match panic::catch_unwind(AssertUnwindSafe(|| body(context))) {
            Ok(output) => {
                self.after_test_method(context)?;
                Ok(output)
            }
            Err(payload) => {
                if let Err(after) = self.after_test_method(context) {
                    tracing::warn!(
                        "Test {} panicked, after hook failure discarded: {}",
                        context.test_method().name(),
                        after
                    );
                }
                panic::resume_unwind(payload)
            }
        }
    }
}

impl std::fmt::Debug for ListenerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerChain")
            .field("listeners", &self.names())
            .finish()
    }
}
