//! Per-test context handed to lifecycle listeners.

use std::fmt;
use std::sync::Arc;

use stmt_count_core::{ExpectedCount, PersistenceContext};

/// The test method being executed and its declared statement counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestMethod {
    name: String,
    expected_count: Option<ExpectedCount>,
}

impl TestMethod {
    /// Creates a test method without a statement count declaration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expected_count: None,
        }
    }

    /// Attaches a statement count declaration.
    pub fn expecting(mut self, expected_count: ExpectedCount) -> Self {
        self.expected_count = Some(expected_count);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expected_count(&self) -> Option<&ExpectedCount> {
        self.expected_count.as_ref()
    }
}

/// Shared collaborators available to every test of a suite.
#[derive(Clone, Default)]
pub struct ApplicationContext {
    persistence_context: Option<Arc<dyn PersistenceContext>>,
}

impl ApplicationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the persistence context flushed before evaluation.
    pub fn with_persistence_context(mut self, persistence_context: Arc<dyn PersistenceContext>) -> Self {
        self.persistence_context = Some(persistence_context);
        self
    }

    pub fn persistence_context(&self) -> Option<&Arc<dyn PersistenceContext>> {
        self.persistence_context.as_ref()
    }
}

impl fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationContext")
            .field("persistence_context", &self.persistence_context.is_some())
            .finish()
    }
}

/// Context of one test method execution.
#[derive(Debug, Clone)]
pub struct TestContext {
    test_method: TestMethod,
    application_context: Arc<ApplicationContext>,
}

impl TestContext {
    pub fn new(test_method: TestMethod, application_context: Arc<ApplicationContext>) -> Self {
        Self {
            test_method,
            application_context,
        }
    }

    pub fn test_method(&self) -> &TestMethod {
        &self.test_method
    }

    pub fn application_context(&self) -> &ApplicationContext {
        &self.application_context
    }
}
