//! Shared fixtures for integration tests.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;
use stmt_count_core::{CountError, StatementStatistics};
use stmt_count_listener::{
    ApplicationContext, ListenerChain, StatementCountTestListener, TestContext,
    TestExecutionListener, TestMethod,
};
use stmt_count_session::Session;

/// Installs a test-writer subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Opens a session transaction before each test and rolls it back after.
pub struct TransactionalTestListener {
    session: Arc<Session>,
    rollbacks: Mutex<usize>,
}

impl TransactionalTestListener {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            rollbacks: Mutex::new(0),
        }
    }

    pub fn rollbacks(&self) -> usize {
        *self.rollbacks.lock()
    }
}

impl TestExecutionListener for TransactionalTestListener {
    fn name(&self) -> &str {
        "transactional"
    }

    fn order(&self) -> i32 {
        4000
    }

    fn before_test_method(&self, _context: &TestContext) -> Result<(), CountError> {
        self.session.begin().map_err(|e| CountError::Listener {
            listener: self.name().to_string(),
            message: e.to_string(),
        })
    }

    fn after_test_method(&self, _context: &TestContext) -> Result<(), CountError> {
        if !self.session.is_transaction_active() {
            return Ok(());
        }
        self.session.rollback().map_err(|e| CountError::Listener {
            listener: self.name().to_string(),
            message: e.to_string(),
        })?;
        *self.rollbacks.lock() += 1;
        Ok(())
    }
}

/// Recorder, session and listener chain wired the way a test suite would.
pub struct Harness {
    pub statistics: Arc<StatementStatistics>,
    pub session: Arc<Session>,
    pub transactional: Option<Arc<TransactionalTestListener>>,
    pub chain: ListenerChain,
    application_context: Arc<ApplicationContext>,
}

impl Harness {
    /// Every test runs inside a transaction that is rolled back afterwards.
    pub fn transactional() -> Self {
        Self::build(true)
    }

    /// Tests manage their own transactions.
    pub fn non_transactional() -> Self {
        Self::build(false)
    }

    fn build(transactional: bool) -> Self {
        init_tracing();

        let statistics = StatementStatistics::shared();
        let session = Arc::new(Session::with_observer(statistics.clone()));
        seed_library(&session);

        let application_context =
            Arc::new(ApplicationContext::new().with_persistence_context(session.clone()));

        let mut chain = ListenerChain::new().with(Arc::new(StatementCountTestListener::new(
            statistics.clone(),
            session.clone(),
        )));
        let transactional = transactional.then(|| {
            let listener = Arc::new(TransactionalTestListener::new(session.clone()));
            chain.register(listener.clone());
            listener
        });

        Self {
            statistics,
            session,
            transactional,
            chain,
            application_context,
        }
    }

    /// Runs `body` as the test method `method`.
    pub fn run<R>(
        &self,
        method: TestMethod,
        body: impl FnOnce(&Session) -> R,
    ) -> Result<R, CountError> {
        let context = TestContext::new(method, self.application_context.clone());
        let session: &Session = &self.session;
        self.chain.run(&context, |_| body(session))
    }
}

/// Three authors, each with one book.
fn seed_library(session: &Session) {
    let authors = [(1, "Herbert", 11), (2, "Austen", 12), (3, "Le Guin", 13)];
    for (id, name, book_id) in authors {
        session.seed("authors", id, json!({"name": name, "book_id": book_id}));
        session.seed("books", book_id, json!({"title": format!("{name}'s book"), "author_id": id}));
    }
}
