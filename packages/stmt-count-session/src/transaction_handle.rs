use crate::error::SessionError;
use crate::session::Session;

/// RAII guard for a session transaction with auto-rollback on drop.
///
/// If the transaction is not explicitly committed, it is rolled back when
/// the guard is dropped.
#[derive(Debug)]
pub struct SessionTransaction<'a> {
    session: &'a Session,
    /// Whether to roll back on drop
    auto_rollback: bool,
}

impl<'a> SessionTransaction<'a> {
    pub(crate) fn new(session: &'a Session) -> Self {
        Self {
            session,
            auto_rollback: true,
        }
    }

    /// Returns the session this transaction belongs to.
    pub fn session(&self) -> &'a Session {
        self.session
    }

    /// Flushes and commits the transaction.
    pub fn commit(mut self) -> Result<(), SessionError> {
        self.auto_rollback = false;
        self.session.commit()
    }

    /// Rolls the transaction back.
    pub fn rollback(mut self) -> Result<(), SessionError> {
        self.auto_rollback = false;
        self.session.rollback()
    }
}

impl Drop for SessionTransaction<'_> {
    fn drop(&mut self) {
        if self.auto_rollback && self.session.is_transaction_active() {
            if let Err(e) = self.session.rollback() {
                tracing::error!("Automatic rollback failed: {}", e);
            }
        }
    }
}
