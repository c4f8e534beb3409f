//! Collaborators the test listener depends on.

use crate::error::CountError;

/// A unit of work that buffers writes until flushed.
pub trait PersistenceContext: Send + Sync {
    /// Emits every pending write as SQL now.
    fn flush(&self) -> Result<(), CountError>;
}

/// Reports whether a transaction is currently open for the running test.
pub trait TransactionProbe: Send + Sync {
    fn is_active(&self) -> bool;
}

/// Transaction probe backed by a closure, for test doubles.
pub struct FnProbe<F>(F);

/// Wraps `f` as a [`TransactionProbe`].
pub fn probe_fn<F>(f: F) -> FnProbe<F>
where
    F: Fn() -> bool + Send + Sync,
{
    FnProbe(f)
}

impl<F> TransactionProbe for FnProbe<F>
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_active(&self) -> bool {
        (self.0)()
    }
}
