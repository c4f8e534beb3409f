//! Bridge from raw SQL hooks to a statement observer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::statement::StatementKind;
use crate::statistics::StatementObserver;

/// Classifies SQL text handed over by an instrumentation hook and forwards
/// it to an observer.
///
/// Statements that are neither select, insert, update nor delete are not
/// forwarded; they only bump the ignored counter.
pub struct StatementInspector {
    observer: Arc<dyn StatementObserver>,
    ignored: AtomicUsize,
}

impl StatementInspector {
    /// Creates an inspector forwarding to `observer`.
    pub fn new(observer: Arc<dyn StatementObserver>) -> Self {
        Self {
            observer,
            ignored: AtomicUsize::new(0),
        }
    }

    /// Inspects one statement about to be executed and returns it unchanged.
    pub fn inspect<'a>(&self, sql: &'a str) -> &'a str {
        match StatementKind::classify(sql) {
            Some(kind) => self.observer.notify(kind, sql),
            None => {
                tracing::trace!("Ignoring unclassified statement: {}", sql);
                self.ignored.fetch_add(1, Ordering::Relaxed);
            }
        }
        sql
    }

    /// Returns how many statements were not forwarded.
    pub fn ignored(&self) -> usize {
        self.ignored.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for StatementInspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementInspector")
            .field("ignored", &self.ignored())
            .finish_non_exhaustive()
    }
}
