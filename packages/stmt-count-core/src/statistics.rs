//! Per-kind statement recorder.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::CountError;
use crate::statement::StatementKind;

/// Callback invoked by SQL instrumentation whenever a statement executes.
pub trait StatementObserver: Send + Sync {
    /// Records one executed statement of the given kind.
    fn notify(&self, kind: StatementKind, sql: &str);

    fn notify_select(&self, sql: &str) {
        self.notify(StatementKind::Select, sql);
    }

    fn notify_insert(&self, sql: &str) {
        self.notify(StatementKind::Insert, sql);
    }

    fn notify_update(&self, sql: &str) {
        self.notify(StatementKind::Update, sql);
    }

    fn notify_delete(&self, sql: &str) {
        self.notify(StatementKind::Delete, sql);
    }
}

/// Accumulates SQL text in four ordered buckets, one per statement kind.
///
/// Create one instance per test run and share it as an
/// `Arc<StatementStatistics>` between the SQL source and the test listener.
/// The listener resets it before every test method and reads it after.
/// Order is preserved within a kind, not across kinds.
///
/// Tests running in parallel must not share an instance.
#[derive(Debug, Default)]
pub struct StatementStatistics {
    buckets: RwLock<[Vec<String>; StatementKind::COUNT]>,
}

impl StatementStatistics {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty recorder ready to be shared.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Appends `sql` to the bucket for `kind`.
    pub fn record(&self, kind: StatementKind, sql: impl Into<String>) {
        let sql = sql.into();
        tracing::trace!("Recorded {} statement: {}", kind, sql);
        self.buckets.write()[kind.index()].push(sql);
    }

    /// Clears all four buckets.
    pub fn reset(&self) {
        let mut buckets = self.buckets.write();
        for bucket in buckets.iter_mut() {
            bucket.clear();
        }
    }

    /// Returns the statements of `kind` in the order they were observed.
    pub fn statements(&self, kind: StatementKind) -> Vec<String> {
        self.buckets.read()[kind.index()].clone()
    }

    pub fn select_statements(&self) -> Vec<String> {
        self.statements(StatementKind::Select)
    }

    pub fn insert_statements(&self) -> Vec<String> {
        self.statements(StatementKind::Insert)
    }

    pub fn update_statements(&self) -> Vec<String> {
        self.statements(StatementKind::Update)
    }

    pub fn delete_statements(&self) -> Vec<String> {
        self.statements(StatementKind::Delete)
    }

    /// Returns the number of statements recorded for `kind`.
    pub fn count(&self, kind: StatementKind) -> usize {
        self.buckets.read()[kind.index()].len()
    }

    /// Returns the number of statements recorded across all kinds.
    pub fn total(&self) -> usize {
        self.buckets.read().iter().map(Vec::len).sum()
    }

    /// Returns `true` if nothing has been recorded since the last reset.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Copies the current buckets into a serializable snapshot.
    pub fn snapshot(&self) -> StatisticsSnapshot {
        let buckets = self.buckets.read();
        StatisticsSnapshot {
            selects: buckets[StatementKind::Select.index()].clone(),
            inserts: buckets[StatementKind::Insert.index()].clone(),
            updates: buckets[StatementKind::Update.index()].clone(),
            deletes: buckets[StatementKind::Delete.index()].clone(),
        }
    }
}

impl StatementObserver for StatementStatistics {
    fn notify(&self, kind: StatementKind, sql: &str) {
        self.record(kind, sql);
    }
}

/// Point-in-time copy of a recorder's buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub selects: Vec<String>,
    pub inserts: Vec<String>,
    pub updates: Vec<String>,
    pub deletes: Vec<String>,
}

impl StatisticsSnapshot {
    /// Returns the statements of `kind`.
    pub fn statements(&self, kind: StatementKind) -> &[String] {
        match kind {
            StatementKind::Select => &self.selects,
            StatementKind::Insert => &self.inserts,
            StatementKind::Update => &self.updates,
            StatementKind::Delete => &self.deletes,
        }
    }

    /// Renders the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, CountError> {
        serde_json::to_string_pretty(self).map_err(|e| CountError::SerializationError(e.to_string()))
    }
}
