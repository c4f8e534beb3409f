use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use stmt_count_core::{
    CountError, PersistenceContext, StatementInspector, StatementObserver, TransactionProbe,
};

use crate::change::PendingWrite;
use crate::error::SessionError;
use crate::transaction_handle::SessionTransaction;

/// Entity payload stored by the session.
pub type Row = Value;

type Tables = HashMap<String, BTreeMap<u64, Row>>;

/// Transaction-local state: a working copy of the tables plus staged writes.
#[derive(Debug, Default)]
struct ActiveTransaction {
    working: Tables,
    pending: Vec<PendingWrite>,
}

#[derive(Debug, Default)]
struct SessionState {
    committed: Tables,
    transaction: Option<ActiveTransaction>,
    /// Entities loaded or staged in the current unit of work
    cache: HashMap<(String, u64), Row>,
}

impl SessionState {
    fn visible_tables(&self) -> &Tables {
        match &self.transaction {
            Some(transaction) => &transaction.working,
            None => &self.committed,
        }
    }

    fn transaction_mut(&mut self) -> Result<&mut ActiveTransaction, SessionError> {
        self.transaction
            .as_mut()
            .ok_or(SessionError::NoActiveTransaction)
    }

    /// Returns the most recent staged write for an entity.
    fn staged(&self, table: &str, id: u64) -> Option<&PendingWrite> {
        self.transaction
            .as_ref()?
            .pending
            .iter()
            .rev()
            .find(|write| write.table() == table && write.id() == id)
    }

    fn is_staged_for_delete(&self, table: &str, id: u64) -> bool {
        matches!(self.staged(table, id), Some(PendingWrite::Delete { .. }))
    }

    fn exists(&self, table: &str, id: u64) -> bool {
        match self.staged(table, id) {
            Some(PendingWrite::Delete { .. }) => false,
            Some(_) => true,
            None => {
                self.cache.contains_key(&(table.to_string(), id))
                    || self
                        .visible_tables()
                        .get(table)
                        .is_some_and(|rows| rows.contains_key(&id))
            }
        }
    }
}

/// In-memory unit of work.
///
/// Committed rows are only replaced on [`commit`](Session::commit). Inside a
/// transaction, writes are staged and reach the transaction's working copy
/// on [`flush`](Session::flush), which is also when their SQL is reported.
/// A query against a table with staged writes flushes them first.
#[derive(Debug)]
pub struct Session {
    inspector: StatementInspector,
    state: Mutex<SessionState>,
}

impl Session {
    /// Creates an empty session reporting statements through `inspector`.
    pub fn new(inspector: StatementInspector) -> Self {
        Self {
            inspector,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Creates an empty session reporting statements to `observer`.
    pub fn with_observer(observer: Arc<dyn StatementObserver>) -> Self {
        Self::new(StatementInspector::new(observer))
    }

    pub fn inspector(&self) -> &StatementInspector {
        &self.inspector
    }

    /// Stores a committed row directly, without emitting SQL.
    pub fn seed(&self, table: &str, id: u64, row: Row) {
        self.state
            .lock()
            .committed
            .entry(table.to_string())
            .or_default()
            .insert(id, row);
    }

    /// Opens a transaction over a working copy of the committed rows.
    pub fn begin(&self) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        if state.transaction.is_some() {
            return Err(SessionError::TransactionAlreadyActive);
        }

        let working = state.committed.clone();
        state.transaction = Some(ActiveTransaction {
            working,
            pending: Vec::new(),
        });
        state.cache.clear();

        self.inspector.inspect("begin");
        tracing::info!("Session transaction started");
        Ok(())
    }

    /// Opens a transaction that rolls back when the guard is dropped.
    pub fn transaction(&self) -> Result<SessionTransaction<'_>, SessionError> {
        self.begin()?;
        Ok(SessionTransaction::new(self))
    }

    /// Loads an entity by id.
    ///
    /// Entities already in the unit of work are returned without SQL.
    pub fn find(&self, table: &str, id: u64) -> Option<Row> {
        let mut state = self.state.lock();
        let key = (table.to_string(), id);
        if let Some(row) = state.cache.get(&key) {
            return Some(row.clone());
        }
        if state.is_staged_for_delete(table, id) {
            return None;
        }

        self.flush_before_query(&mut state, table);
        self.inspector
            .inspect(&format!("select * from {table} where id = {id}"));
        let row = state
            .visible_tables()
            .get(table)
            .and_then(|rows| rows.get(&id))
            .cloned()?;
        state.cache.insert(key, row.clone());
        Some(row)
    }

    /// Loads every flushed entity of a table, ordered by id.
    ///
    /// Always issues a query. Entities already in the unit of work take
    /// precedence over the loaded rows.
    pub fn find_all(&self, table: &str) -> Vec<(u64, Row)> {
        let mut state = self.state.lock();
        self.flush_before_query(&mut state, table);
        self.inspector.inspect(&format!("select * from {table}"));

        let loaded: Vec<(u64, Row)> = state
            .visible_tables()
            .get(table)
            .map(|rows| rows.iter().map(|(id, row)| (*id, row.clone())).collect())
            .unwrap_or_default();

        let mut result = Vec::with_capacity(loaded.len());
        for (id, row) in loaded {
            if state.is_staged_for_delete(table, id) {
                continue;
            }
            let row = state
                .cache
                .entry((table.to_string(), id))
                .or_insert(row)
                .clone();
            result.push((id, row));
        }
        result
    }

    /// Stages the insertion of a new entity.
    pub fn persist(&self, table: &str, id: u64, row: Row) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        if state.transaction.is_none() {
            return Err(SessionError::NoActiveTransaction);
        }
        if state.exists(table, id) {
            return Err(SessionError::DuplicateEntity {
                table: table.to_string(),
                id,
            });
        }

        state.cache.insert((table.to_string(), id), row.clone());
        state.transaction_mut()?.pending.push(PendingWrite::Insert {
            table: table.to_string(),
            id,
            row,
        });
        Ok(())
    }

    /// Stages new contents for an existing entity.
    pub fn update(&self, table: &str, id: u64, row: Row) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        if state.transaction.is_none() {
            return Err(SessionError::NoActiveTransaction);
        }
        if !state.exists(table, id) {
            return Err(SessionError::EntityNotFound {
                table: table.to_string(),
                id,
            });
        }

        state.cache.insert((table.to_string(), id), row.clone());
        state.transaction_mut()?.pending.push(PendingWrite::Update {
            table: table.to_string(),
            id,
            row,
        });
        Ok(())
    }

    /// Stages the deletion of an existing entity.
    pub fn remove(&self, table: &str, id: u64) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        if state.transaction.is_none() {
            return Err(SessionError::NoActiveTransaction);
        }
        if !state.exists(table, id) {
            return Err(SessionError::EntityNotFound {
                table: table.to_string(),
                id,
            });
        }

        state.cache.remove(&(table.to_string(), id));
        state.transaction_mut()?.pending.push(PendingWrite::Delete {
            table: table.to_string(),
            id,
        });
        Ok(())
    }

    /// Emits every staged write as SQL and applies it to the working copy.
    ///
    /// Returns the number of statements flushed.
    pub fn flush(&self) -> Result<usize, SessionError> {
        let mut state = self.state.lock();
        let flushed = self.flush_transaction(state.transaction_mut()?);
        tracing::debug!("Flushed {} pending writes", flushed);
        Ok(flushed)
    }

    /// Flushes every staged write if any of them targets `table`.
    fn flush_before_query(&self, state: &mut SessionState, table: &str) {
        let Some(transaction) = state.transaction.as_mut() else {
            return;
        };
        if !transaction.pending.iter().any(|write| write.table() == table) {
            return;
        }

        let flushed = self.flush_transaction(transaction);
        tracing::debug!("Auto-flushed {} pending writes before querying {}", flushed, table);
    }

    fn flush_transaction(&self, transaction: &mut ActiveTransaction) -> usize {
        let pending = std::mem::take(&mut transaction.pending);
        for write in &pending {
            self.inspector.inspect(&write.to_sql());
            apply(&mut transaction.working, write);
        }
        pending.len()
    }

    /// Flushes and publishes the working copy.
    pub fn commit(&self) -> Result<(), SessionError> {
        self.flush()?;

        let mut state = self.state.lock();
        let transaction = state
            .transaction
            .take()
            .ok_or(SessionError::NoActiveTransaction)?;
        state.committed = transaction.working;
        state.cache.clear();

        self.inspector.inspect("commit");
        tracing::info!("Session transaction committed");
        Ok(())
    }

    /// Discards staged writes and the working copy.
    pub fn rollback(&self) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        let transaction = state
            .transaction
            .take()
            .ok_or(SessionError::NoActiveTransaction)?;
        state.cache.clear();

        self.inspector.inspect("rollback");
        tracing::info!(
            "Session transaction rolled back, {} pending writes discarded",
            transaction.pending.len()
        );
        Ok(())
    }

    /// Detaches every entity, so the next lookups hit the store again.
    pub fn clear(&self) {
        self.state.lock().cache.clear();
    }

    pub fn is_transaction_active(&self) -> bool {
        self.state.lock().transaction.is_some()
    }

    /// Returns the number of writes staged but not yet flushed.
    pub fn pending_writes(&self) -> usize {
        self.state
            .lock()
            .transaction
            .as_ref()
            .map_or(0, |transaction| transaction.pending.len())
    }
}

fn apply(tables: &mut Tables, write: &PendingWrite) {
    match write {
        PendingWrite::Insert { table, id, row } | PendingWrite::Update { table, id, row } => {
            tables
                .entry(table.clone())
                .or_default()
                .insert(*id, row.clone());
        }
        PendingWrite::Delete { table, id } => {
            if let Some(rows) = tables.get_mut(table) {
                rows.remove(id);
            }
        }
    }
}

impl PersistenceContext for Session {
    fn flush(&self) -> Result<(), CountError> {
        Session::flush(self)
            .map(|_| ())
            .map_err(|e| CountError::FlushFailed(e.to_string()))
    }
}

impl TransactionProbe for Session {
    fn is_active(&self) -> bool {
        self.is_transaction_active()
    }
}
