use serde::{Deserialize, Serialize};

use crate::statement::StatementKind;

/// Statement counts a test method declares it expects.
///
/// A field left as `None` is not checked. `Some(0)` asserts that no
/// statement of that kind ran.
///
/// ```
/// use stmt_count_core::ExpectedCount;
///
/// const LOAD_AUTHOR: ExpectedCount = ExpectedCount::new().selects(1).updates(0);
/// assert_eq!(LOAD_AUTHOR.inserts, None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectedCount {
    pub selects: Option<usize>,
    pub inserts: Option<usize>,
    pub updates: Option<usize>,
    pub deletes: Option<usize>,
}

impl ExpectedCount {
    /// Creates a declaration that checks nothing.
    pub const fn new() -> Self {
        Self {
            selects: None,
            inserts: None,
            updates: None,
            deletes: None,
        }
    }

    pub const fn selects(mut self, count: usize) -> Self {
        self.selects = Some(count);
        self
    }

    pub const fn inserts(mut self, count: usize) -> Self {
        self.inserts = Some(count);
        self
    }

    pub const fn updates(mut self, count: usize) -> Self {
        self.updates = Some(count);
        self
    }

    pub const fn deletes(mut self, count: usize) -> Self {
        self.deletes = Some(count);
        self
    }

    /// Builds a declaration from integers where any negative value means
    /// "not checked".
    pub fn from_sentinels(selects: i64, inserts: i64, updates: i64, deletes: i64) -> Self {
        let checked = |value: i64| usize::try_from(value).ok();
        Self {
            selects: checked(selects),
            inserts: checked(inserts),
            updates: checked(updates),
            deletes: checked(deletes),
        }
    }

    /// Returns the declared count for `kind`, if checked.
    pub fn expected(&self, kind: StatementKind) -> Option<usize> {
        match kind {
            StatementKind::Select => self.selects,
            StatementKind::Insert => self.inserts,
            StatementKind::Update => self.updates,
            StatementKind::Delete => self.deletes,
        }
    }

    /// Returns `true` if no kind is checked.
    pub fn is_unchecked(&self) -> bool {
        StatementKind::ALL.iter().all(|kind| self.expected(*kind).is_none())
    }
}
