use std::fmt;

use serde::Serialize;

use crate::statement::StatementKind;

use super::result::AssertionResult;

/// One statement kind whose observed count differs from its declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindMismatch {
    pub kind: StatementKind,
    pub expected: usize,
    pub actual: usize,
    /// Observed SQL, possibly truncated
    pub statements: Vec<String>,
    /// Observed statements left out of `statements`; zero when statements
    /// are not reported
    pub omitted: usize,
}

/// Aggregated statement count assertion failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementCountFailure {
    mismatches: Vec<KindMismatch>,
}

impl StatementCountFailure {
    /// Collects mismatching results, keeping at most `limit` statements each.
    ///
    /// A `None` limit leaves the statements out entirely.
    pub(crate) fn from_results<'a>(
        results: impl Iterator<Item = &'a AssertionResult>,
        limit: Option<usize>,
    ) -> Self {
        let mismatches = results
            .filter_map(|result| {
                let expected = result.expected()?;
                let statements: Vec<String> = match limit {
                    Some(limit) => result.statements().iter().take(limit).cloned().collect(),
                    None => Vec::new(),
                };
                let omitted = limit.map_or(0, |_| result.actual() - statements.len());
                Some(KindMismatch {
                    kind: result.kind(),
                    expected,
                    actual: result.actual(),
                    statements,
                    omitted,
                })
            })
            .collect();
        Self { mismatches }
    }

    pub fn mismatches(&self) -> &[KindMismatch] {
        &self.mismatches
    }

    pub fn mismatch(&self, kind: StatementKind) -> Option<&KindMismatch> {
        self.mismatches.iter().find(|m| m.kind == kind)
    }

    /// Kinds that failed, in evaluation order.
    pub fn kinds(&self) -> Vec<StatementKind> {
        self.mismatches.iter().map(|m| m.kind).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }
}

impl fmt::Display for StatementCountFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Statement count assertion failed for {} statement kind(s):",
            self.mismatches.len()
        )?;
        for mismatch in &self.mismatches {
            write!(
                f,
                "\n  {}: expected {}, actual {}",
                mismatch.kind, mismatch.expected, mismatch.actual
            )?;
            for sql in &mismatch.statements {
                write!(f, "\n    {sql}")?;
            }
            if mismatch.omitted > 0 {
                write!(f, "\n    ... {} more", mismatch.omitted)?;
            }
        }
        Ok(())
    }
}
