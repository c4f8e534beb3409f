use serde::Serialize;

use crate::config::CountConfig;
use crate::error::CountError;
use crate::statement::StatementKind;
use crate::statistics::StatementStatistics;

use super::expected::ExpectedCount;
use super::failure::StatementCountFailure;

/// Outcome of comparing one statement kind against its declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// No count was declared for this kind
    Unchecked,
    /// The declared count equals the observed count
    Matched,
    /// The declared count differs from the observed count
    Mismatched,
}

/// Observed statements of one kind paired with the declared count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionResult {
    kind: StatementKind,
    statements: Vec<String>,
    expected: Option<usize>,
}

impl AssertionResult {
    pub fn new(kind: StatementKind, statements: Vec<String>, expected: Option<usize>) -> Self {
        Self {
            kind,
            statements,
            expected,
        }
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn expected(&self) -> Option<usize> {
        self.expected
    }

    /// Number of statements observed.
    pub fn actual(&self) -> usize {
        self.statements.len()
    }

    pub fn verdict(&self) -> Verdict {
        match self.expected {
            None => Verdict::Unchecked,
            Some(expected) if expected == self.actual() => Verdict::Matched,
            Some(_) => Verdict::Mismatched,
        }
    }
}

/// The assertion results of one test method, validated together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionResultSet {
    results: Vec<AssertionResult>,
}

impl AssertionResultSet {
    pub fn new(results: Vec<AssertionResult>) -> Self {
        Self { results }
    }

    /// Pairs every statement kind recorded in `statistics` with its declared count.
    pub fn evaluate(statistics: &StatementStatistics, expected: &ExpectedCount) -> Self {
        let results = StatementKind::ALL
            .iter()
            .map(|&kind| AssertionResult::new(kind, statistics.statements(kind), expected.expected(kind)))
            .collect();
        Self::new(results)
    }

    pub fn results(&self) -> &[AssertionResult] {
        &self.results
    }

    /// Returns every mismatching result, in evaluation order.
    pub fn failures(&self) -> impl Iterator<Item = &AssertionResult> {
        self.results
            .iter()
            .filter(|result| result.verdict() == Verdict::Mismatched)
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Validates with the default configuration.
    pub fn validate(&self) -> Result<(), CountError> {
        self.validate_with(&CountConfig::default())
    }

    /// Checks every result and reports all mismatches in one error.
    pub fn validate_with(&self, config: &CountConfig) -> Result<(), CountError> {
        let failure = StatementCountFailure::from_results(self.failures(), config.statement_limit());
        if failure.is_empty() {
            return Ok(());
        }
        Err(CountError::AssertionFailed(failure))
    }
}
