//! Listener ordering and per-test recorder isolation.

use std::panic::{self, AssertUnwindSafe};

use ntest::timeout;
use serde_json::json;
use stmt_count_core::{ExpectedCount, StatementKind};
use stmt_count_listener::TestMethod;

use super::helpers::Harness;

#[timeout(1000)]
#[test]
fn test_count_listener_runs_after_hook_first() {
    let harness = Harness::transactional();
    assert_eq!(harness.chain.names(), vec!["transactional", "statement-count"]);
}

#[timeout(1000)]
#[test]
fn test_statistics_reset_between_methods() {
    let harness = Harness::transactional();

    harness
        .run(TestMethod::new("first"), |session| {
            session.find_all("authors");
            session.find_all("books");
        })
        .unwrap();
    assert_eq!(harness.statistics.count(StatementKind::Select), 2);

    harness
        .run(
            TestMethod::new("second").expecting(ExpectedCount::new().selects(1)),
            |session| {
                session.find("authors", 1);
            },
        )
        .unwrap();
}

#[timeout(1000)]
#[test]
fn test_statements_outside_method_are_discarded() {
    let harness = Harness::non_transactional();
    harness.session.find_all("authors");
    harness.session.find_all("books");
    assert_eq!(harness.statistics.total(), 2);

    harness
        .run(
            TestMethod::new("quiet").expecting(ExpectedCount::new().selects(0).inserts(0)),
            |_| {},
        )
        .unwrap();
    assert!(harness.statistics.is_empty());
}

#[timeout(1000)]
#[test]
fn test_failed_evaluation_still_rolls_back() {
    let harness = Harness::transactional();

    let result = harness.run(
        TestMethod::new("too_many_inserts").expecting(ExpectedCount::new().inserts(0)),
        |session| {
            session.persist("authors", 9, json!({"name": "Lem"})).unwrap();
        },
    );

    assert!(result.is_err());
    let transactional = harness.transactional.as_ref().unwrap();
    assert_eq!(transactional.rollbacks(), 1);
    assert_eq!(harness.session.find("authors", 9), None);
}

#[timeout(1000)]
#[test]
fn test_panicking_body_still_rolls_back() {
    let harness = Harness::transactional();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        harness.run(TestMethod::new("panics"), |session| {
            session.persist("authors", 9, json!({"name": "Lem"})).unwrap();
            panic!("test body failed");
        })
    }));

    assert!(outcome.is_err());
    let transactional = harness.transactional.as_ref().unwrap();
    assert_eq!(transactional.rollbacks(), 1);
    assert!(!harness.session.is_transaction_active());

    harness
        .run(
            TestMethod::new("next").expecting(ExpectedCount::new().selects(1).inserts(0)),
            |session| {
                assert_eq!(session.find("authors", 9), None);
            },
        )
        .unwrap();
    assert_eq!(transactional.rollbacks(), 2);
}

#[timeout(1000)]
#[test]
fn test_snapshot_report() -> anyhow::Result<()> {
    let harness = Harness::transactional();
    harness.run(TestMethod::new("report"), |session| {
        session.find("authors", 2);
    })?;

    let report = harness.statistics.snapshot().to_json()?;
    let parsed: serde_json::Value = serde_json::from_str(&report)?;
    assert_eq!(parsed["selects"][0], "select * from authors where id = 2");
    assert_eq!(parsed["inserts"], json!([]));
    Ok(())
}
