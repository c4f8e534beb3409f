//! Insert, update and delete counts, including writes still buffered when
//! the test body returns.

use ntest::timeout;
use serde_json::json;
use stmt_count_core::{ExpectedCount, StatementKind};
use stmt_count_listener::TestMethod;

use super::helpers::Harness;

#[timeout(1000)]
#[test]
fn test_buffered_writes_are_flushed_before_evaluation() {
    let harness = Harness::transactional();
    let method = TestMethod::new("add_books").expecting(ExpectedCount::new().inserts(2).selects(0));

    harness
        .run(method, |session| {
            session.persist("books", 20, json!({"title": "Kindred"})).unwrap();
            session.persist("books", 21, json!({"title": "Beloved"})).unwrap();
            assert_eq!(session.pending_writes(), 2);
        })
        .unwrap();

    assert_eq!(harness.statistics.count(StatementKind::Insert), 2);
    // The transactional listener rolled the flushed writes back.
    let transactional = harness.transactional.as_ref().unwrap();
    assert_eq!(transactional.rollbacks(), 1);
    assert!(!harness.session.is_transaction_active());
    assert_eq!(harness.session.find("books", 20), None);
}

#[timeout(1000)]
#[test]
fn test_missing_flush_would_hide_writes() {
    let harness = Harness::transactional();
    let method = TestMethod::new("rename_author").expecting(ExpectedCount::new().updates(0));

    let err = harness
        .run(method, |session| {
            session
                .update("authors", 1, json!({"name": "Frank Herbert", "book_id": 11}))
                .unwrap();
        })
        .unwrap_err();

    assert!(err.to_string().contains("UPDATE: expected 0, actual 1"));
    assert!(!harness.session.is_transaction_active());
}

#[timeout(1000)]
#[test]
fn test_committed_writes_without_ambient_transaction() -> anyhow::Result<()> {
    let harness = Harness::non_transactional();
    let method = TestMethod::new("retire_author")
        .expecting(ExpectedCount::new().selects(1).updates(1).deletes(2));

    harness.run(method, |session| -> anyhow::Result<()> {
        let transaction = session.transaction()?;
        let author = session.find("authors", 3).unwrap_or_default();
        session.update("authors", 3, json!({"name": author["name"], "retired": true}))?;
        session.remove("books", 13)?;
        session.remove("authors", 2)?;
        transaction.commit()?;
        Ok(())
    })??;

    assert_eq!(harness.session.find("books", 13), None);
    Ok(())
}

#[timeout(1000)]
#[test]
fn test_all_mismatching_kinds_reported_together() {
    let harness = Harness::transactional();
    let method = TestMethod::new("reshuffle")
        .expecting(ExpectedCount::new().inserts(1).updates(1).deletes(1));

    let err = harness
        .run(method, |session| {
            session.persist("books", 30, json!({"title": "Solaris"})).unwrap();
            session.persist("books", 31, json!({"title": "Ubik"})).unwrap();
            session.remove("books", 11).unwrap();
        })
        .unwrap_err();

    let failure = err.as_assertion_failure().unwrap();
    assert_eq!(failure.kinds(), vec![StatementKind::Insert, StatementKind::Update]);
    let message = err.to_string();
    assert!(message.contains("INSERT: expected 1, actual 2"), "{message}");
    assert!(message.contains("UPDATE: expected 1, actual 0"), "{message}");
    assert!(!message.contains("DELETE:"), "{message}");
}
