//! Select count regressions.

use ntest::timeout;
use stmt_count_core::{ExpectedCount, StatementKind};
use stmt_count_listener::TestMethod;
use stmt_count_session::Session;

use super::helpers::Harness;

/// Loads every author, then each author's book one by one.
fn titles_one_by_one(session: &Session) -> Vec<String> {
    session
        .find_all("authors")
        .iter()
        .filter_map(|(_, author)| author["book_id"].as_u64())
        .filter_map(|book_id| session.find("books", book_id))
        .filter_map(|book| book["title"].as_str().map(str::to_string))
        .collect()
}

/// Loads every author and every book with one query each.
fn titles_batched(session: &Session) -> Vec<String> {
    let authors = session.find_all("authors");
    session.find_all("books");
    authors
        .iter()
        .filter_map(|(_, author)| author["book_id"].as_u64())
        .filter_map(|book_id| session.find("books", book_id))
        .filter_map(|book| book["title"].as_str().map(str::to_string))
        .collect()
}

#[timeout(1000)]
#[test]
fn test_n_plus_one_is_reported() {
    let harness = Harness::transactional();
    let method = TestMethod::new("titles_one_by_one").expecting(ExpectedCount::new().selects(1));

    let err = harness.run(method, titles_one_by_one).unwrap_err();

    let failure = err.as_assertion_failure().expect("statement count failure");
    assert_eq!(failure.kinds(), vec![StatementKind::Select]);
    let message = err.to_string();
    assert!(message.contains("SELECT: expected 1, actual 4"), "{message}");
    assert!(message.contains("select * from authors"), "{message}");
    assert!(message.contains("select * from books where id = 12"), "{message}");
}

#[timeout(1000)]
#[test]
fn test_batched_loading_passes() {
    let harness = Harness::transactional();
    let method = TestMethod::new("titles_batched")
        .expecting(ExpectedCount::new().selects(2).inserts(0).updates(0).deletes(0));

    let titles = harness.run(method, titles_batched).unwrap();

    assert_eq!(titles.len(), 3);
    assert_eq!(titles[0], "Herbert's book");
}

#[timeout(1000)]
#[test]
fn test_unchecked_kinds_are_ignored() {
    let harness = Harness::transactional();
    let method = TestMethod::new("only_writes_checked").expecting(ExpectedCount::new().inserts(0));

    let titles = harness.run(method, titles_one_by_one).unwrap();
    assert_eq!(titles.len(), 3);
    assert_eq!(harness.statistics.count(StatementKind::Select), 4);
}

#[timeout(1000)]
#[test]
fn test_undeclared_method_is_never_evaluated() {
    let harness = Harness::transactional();

    let titles = harness
        .run(TestMethod::new("no_expectations"), titles_one_by_one)
        .unwrap();
    assert_eq!(titles.len(), 3);
}
