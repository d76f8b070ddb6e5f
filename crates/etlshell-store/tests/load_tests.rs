#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use chrono::NaiveDate;
use common::{count, row_json, seed_project, setup_test_db, MODULE, SOURCE};
use etlshell_core::errors::ExErrorKind;
use etlshell_core::model::NaturalKey;
use etlshell_core::{batch_upsert, LoadContext, PassThroughSync, UpsertSettings};
use etlshell_store::{load_pending, ImportLedgerRepo, SqliteImportLedger};
use rusqlite::Connection;
use serde_json::{json, Value};

fn import(conn: &mut Connection, source: &str, batch: Value) {
    let mut ledger = SqliteImportLedger::new(conn);
    let outcome = batch_upsert(
        &mut ledger,
        &PassThroughSync::new(source),
        &UpsertSettings::new(MODULE, "USD"),
        batch,
    );
    assert!(outcome.is_ok(), "import failed: {:?}", outcome);
}

fn ctx() -> LoadContext {
    LoadContext::new(5, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
}

#[test]
fn test_pending_rows_become_ledger_lines() {
    let mut conn = setup_test_db();
    seed_project(&conn, "Apollo", "PRJ-1", 10);
    import(
        &mut conn,
        SOURCE,
        json!([row_json("A", "PRJ-1"), row_json("B", "PRJ-1")]),
    );

    let loaded = load_pending(&mut conn, None, &ctx()).unwrap();

    assert_eq!(loaded.len(), 2);
    assert_eq!(count(&conn, "analytic_lines"), 2);
    let (account_id, name, user_id): (i64, String, i64) = conn
        .query_row(
            "SELECT account_id, name, user_id FROM analytic_lines WHERE import_key = 'A'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!((account_id, name.as_str(), user_id), (10, "REF-A", 5));

    let row = ImportLedgerRepo::find(&conn, &NaturalKey::new(MODULE, SOURCE, "A"))
        .unwrap()
        .unwrap();
    assert_eq!(row.processed, NaiveDate::from_ymd_opt(2024, 6, 1));
}

#[test]
fn test_second_load_finds_nothing_pending() {
    let mut conn = setup_test_db();
    seed_project(&conn, "Apollo", "PRJ-1", 10);
    import(&mut conn, SOURCE, json!([row_json("A", "PRJ-1")]));

    load_pending(&mut conn, None, &ctx()).unwrap();
    let again = load_pending(&mut conn, None, &ctx()).unwrap();

    assert!(again.is_empty());
    assert_eq!(count(&conn, "analytic_lines"), 1);
}

#[test]
fn test_unresolved_account_rolls_back_whole_load() {
    let mut conn = setup_test_db();
    seed_project(&conn, "Apollo", "PRJ-1", 10);
    import(
        &mut conn,
        SOURCE,
        json!([row_json("A", "PRJ-1"), row_json("B", "PRJ-404")]),
    );

    let err = load_pending(&mut conn, None, &ctx()).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::UnresolvedReference);
    assert_eq!(err.entity_id(), Some("PRJ-404"));
    assert_eq!(count(&conn, "analytic_lines"), 0);
    assert_eq!(ImportLedgerRepo::list_pending(&conn, None).unwrap().len(), 2);
}

#[test]
fn test_ambiguous_account_reports_both_projects() {
    let mut conn = setup_test_db();
    let first = seed_project(&conn, "Apollo", "PRJ-1", 10);
    let second = seed_project(&conn, "Apollo II", "PRJ-1", 11);
    import(&mut conn, SOURCE, json!([row_json("A", "PRJ-1")]));

    let err = load_pending(&mut conn, None, &ctx()).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::UnresolvedReference);
    assert_eq!(
        err.candidates().map(<[String]>::to_vec),
        Some(vec![first.to_string(), second.to_string()])
    );
}

#[test]
fn test_load_filtered_by_source() {
    let mut conn = setup_test_db();
    seed_project(&conn, "Apollo", "PRJ-1", 10);
    import(&mut conn, SOURCE, json!([row_json("A", "PRJ-1")]));
    import(&mut conn, "jira", json!([row_json("J", "PRJ-404")]));

    let loaded = load_pending(&mut conn, Some(SOURCE), &ctx()).unwrap();

    assert_eq!(loaded.len(), 1);
    let pending = ImportLedgerRepo::list_pending(&conn, None).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].data.source, "jira");
}

#[test]
fn test_explicit_analytic_account_is_used() {
    let mut conn = setup_test_db();
    seed_project(&conn, "Apollo", "PRJ-1", 10);
    let mut row = row_json("A", "PRJ-1");
    row["analytic_account_id"] = json!(77);
    import(&mut conn, SOURCE, json!([row]));

    load_pending(&mut conn, None, &ctx()).unwrap();

    let account_id: i64 = conn
        .query_row("SELECT account_id FROM analytic_lines", [], |row| row.get(0))
        .unwrap();
    assert_eq!(account_id, 77);
}
