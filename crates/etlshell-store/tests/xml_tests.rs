#![allow(clippy::unwrap_used)]

mod common;

use common::setup_test_db;
use etlshell_store::storage::SqliteStorage;
use etlshell_store::xml::{all_xml, one_xml};
use serde_json::json;

#[test]
fn test_one_xml_renders_query_row() {
    let conn = setup_test_db();
    conn.execute(
        "INSERT INTO projects (name, import_key, analytic_account_id) VALUES ('R&D', 'PRJ-1', 10)",
        [],
    )
    .unwrap();
    let port = SqliteStorage::new(&conn);

    let xml = one_xml(
        &port,
        "SELECT name, analytic_account_id FROM projects WHERE import_key = ?1",
        &[json!("PRJ-1")],
    )
    .unwrap()
    .unwrap();

    assert_eq!(
        xml,
        "<?xml version=\"1.0\" encoding=\"UTF-8\" ?><root>\
         <name type=\"str\">R&amp;D</name>\
         <analytic_account_id type=\"int\">10</analytic_account_id>\
         </root>"
    );
}

#[test]
fn test_empty_result_is_no_document() {
    let conn = setup_test_db();
    let port = SqliteStorage::new(&conn);

    assert_eq!(one_xml(&port, "SELECT id FROM tasks", &[]).unwrap(), None);
    assert_eq!(all_xml(&port, "SELECT id FROM tasks", &[]).unwrap(), None);
}

#[test]
fn test_all_xml_wraps_rows_in_items() {
    let conn = setup_test_db();
    conn.execute_batch(
        "INSERT INTO tasks (name, time_deadline) VALUES ('Plan', 9.5);
         INSERT INTO tasks (name) VALUES ('Review');",
    )
    .unwrap();
    let port = SqliteStorage::new(&conn);

    let xml = all_xml(&port, "SELECT name, time_deadline FROM tasks ORDER BY id", &[])
        .unwrap()
        .unwrap();

    assert_eq!(xml.matches("<item type=\"dict\">").count(), 2);
    assert!(xml.contains("<time_deadline type=\"float\">9.5</time_deadline>"));
    assert!(xml.contains("<time_deadline type=\"null\"></time_deadline>"));
}

#[test]
fn test_computed_column_uses_key_element() {
    let conn = setup_test_db();
    let port = SqliteStorage::new(&conn);

    let xml = one_xml(&port, "SELECT COUNT(*) FROM tasks", &[])
        .unwrap()
        .unwrap();
    assert!(xml.contains("<key name=\"COUNT(*)\" type=\"int\">0</key>"));
}
