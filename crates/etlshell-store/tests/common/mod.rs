#![allow(dead_code, clippy::unwrap_used)]

use etlshell_core::model::ImportRow;
use etlshell_store::migrations::apply_migrations;
use rusqlite::Connection;
use serde_json::{json, Value};

pub const MODULE: &str = "etl_harvest";
pub const SOURCE: &str = "harvest";

pub fn setup_test_db() -> Connection {
    let mut conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    apply_migrations(&mut conn).expect("Migrations should apply");
    conn
}

pub fn row_json(import_key: &str, account_import_key: &str) -> Value {
    json!({
        "import_key": import_key,
        "account_import_key": account_import_key,
        "name": format!("Timesheet {}", import_key),
        "ref": format!("REF-{}", import_key),
        "date": "2024-05-06",
        "unit_amount": 1.5,
        "price_unit": 80.0,
        "amount": 120.0
    })
}

pub fn rows(keys: &[&str]) -> Vec<ImportRow> {
    keys.iter()
        .map(|k| serde_json::from_value(row_json(k, "PRJ-1")).unwrap())
        .collect()
}

pub fn seed_project(conn: &Connection, name: &str, import_key: &str, analytic_account_id: i64) -> i64 {
    conn.execute(
        "INSERT INTO projects (name, import_key, analytic_account_id) VALUES (?1, ?2, ?3)",
        rusqlite::params![name, import_key, analytic_account_id],
    )
    .unwrap();
    conn.last_insert_rowid()
}

pub fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .unwrap()
}

/// Make every insert of `import_key` into the import ledger abort
pub fn force_insert_failure(conn: &Connection, import_key: &str) {
    conn.execute_batch(&format!(
        "CREATE TRIGGER fail_{key} BEFORE INSERT ON import_ledger
         WHEN NEW.import_key = '{key}'
         BEGIN SELECT RAISE(ABORT, 'forced failure for {key}'); END;",
        key = import_key
    ))
    .unwrap();
}
