#![allow(dead_code, clippy::unwrap_used)]

use std::collections::HashMap;

use chrono::NaiveDate;
use etlshell_core::errors::{ExError, ExErrorKind};
use etlshell_core::model::{AccountRef, ImportRow, ImportedRow, NewLedgerLine};
use etlshell_core::{ImportLedgerStore, LedgerHost, MemoryImportLedger, NewImportedRow};
use serde_json::{json, Value};

pub const MODULE: &str = "etl_harvest";
pub const SOURCE: &str = "harvest";

pub fn row_json(import_key: &str) -> Value {
    json!({
        "import_key": import_key,
        "account_import_key": "PRJ-1",
        "name": format!("Timesheet {}", import_key),
        "ref": format!("REF-{}", import_key),
        "date": "2024-05-06",
        "unit_amount": 1.5,
        "price_unit": 80.0,
        "amount": 120.0
    })
}

pub fn row(import_key: &str) -> ImportRow {
    serde_json::from_value(row_json(import_key)).unwrap()
}

pub fn rows(keys: &[&str]) -> Vec<ImportRow> {
    keys.iter().map(|k| row(k)).collect()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Rows currently in the ledger, ordered by id
pub fn stored(ledger: &MemoryImportLedger) -> Vec<ImportedRow> {
    let mut rows: Vec<_> = ledger.rows().cloned().collect();
    rows.sort_by_key(|r| r.id);
    rows
}

/// Seed the ledger with an imported row for `account_import_key`
pub fn imported(
    ledger: &mut MemoryImportLedger,
    import_key: &str,
    account_import_key: &str,
) -> ImportedRow {
    let new_row = NewImportedRow {
        sync_module: MODULE.to_string(),
        source: SOURCE.to_string(),
        import_key: import_key.to_string(),
        account_import_key: account_import_key.to_string(),
        name: "Timesheet".to_string(),
        reference: format!("REF-{}", import_key),
        date: date(2024, 5, 6),
        unit_amount: 2.0,
        price_unit: 50.0,
        amount: 100.0,
        currency: "USD".to_string(),
        import_user: None,
        analytic_account_id: None,
        product_id: None,
        metadata: None,
        log: None,
        must_force: false,
        data_mapping_id: None,
    };
    ledger.insert_row(&new_row).unwrap();
    ledger.get(&new_row.natural_key()).cloned().unwrap()
}

/// In-memory ledger host
#[derive(Debug, Default)]
pub struct MemoryLedgerHost {
    pub accounts: Vec<(String, AccountRef)>,
    pub lines: Vec<NewLedgerLine>,
    pub processed: HashMap<i64, NaiveDate>,
    pub fail_create: bool,
}

impl MemoryLedgerHost {
    pub fn with_account(mut self, import_key: &str, project_id: i64, analytic_account_id: i64) -> Self {
        self.accounts.push((
            import_key.to_string(),
            AccountRef {
                project_id,
                analytic_account_id,
            },
        ));
        self
    }
}

impl LedgerHost for MemoryLedgerHost {
    fn find_accounts(&self, account_import_key: &str) -> Result<Vec<AccountRef>, ExError> {
        Ok(self
            .accounts
            .iter()
            .filter(|(key, _)| key == account_import_key)
            .map(|(_, account)| *account)
            .collect())
    }

    fn create_line(&mut self, line: &NewLedgerLine) -> Result<i64, ExError> {
        if self.fail_create {
            return Err(ExError::new(ExErrorKind::Persistence).with_message("ledger is locked"));
        }
        self.lines.push(line.clone());
        Ok(self.lines.len() as i64)
    }

    fn mark_processed(
        &mut self,
        row_id: i64,
        processed: NaiveDate,
        _log: Option<&str>,
    ) -> Result<(), ExError> {
        self.processed.insert(row_id, processed);
        Ok(())
    }
}
