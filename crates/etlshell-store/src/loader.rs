//! SQLite ledger host for the load step
//!
//! ## Logging Ownership
//!
//! `load_pending` owns the start/end events of a pending-rows load; the
//! host's own writes log with `tracing::debug!` only.

#![allow(clippy::result_large_err)]

use std::time::Instant;

use chrono::NaiveDate;
use etlshell_core::errors::{ExError, ImportError};
use etlshell_core::model::{AccountRef, LoadedRow, NewLedgerLine};
use etlshell_core::{load_rows, log_op_end, log_op_error, log_op_start, LedgerHost, LoadContext};
use rusqlite::Connection;

use crate::errors::{from_rusqlite, Result};
use crate::import_ledger::{ImportLedgerRepo, DATE_FORMAT};

/// `LedgerHost` over the `projects` and `analytic_lines` tables
pub struct SqliteLedgerHost<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteLedgerHost<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl LedgerHost for SqliteLedgerHost<'_> {
    fn find_accounts(&self, account_import_key: &str) -> Result<Vec<AccountRef>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, analytic_account_id FROM projects WHERE import_key = ?1 ORDER BY id")
            .map_err(from_rusqlite)?;
        let accounts = stmt
            .query_map([account_import_key], |row| {
                Ok(AccountRef {
                    project_id: row.get(0)?,
                    analytic_account_id: row.get(1)?,
                })
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(accounts)
    }

    fn create_line(&mut self, line: &NewLedgerLine) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO analytic_lines (
                    account_id, name, ref, user_id, import_key, date, amount,
                    unit_amount, price_unit, product_id, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                rusqlite::params![
                    line.account_id,
                    line.name,
                    line.reference,
                    line.user_id,
                    line.import_key,
                    line.date.format(DATE_FORMAT).to_string(),
                    line.amount,
                    line.unit_amount,
                    line.price_unit,
                    line.product_id,
                    chrono::Utc::now().timestamp(),
                ],
            )
            .map_err(|e| from_rusqlite(e).with_op("create_line").with_entity_id(line.import_key.clone()))?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!(line_id = id, account_id = line.account_id, "ledger line created");
        Ok(id)
    }

    fn mark_processed(&mut self, row_id: i64, processed: NaiveDate, log: Option<&str>) -> Result<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE import_ledger SET processed = ?1, log = COALESCE(?2, log)
                 WHERE id = ?3 AND processed IS NULL",
                rusqlite::params![processed.format(DATE_FORMAT).to_string(), log, row_id],
            )
            .map_err(|e| from_rusqlite(e).with_op("mark_processed"))?;

        if changed == 0 {
            let err = match ImportLedgerRepo::get(self.conn, row_id)? {
                Some(_) => ImportError::AlreadyLoaded { row_id },
                None => ImportError::RowNotFound { row_id },
            };
            return Err(err.into());
        }
        Ok(())
    }
}

/// Load every pending imported row (optionally of one source) in one
/// transaction
///
/// Nothing is kept if any row fails.
///
/// # Errors
///
/// Whatever `load_rows` reports, plus `Persistence` for transaction failures.
pub fn load_pending(
    conn: &mut Connection,
    source: Option<&str>,
    ctx: &LoadContext,
) -> Result<Vec<LoadedRow>> {
    let batch_id = ctx.batch_id.clone().unwrap_or_default();
    let ctx = LoadContext {
        batch_id: Some(batch_id.clone()),
        ..ctx.clone()
    };
    log_op_start!("load_pending", batch_id = %batch_id, source = source.unwrap_or("*"));
    let start = Instant::now();

    let result = load_pending_impl(conn, source, &ctx).map_err(|e| {
        log_op_error!(
            "load_pending",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            batch_id = %batch_id
        );
        e
    })?;

    log_op_end!(
        "load_pending",
        duration_ms = start.elapsed().as_millis() as u64,
        batch_id = %batch_id,
        loaded = result.len()
    );

    Ok(result)
}

fn load_pending_impl(
    conn: &mut Connection,
    source: Option<&str>,
    ctx: &LoadContext,
) -> std::result::Result<Vec<LoadedRow>, ExError> {
    let tx = conn.transaction().map_err(from_rusqlite)?;

    let pending = ImportLedgerRepo::list_pending(&tx, source)?;
    let loaded = {
        let mut host = SqliteLedgerHost::new(&tx);
        load_rows(&mut host, &pending, ctx)?
    };

    tx.commit().map_err(from_rusqlite)?;
    Ok(loaded)
}
