//! Load step: promote imported rows into the host ledger
//!
//! ## Logging Ownership
//!
//! `load_rows` owns the start/end events of a load; `LedgerHost`
//! implementations log with `tracing::debug!` only.

#![allow(clippy::result_large_err)]

use std::collections::HashSet;
use std::time::Instant;

use chrono::NaiveDate;
use etlshell_core_types::BatchId;

use crate::errors::{ExError, ImportError};
use crate::model::{AccountRef, ImportedRow, LoadedRow, NewLedgerLine};
use crate::{log_op_end, log_op_error, log_op_start};

/// Host ledger the load step writes into
pub trait LedgerHost {
    /// Every account whose import key equals `account_import_key`
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Persistence` if the lookup fails.
    fn find_accounts(&self, account_import_key: &str) -> Result<Vec<AccountRef>, ExError>;

    /// Create one ledger line and return its id
    ///
    /// Integrations that need to alter how lines are created override this.
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Persistence` if the line cannot be written.
    fn create_line(&mut self, line: &NewLedgerLine) -> Result<i64, ExError>;

    /// Record that an imported row has been promoted
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Persistence` if the row cannot be updated.
    fn mark_processed(
        &mut self,
        row_id: i64,
        processed: NaiveDate,
        log: Option<&str>,
    ) -> Result<(), ExError>;
}

/// Who is loading, and when
#[derive(Debug, Clone)]
pub struct LoadContext {
    /// User the ledger lines are booked for
    pub user_id: i64,
    /// Date stamped into `processed`
    pub today: NaiveDate,
    pub batch_id: Option<BatchId>,
}

impl LoadContext {
    pub fn new(user_id: i64, today: NaiveDate) -> Self {
        Self {
            user_id,
            today,
            batch_id: None,
        }
    }
}

/// Resolve an account import key to exactly one account
///
/// # Errors
///
/// Returns `UnresolvedReference` when zero or several accounts match.
pub fn resolve_account(
    host: &dyn LedgerHost,
    account_import_key: &str,
) -> Result<AccountRef, ExError> {
    let accounts = host.find_accounts(account_import_key)?;
    match accounts.as_slice() {
        [account] => Ok(*account),
        _ => Err(ImportError::UnresolvedReference {
            account_import_key: account_import_key.to_string(),
            matches: accounts.iter().map(|a| a.project_id.to_string()).collect(),
        }
        .into()),
    }
}

/// Ledger line values for an imported row booked against `account`
pub fn build_line(row: &ImportedRow, account: &AccountRef, user_id: i64) -> NewLedgerLine {
    let data = &row.data;
    NewLedgerLine {
        account_id: data
            .analytic_account_id
            .unwrap_or(account.analytic_account_id),
        name: data.reference.clone(),
        reference: data.reference.clone(),
        user_id,
        import_key: data.import_key.clone(),
        date: data.date,
        amount: data.amount,
        unit_amount: data.unit_amount,
        price_unit: data.price_unit,
        product_id: data.product_id,
    }
}

/// Promote rows into the ledger, in order
///
/// Stops at the first row that cannot be loaded. Whether rows loaded before
/// that point are kept is up to the host's transaction handling.
///
/// # Errors
///
/// - `AlreadyProcessed`: the row was loaded before
/// - `UnresolvedReference`: its account import key matches zero or several accounts
/// - `Persistence`: the host failed to write
pub fn load_rows(
    host: &mut dyn LedgerHost,
    rows: &[ImportedRow],
    ctx: &LoadContext,
) -> Result<Vec<LoadedRow>, ExError> {
    let batch_id = ctx.batch_id.clone().unwrap_or_default();
    log_op_start!("load_rows", batch_id = %batch_id, rows = rows.len());
    let start = Instant::now();

    let result = load_rows_impl(host, rows, ctx).map_err(|e| {
        let e = e.with_op("load_rows").with_batch_id(batch_id.clone());
        log_op_error!(
            "load_rows",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            batch_id = %batch_id
        );
        e
    })?;

    log_op_end!(
        "load_rows",
        duration_ms = start.elapsed().as_millis() as u64,
        batch_id = %batch_id,
        loaded = result.len()
    );

    Ok(result)
}

fn load_rows_impl(
    host: &mut dyn LedgerHost,
    rows: &[ImportedRow],
    ctx: &LoadContext,
) -> Result<Vec<LoadedRow>, ExError> {
    let mut loaded = Vec::with_capacity(rows.len());
    let mut seen = HashSet::new();

    for (index, row) in rows.iter().enumerate() {
        if row.is_processed() || !seen.insert(row.id) {
            return Err(
                ExError::from(ImportError::AlreadyLoaded { row_id: row.id }).with_row_index(index),
            );
        }

        let account = resolve_account(&*host, &row.data.account_import_key)
            .map_err(|e| e.with_row_index(index))?;
        let line = build_line(row, &account, ctx.user_id);
        let line_id = host.create_line(&line)?;
        host.mark_processed(row.id, ctx.today, row.data.log.as_deref())?;

        tracing::debug!(row_id = row.id, line_id, import_key = %row.data.import_key, "row loaded");
        loaded.push(LoadedRow {
            row_id: row.id,
            line_id,
        });
    }

    Ok(loaded)
}
