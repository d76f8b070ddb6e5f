use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An account an `account_import_key` resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    /// Host record carrying the import key (a project)
    pub project_id: i64,
    /// Ledger account lines are booked against
    pub analytic_account_id: i64,
}

/// Values for one target ledger line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLedgerLine {
    pub account_id: i64,
    pub name: String,
    pub reference: String,
    pub user_id: i64,
    pub import_key: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub unit_amount: f64,
    pub price_unit: f64,
    pub product_id: Option<i64>,
}

/// An imported row and the ledger line it was promoted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedRow {
    pub row_id: i64,
    pub line_id: i64,
}
