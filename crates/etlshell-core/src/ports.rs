//! Storage ports the reconciler and the host helpers depend on
//!
//! The core never talks to a database directly. `etlshell-store` implements
//! these traits over SQLite; `MemoryImportLedger` implements
//! `ImportLedgerStore` for tests and dry runs.

#![allow(clippy::result_large_err)]

use serde_json::{Map, Value};

use crate::errors::ExError;
use crate::model::{NaturalKey, NewImportedRow};

/// One result row as a column name -> value mapping (column order kept)
pub type Row = Map<String, Value>;

/// Narrow query interface over the host's relational store
pub trait StoragePort {
    /// Run a parameterized query and return its first row, if any
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Persistence` if the query fails.
    fn one(&self, sql: &str, params: &[Value]) -> Result<Option<Row>, ExError>;

    /// Run a parameterized query and return every row
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Persistence` if the query fails.
    fn all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, ExError>;

    /// Whether at least one row of `table` matches `where_clause`
    ///
    /// Must be a single round trip that transfers no row contents.
    /// `where_clause` excludes the `WHERE` keyword and binds `params`
    /// positionally.
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::InvalidInput` for a table name that is not a
    /// plain identifier, `ExErrorKind::Persistence` if the query fails.
    fn exists(&self, table: &str, where_clause: &str, params: &[Value]) -> Result<bool, ExError>;

    /// Name of the catalog (database) the port is connected to
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Persistence` if the query fails.
    fn catalog_name(&self) -> Result<String, ExError>;

    /// Look up a host configuration parameter by key
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Persistence` if the query fails.
    fn config_param(&self, key: &str) -> Result<Option<String>, ExError>;
}

/// Result of a single-row durable insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The row was written and committed; carries its id
    Inserted(i64),
    /// The natural key already existed at commit time
    Duplicate,
}

/// Persistence the reconciler needs for imported rows
pub trait ImportLedgerStore {
    /// Existence check on the natural key, without fetching the row
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Persistence` if the check cannot be run.
    fn row_exists(&self, key: &NaturalKey) -> Result<bool, ExError>;

    /// Write one row in its own transaction and commit it
    ///
    /// A natural-key conflict is reported as `InsertOutcome::Duplicate`,
    /// never as an error.
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Persistence` if the write or the commit fails;
    /// nothing of the row is left behind in that case.
    fn insert_row(&mut self, row: &NewImportedRow) -> Result<InsertOutcome, ExError>;
}

/// Configuration key holding the currency stamped on imported rows
pub const DEFAULT_CURRENCY_KEY: &str = "etl_shell.default_currency";

/// Currency used when the host has none configured
pub const FALLBACK_CURRENCY: &str = "USD";

/// The host's configured import currency, or `FALLBACK_CURRENCY`
///
/// # Errors
///
/// Returns `ExErrorKind::Persistence` if the lookup fails.
pub fn default_currency(port: &dyn StoragePort) -> Result<String, ExError> {
    Ok(port
        .config_param(DEFAULT_CURRENCY_KEY)?
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_CURRENCY.to_string()))
}
