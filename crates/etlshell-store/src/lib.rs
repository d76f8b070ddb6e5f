//! etl-shell Store - SQLite persistence for imports, notes and tasks
//!
//! Provides:
//! - SQLite schema with a checksummed migrations framework
//! - The storage port (`one`, `all`, `exists`, `catalog_name`, `config_param`)
//! - XML rendering of query results
//! - The import ledger used by the reconciler, and the load step host
//! - Tagged notes and task deadline repositories

pub mod db;
pub mod errors;
pub mod import_ledger;
pub mod loader;
pub mod migrations;
pub mod notes;
pub mod storage;
pub mod tasks;
pub mod xml;

// Re-export key types
pub use errors::Result;
pub use import_ledger::{ImportLedgerRepo, SqliteImportLedger};
pub use loader::{load_pending, SqliteLedgerHost};
pub use storage::SqliteStorage;
