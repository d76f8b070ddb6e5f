//! etl-shell core - storage-agnostic import reconciliation
//!
//! This crate provides:
//! - The import data model (candidate rows, natural keys, imported rows)
//! - The idempotent batch upsert (`reconcile::batch_upsert`)
//! - The load step that promotes imported rows into a host ledger
//! - Storage and integration ports implemented by `etlshell-store` and by
//!   each sync integration
//! - Deadline and tagged-note validation for the planning extensions
//! - The error and logging facilities shared by every crate

pub mod deadline;
pub mod errors;
pub mod hooks;
pub mod load;
pub mod logging_facility;
pub mod memory;
pub mod model;
pub mod notes;
pub mod ports;
pub mod reconcile;

#[doc(hidden)]
pub use etlshell_core_types as types;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, ImportError, Result};
pub use hooks::{PassThroughSync, SyncSource};
pub use load::{load_rows, LedgerHost, LoadContext};
pub use memory::MemoryImportLedger;
pub use model::{ImportRow, ImportedRow, NaturalKey, NewImportedRow};
pub use ports::{default_currency, ImportLedgerStore, InsertOutcome, Row, StoragePort};
pub use reconcile::{batch_upsert, BatchInput, UpsertOutcome, UpsertPayload, UpsertSettings};
