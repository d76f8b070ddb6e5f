use std::cell::Cell;
use std::collections::{BTreeMap, HashSet};

use crate::errors::{ExError, ExErrorKind};
use crate::model::{ImportedRow, NaturalKey, NewImportedRow};
use crate::ports::{ImportLedgerStore, InsertOutcome};

/// In-memory import ledger
///
/// Single-threaded, keyed by natural key. Commit failures can be injected
/// per import key to exercise the reconciler's partial-failure path.
#[derive(Debug, Clone, Default)]
pub struct MemoryImportLedger {
    rows: BTreeMap<NaturalKey, ImportedRow>,
    next_id: i64,
    failing_keys: HashSet<String>,
    exists_calls: Cell<usize>,
}

impl MemoryImportLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every commit of a row with this import key fail
    pub fn fail_commits_for(&mut self, import_key: impl Into<String>) {
        self.failing_keys.insert(import_key.into());
    }

    pub fn clear_failures(&mut self) {
        self.failing_keys.clear();
    }

    pub fn get(&self, key: &NaturalKey) -> Option<&ImportedRow> {
        self.rows.get(key)
    }

    /// Rows ordered by natural key
    pub fn rows(&self) -> impl Iterator<Item = &ImportedRow> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of existence checks served so far
    pub fn exists_calls(&self) -> usize {
        self.exists_calls.get()
    }
}

impl ImportLedgerStore for MemoryImportLedger {
    fn row_exists(&self, key: &NaturalKey) -> Result<bool, ExError> {
        self.exists_calls.set(self.exists_calls.get() + 1);
        Ok(self.rows.contains_key(key))
    }

    fn insert_row(&mut self, row: &NewImportedRow) -> Result<InsertOutcome, ExError> {
        if self.failing_keys.contains(&row.import_key) {
            return Err(ExError::new(ExErrorKind::Persistence)
                .with_op("insert_row")
                .with_entity_id(row.import_key.clone())
                .with_message(format!("commit failed for {}", row.import_key)));
        }

        let key = row.natural_key();
        if self.rows.contains_key(&key) {
            return Ok(InsertOutcome::Duplicate);
        }

        self.next_id += 1;
        let id = self.next_id;
        self.rows.insert(
            key,
            ImportedRow {
                id,
                data: row.clone(),
                processed: None,
            },
        );
        Ok(InsertOutcome::Inserted(id))
    }
}
