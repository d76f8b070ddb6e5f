//! Import reconciliation: idempotent batch upsert of externally sourced rows
//!
//! Rows are processed in input order:
//!
//! 1. the batch is deserialized (failure rejects the whole batch);
//! 2. an empty import key aborts the batch at that row;
//! 3. rows whose natural key already exists are skipped;
//! 4. the integration hook may alter or reject the row (rejection aborts,
//!    and so does a hook that changes the row's natural key);
//! 5. the row is written and committed on its own.
//!
//! Rows committed before an abort stay committed. A failed per-row commit is
//! recorded and the batch carries on; the call then reports failure with
//! every recorded detail.

#![allow(clippy::result_large_err)]

use std::time::Instant;

use etlshell_core_types::BatchId;
use serde_json::Value;

use crate::errors::{ExError, ExErrorKind, ImportError};
use crate::hooks::SyncSource;
use crate::model::{ImportRow, NaturalKey, NewImportedRow};
use crate::ports::{ImportLedgerStore, InsertOutcome};
use crate::{log_op_end, log_op_error, log_op_start};

/// A batch as handed over by the caller
#[derive(Debug, Clone)]
pub enum BatchInput {
    /// Already structured rows
    Rows(Vec<ImportRow>),
    /// A JSON array of row objects
    Json(Value),
    /// Serialized JSON text of a row array
    Text(String),
}

impl BatchInput {
    /// Deserialize into rows
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if the input is not an array of valid rows.
    pub fn into_rows(self) -> crate::errors::Result<Vec<ImportRow>> {
        let parsed = match self {
            BatchInput::Rows(rows) => return Ok(rows),
            BatchInput::Json(value) => serde_json::from_value(value),
            BatchInput::Text(text) => serde_json::from_str(&text),
        };
        parsed.map_err(|e| ImportError::MalformedInput {
            reason: e.to_string(),
        })
    }
}

impl From<Vec<ImportRow>> for BatchInput {
    fn from(rows: Vec<ImportRow>) -> Self {
        BatchInput::Rows(rows)
    }
}

impl From<Value> for BatchInput {
    fn from(value: Value) -> Self {
        BatchInput::Json(value)
    }
}

impl From<String> for BatchInput {
    fn from(text: String) -> Self {
        BatchInput::Text(text)
    }
}

impl From<&str> for BatchInput {
    fn from(text: &str) -> Self {
        BatchInput::Text(text.to_string())
    }
}

/// Host-resolved values merged into every row of a batch
#[derive(Debug, Clone)]
pub struct UpsertSettings {
    /// Identifier of the importing module (first part of the natural key)
    pub sync_module: String,
    /// Currency stamped on rows; the integration hook may override it
    pub default_currency: String,
    /// Correlation id for this call; generated when absent
    pub batch_id: Option<BatchId>,
}

impl UpsertSettings {
    /// Settings with a batch id generated per call
    pub fn new(sync_module: impl Into<String>, default_currency: impl Into<String>) -> Self {
        Self {
            sync_module: sync_module.into(),
            default_currency: default_currency.into(),
            batch_id: None,
        }
    }

    /// Use a caller-chosen correlation id
    pub fn with_batch_id(mut self, batch_id: BatchId) -> Self {
        self.batch_id = Some(batch_id);
        self
    }
}

/// A row whose own commit failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    /// Position of the row in the batch
    pub index: usize,
    pub import_key: String,
    pub message: String,
}

/// Payload half of the `(ok, payload)` result shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertPayload {
    /// Number of rows inserted by this call
    Count(usize),
    /// Batch-fatal error message
    Error(String),
    /// One message per failed row commit
    Failures(Vec<String>),
}

/// Outcome of `batch_upsert`
#[derive(Debug, Clone)]
pub enum UpsertOutcome {
    /// Every row was inserted or skipped as a duplicate
    Completed { inserted: usize, skipped: usize },
    /// The batch stopped at a malformed input or a validation failure
    ///
    /// `inserted` rows committed before the abort remain in the store.
    Aborted { error: ExError, inserted: usize },
    /// All rows were processed but some per-row commits failed
    PartiallyFailed {
        failures: Vec<RowFailure>,
        inserted: usize,
        skipped: usize,
    },
}

impl UpsertOutcome {
    /// True only for `Completed`
    pub fn is_ok(&self) -> bool {
        matches!(self, UpsertOutcome::Completed { .. })
    }

    /// Rows durably inserted by this call, whatever the outcome
    pub fn inserted(&self) -> usize {
        match self {
            UpsertOutcome::Completed { inserted, .. }
            | UpsertOutcome::Aborted { inserted, .. }
            | UpsertOutcome::PartiallyFailed { inserted, .. } => *inserted,
        }
    }

    /// The error that stopped an aborted batch
    pub fn error(&self) -> Option<&ExError> {
        match self {
            UpsertOutcome::Aborted { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Rows whose own commit failed; empty unless `PartiallyFailed`
    pub fn failures(&self) -> &[RowFailure] {
        match self {
            UpsertOutcome::PartiallyFailed { failures, .. } => failures,
            _ => &[],
        }
    }

    /// Inserted count, abort message or per-row failure messages
    pub fn payload(&self) -> UpsertPayload {
        match self {
            UpsertOutcome::Completed { inserted, .. } => UpsertPayload::Count(*inserted),
            UpsertOutcome::Aborted { error, .. } => UpsertPayload::Error(error.message().to_string()),
            UpsertOutcome::PartiallyFailed { failures, .. } => {
                UpsertPayload::Failures(failures.iter().map(|f| f.message.clone()).collect())
            }
        }
    }

    /// The `(ok, payload)` pair sync callers expect
    pub fn into_pair(self) -> (bool, UpsertPayload) {
        (self.is_ok(), self.payload())
    }
}

#[derive(Debug, Default)]
struct Progress {
    inserted: usize,
    skipped: usize,
    failures: Vec<RowFailure>,
}

/// Idempotently upsert a batch of rows
///
/// Never panics and never returns an error: every failure is folded into
/// the returned `UpsertOutcome`. Re-invoking with the same batch inserts
/// nothing new.
pub fn batch_upsert(
    store: &mut dyn ImportLedgerStore,
    source: &dyn SyncSource,
    settings: &UpsertSettings,
    input: impl Into<BatchInput>,
) -> UpsertOutcome {
    let batch_id = settings.batch_id.clone().unwrap_or_default();
    let source_code = source.sync_source_code();

    log_op_start!(
        "batch_upsert",
        batch_id = %batch_id,
        sync_module = %settings.sync_module,
        source = %source_code
    );
    let start = Instant::now();

    let mut progress = Progress::default();
    let result = run_batch(
        store,
        source,
        settings,
        &source_code,
        input.into(),
        &mut progress,
    );
    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Err(error) => {
            let error = error.with_op("batch_upsert").with_batch_id(batch_id.clone());
            log_op_error!(
                "batch_upsert",
                error.clone(),
                duration_ms = duration_ms,
                batch_id = %batch_id,
                inserted = progress.inserted
            );
            UpsertOutcome::Aborted {
                error,
                inserted: progress.inserted,
            }
        }
        Ok(()) if !progress.failures.is_empty() => {
            let summary = ExError::new(ExErrorKind::Persistence)
                .with_op("batch_upsert")
                .with_message(format!(
                    "{} row(s) failed to commit",
                    progress.failures.len()
                ));
            log_op_error!(
                "batch_upsert",
                summary,
                duration_ms = duration_ms,
                batch_id = %batch_id,
                inserted = progress.inserted,
                skipped = progress.skipped,
                failed = progress.failures.len()
            );
            UpsertOutcome::PartiallyFailed {
                failures: progress.failures,
                inserted: progress.inserted,
                skipped: progress.skipped,
            }
        }
        Ok(()) => {
            log_op_end!(
                "batch_upsert",
                duration_ms = duration_ms,
                batch_id = %batch_id,
                inserted = progress.inserted,
                skipped = progress.skipped
            );
            UpsertOutcome::Completed {
                inserted: progress.inserted,
                skipped: progress.skipped,
            }
        }
    }
}

fn run_batch(
    store: &mut dyn ImportLedgerStore,
    source: &dyn SyncSource,
    settings: &UpsertSettings,
    source_code: &str,
    input: BatchInput,
    progress: &mut Progress,
) -> Result<(), ExError> {
    let rows = input.into_rows()?;

    for (index, row) in rows.iter().enumerate() {
        if !row.has_import_key() {
            return Err(ImportError::ImportKeyRequired { index }.into());
        }

        let key = NaturalKey::new(&settings.sync_module, source_code, &row.import_key);
        if store
            .row_exists(&key)
            .map_err(|e| e.with_row_index(index))?
        {
            tracing::debug!(import_key = %row.import_key, row_index = index, "row already imported, skipping");
            progress.skipped += 1;
            continue;
        }

        let candidate = build_candidate(row, settings, source_code);
        let accepted = source.validate_upsert(row, candidate).map_err(|reason| {
            ExError::from(ImportError::UpsertRejected {
                import_key: row.import_key.clone(),
                reason,
            })
            .with_row_index(index)
        })?;
        if accepted.natural_key() != key {
            return Err(ExError::from(ImportError::UpsertRejected {
                import_key: row.import_key.clone(),
                reason: format!(
                    "validate_upsert changed the natural key of {}",
                    row.import_key
                ),
            })
            .with_row_index(index));
        }

        match store.insert_row(&accepted) {
            Ok(InsertOutcome::Inserted(id)) => {
                tracing::debug!(import_key = %row.import_key, row_id = id, "row inserted");
                progress.inserted += 1;
            }
            Ok(InsertOutcome::Duplicate) => {
                tracing::debug!(import_key = %row.import_key, "row committed concurrently, skipping");
                progress.skipped += 1;
            }
            Err(err) => {
                tracing::warn!(
                    import_key = %row.import_key,
                    row_index = index,
                    err.code = err.code(),
                    "row commit failed"
                );
                let message = if err.message().is_empty() {
                    err.to_string()
                } else {
                    err.message().to_string()
                };
                progress.failures.push(RowFailure {
                    index,
                    import_key: row.import_key.clone(),
                    message,
                });
            }
        }
    }

    Ok(())
}

fn build_candidate(row: &ImportRow, settings: &UpsertSettings, source_code: &str) -> NewImportedRow {
    NewImportedRow {
        sync_module: settings.sync_module.clone(),
        source: source_code.to_string(),
        import_key: row.import_key.clone(),
        account_import_key: row.account_import_key.clone(),
        name: row.name.clone(),
        reference: row.reference.clone(),
        date: row.date,
        unit_amount: row.unit_amount,
        price_unit: row.price_unit,
        amount: row.amount,
        currency: settings.default_currency.clone(),
        import_user: None,
        analytic_account_id: None,
        product_id: None,
        metadata: None,
        log: None,
        must_force: false,
        data_mapping_id: None,
    }
}
