#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{rows, MODULE, SOURCE};
use etlshell_core::errors::ImportError;
use etlshell_core::logging_facility::test_capture::init_test_capture;
use etlshell_core::types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_BATCH_ID, FIELD_ERR_CODE, FIELD_FAILED,
    FIELD_INSERTED,
};
use etlshell_core::types::BatchId;
use etlshell_core::{
    batch_upsert, log_op_end, log_op_error, log_op_start, MemoryImportLedger, PassThroughSync,
    UpsertSettings,
};

#[test]
fn test_log_op_end_records_duration() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_1";

    log_op_start!(op_name);
    log_op_end!(op_name, duration_ms = 42);

    capture.assert_event_exists(op_name, EVENT_START);
    let end: Vec<_> = capture
        .events()
        .into_iter()
        .filter(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END))
        .collect();
    assert_eq!(end.len(), 1);
    assert_eq!(end[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_2";

    log_op_error!(op_name, ImportError::ImportKeyRequired { index: 0 }, duration_ms = 3);

    let errors: Vec<_> = capture
        .events()
        .into_iter()
        .filter(|e| e.op.as_deref() == Some(op_name))
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].event.as_deref(), Some(EVENT_END_ERROR));
    assert_eq!(errors[0].field(FIELD_ERR_CODE), Some("ERR_VALIDATION_FAILED"));
    assert_eq!(errors[0].field("err.kind"), Some("ValidationFailed"));
}

#[test]
fn test_batch_upsert_emits_one_start_and_one_end() {
    let capture = init_test_capture();
    let batch_id = BatchId::new();
    let mut ledger = MemoryImportLedger::new();
    let settings = UpsertSettings::new(MODULE, "USD").with_batch_id(batch_id.clone());

    batch_upsert(
        &mut ledger,
        &PassThroughSync::new(SOURCE),
        &settings,
        rows(&["A", "B"]),
    );

    let events = capture.events_with_field(FIELD_BATCH_ID, batch_id.as_str());
    let starts = events
        .iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_START))
        .count();
    let ends: Vec<_> = events
        .iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();
    assert_eq!(starts, 1);
    assert_eq!(ends.len(), 1);
    assert_eq!(ends[0].op.as_deref(), Some("batch_upsert"));
    assert_eq!(ends[0].field(FIELD_INSERTED), Some("2"));
}

#[test]
fn test_batch_upsert_abort_emits_end_error() {
    let capture = init_test_capture();
    let batch_id = BatchId::new();
    let mut ledger = MemoryImportLedger::new();
    let settings = UpsertSettings::new(MODULE, "USD").with_batch_id(batch_id.clone());

    let outcome = batch_upsert(
        &mut ledger,
        &PassThroughSync::new(SOURCE),
        &settings,
        rows(&["A", ""]),
    );

    assert_eq!(outcome.error().and_then(|e| e.batch_id()), Some(&batch_id));
    let events = capture.events_with_field(FIELD_BATCH_ID, batch_id.as_str());
    let errors: Vec<_> = events
        .iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field(FIELD_ERR_CODE), Some("ERR_VALIDATION_FAILED"));
    assert_eq!(errors[0].field(FIELD_INSERTED), Some("1"));
    assert!(!events.iter().any(|e| e.event.as_deref() == Some(EVENT_END)));
}

#[test]
fn test_partial_failure_emits_end_error_with_failed_count() {
    let capture = init_test_capture();
    let batch_id = BatchId::new();
    let mut ledger = MemoryImportLedger::new();
    ledger.fail_commits_for("B");
    let settings = UpsertSettings::new(MODULE, "USD").with_batch_id(batch_id.clone());

    batch_upsert(
        &mut ledger,
        &PassThroughSync::new(SOURCE),
        &settings,
        rows(&["A", "B"]),
    );

    let errors: Vec<_> = capture
        .events_with_field(FIELD_BATCH_ID, batch_id.as_str())
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field(FIELD_ERR_CODE), Some("ERR_PERSISTENCE"));
    assert_eq!(errors[0].field(FIELD_FAILED), Some("1"));
}
