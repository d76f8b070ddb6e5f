//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names identical across the reconciler, the
//! load step and the store.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_BATCH_ID: &str = "batch_id";

// Import identifiers
pub const FIELD_SYNC_MODULE: &str = "sync_module";
pub const FIELD_SOURCE: &str = "source";
pub const FIELD_IMPORT_KEY: &str = "import_key";
pub const FIELD_ROW_INDEX: &str = "row_index";

// Batch counters
pub const FIELD_ROWS: &str = "rows";
pub const FIELD_INSERTED: &str = "inserted";
pub const FIELD_SKIPPED: &str = "skipped";
pub const FIELD_FAILED: &str = "failed";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
