//! Structured logging facility
//!
//! - Single initialization point via `init(profile)`
//! - Boundary macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use etlshell_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! Operations that own a boundary (`batch_upsert`, `load_rows`,
//! `load_pending`) emit exactly one start and one end/end_error event.
//! Everything below them logs with `tracing::debug!` or `tracing::warn!`.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
