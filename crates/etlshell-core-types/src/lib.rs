//! Core types shared across etl-shell facilities
//!
//! This crate provides the foundational types used by both the error
//! and the logging facilities:
//!
//! - **Correlation types**: BatchId
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::BatchId;
