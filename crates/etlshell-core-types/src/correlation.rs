//! Correlation identifiers
//!
//! Every `batch_upsert` or load call gets a `BatchId` so that its start,
//! per-row and end events can be stitched back together from the logs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for one import batch (one `batch_upsert` or load call)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(String);

impl BatchId {
    /// Generate a new time-ordered BatchId (UUIDv7)
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap an identifier supplied by the caller (e.g. the sync job's run id)
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
