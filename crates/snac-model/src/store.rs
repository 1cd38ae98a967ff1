//! Storage collaborator interface
//!
//! Persistence, versioning and locking live outside the pipeline. The
//! pipeline reads a graph before editing and writes it back after
//! validation; a [`StoreError::Conflict`] is surfaced to the caller as-is,
//! never retried here.

use crate::constellation::Constellation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Editorial status of a stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Published,
    CurrentlyEditing,
    Locked,
    Deleted,
    Unknown,
}

/// Result of a successful write
#[derive(Debug, Clone, PartialEq)]
pub struct WriteReceipt {
    /// Version assigned by storage
    pub version: i64,
    /// Graph as stored, with ids and versions filled in
    pub stored: Constellation,
}

/// Errors reported by the storage collaborator
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Concurrent edit detected by storage
    #[error("conflict on record {id}: expected version {expected}, found {actual}")]
    Conflict { id: i64, expected: i64, actual: i64 },

    /// No record with that id (and version)
    #[error("record not found: {0}")]
    NotFound(i64),

    /// Record is locked by another editor
    #[error("record {id} is locked by {holder}")]
    Locked { id: i64, holder: String },

    /// Backend failure
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Create conflict error
    #[must_use]
    pub fn conflict(id: i64, expected: i64, actual: i64) -> Self {
        Self::Conflict {
            id,
            expected,
            actual,
        }
    }

    /// Whether this is a concurrent-edit conflict
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Storage collaborator
#[async_trait]
pub trait ConstellationStore: Send + Sync {
    /// Read a record, optionally at a specific version
    async fn read(&self, id: i64, version: Option<i64>) -> Result<Constellation, StoreError>;

    /// Current editorial status
    async fn read_status(&self, id: i64) -> Result<RecordStatus, StoreError>;

    /// Write a validated graph
    async fn write(
        &self,
        graph: &Constellation,
        editor: &str,
        change_note: &str,
    ) -> Result<WriteReceipt, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_display_and_predicate() {
        let err = StoreError::conflict(12, 3, 4);
        assert!(err.is_conflict());
        assert_eq!(
            err.to_string(),
            "conflict on record 12: expected version 3, found 4"
        );
        assert!(!StoreError::NotFound(1).is_conflict());
    }
}
