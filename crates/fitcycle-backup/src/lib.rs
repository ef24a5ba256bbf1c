//! Backup codec for fitcycle
//!
//! Provides:
//! - Versioned JSON snapshot export/import of the full record store
//! - Whole-file validation: shape, per-row domain checks, referential
//!   integrity. Nothing is applied until everything checks out.
//! - Cycle-state restoration: sanitize the supplied state or reconstruct it
//!   from imported sessions
//! - CSV interop: per-kind exports and the bulk-import template

mod restore;
mod snapshot;
mod tabular;
mod validate;

pub use restore::*;
pub use snapshot::*;
pub use tabular::*;
pub use validate::*;

use fitcycle_store::StoreError;
use thiserror::Error;

/// Current supported snapshot schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Backup errors
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Malformed backup input: {0}")]
    MalformedInput(String),

    #[error("Unsupported backup schema version: {0}")]
    UnsupportedSchemaVersion(i64),

    #[error("Invalid {kind} row {index}: {reason}")]
    InvalidRow {
        kind: &'static str,
        index: usize,
        reason: String,
    },

    #[error("Set log {set_log_id} references unknown session {session_id}")]
    OrphanSetLog {
        set_log_id: String,
        session_id: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<serde_json::Error> for BackupError {
    fn from(e: serde_json::Error) -> Self {
        BackupError::Serialization(e.to_string())
    }
}

impl From<csv::Error> for BackupError {
    fn from(e: csv::Error) -> Self {
        BackupError::Csv(e.to_string())
    }
}

pub type BackupResult<T> = Result<T, BackupError>;
