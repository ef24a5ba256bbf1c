//! Persistence layer for fitcycle
//!
//! Provides:
//! - Point lookups and range scans over Sessions, SetLogs and Metrics
//! - The singleton cycle-state record
//! - Bulk list/clear/upsert operations used only by the backup codec
//!
//! The store gives read-your-writes consistency and a unique key on the
//! session date. It does NOT give cross-call transactions; callers compose
//! multi-step sequences idempotently.

mod sqlite;
mod traits;

pub use sqlite::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
