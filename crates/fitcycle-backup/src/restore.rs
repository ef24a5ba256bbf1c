//! Snapshot import
//!
//! Validation happens up front; the store is only touched after every row
//! and reference has checked out. The clear-then-bulk-write sequence has no
//! transactional atomicity, but re-running the import after a partial
//! failure is safe: it re-validates and re-clears before writing.

use chrono::NaiveDate;
use fitcycle_core::rebuild_from_sessions;
use fitcycle_model::CycleState;
use fitcycle_store::RecordStore;
use serde_json::Value;
use std::collections::HashSet;
use tracing::info;

use crate::{
    sanitize_cycle_state, validate_metrics, validate_sessions, validate_set_logs, BackupError,
    BackupResult, SCHEMA_VERSION,
};

/// Where the restored cycle state came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSource {
    /// The snapshot carried a structurally valid state
    Supplied,
    /// Reconstructed from imported sessions
    Rebuilt,
}

/// Outcome of a successful import
#[derive(Debug, Clone)]
pub struct RestoreSummary {
    pub sessions: usize,
    pub set_logs: usize,
    pub metrics: usize,
    pub state_source: StateSource,
    pub state: CycleState,
}

/// Import a snapshot document, replacing the entire record store.
///
/// Fails without touching the store on malformed input, unknown schema
/// version, any invalid row, or a set log referencing an unknown session.
pub fn import_snapshot(
    store: &dyn RecordStore,
    raw_json: &str,
    today: NaiveDate,
) -> BackupResult<RestoreSummary> {
    let value: Value = serde_json::from_str(raw_json)
        .map_err(|e| BackupError::MalformedInput(format!("JSON parse failed: {e}")))?;
    let doc = value
        .as_object()
        .ok_or_else(|| BackupError::MalformedInput("backup must be a JSON object".into()))?;

    let version = doc
        .get("schemaVersion")
        .ok_or_else(|| BackupError::MalformedInput("schemaVersion missing".into()))?
        .as_i64()
        .ok_or_else(|| BackupError::MalformedInput("schemaVersion must be an integer".into()))?;
    if version != i64::from(SCHEMA_VERSION) {
        return Err(BackupError::UnsupportedSchemaVersion(version));
    }

    let sessions = validate_sessions(doc.get("sessions"))?;
    let set_logs = validate_set_logs(doc.get("setLogs"))?;
    let metrics = validate_metrics(doc.get("metrics"))?;

    // Referential integrity before anything is written
    let session_ids: HashSet<_> = sessions.iter().map(|s| &s.id).collect();
    if let Some(orphan) = set_logs.iter().find(|l| !session_ids.contains(&l.session_id)) {
        return Err(BackupError::OrphanSetLog {
            set_log_id: orphan.id.to_string(),
            session_id: orphan.session_id.to_string(),
        });
    }

    store.clear_all()?;
    store.bulk_put_sessions(&sessions)?;
    store.bulk_put_set_logs(&set_logs)?;
    store.bulk_put_metrics(&metrics)?;

    let (state, state_source) = match doc.get("cycleState").and_then(sanitize_cycle_state) {
        Some(state) => (state, StateSource::Supplied),
        None => (rebuild_from_sessions(&sessions, today), StateSource::Rebuilt),
    };
    store.put_state(&state)?;

    info!(
        sessions = sessions.len(),
        set_logs = set_logs.len(),
        metrics = metrics.len(),
        state_source = ?state_source,
        "Backup restored"
    );

    Ok(RestoreSummary {
        sessions: sessions.len(),
        set_logs: set_logs.len(),
        metrics: metrics.len(),
        state_source,
        state,
    })
}
