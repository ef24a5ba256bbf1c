//! Snapshot document

use fitcycle_model::{CycleState, Metric, Session, SetLog};
use fitcycle_store::RecordStore;
use serde::{Deserialize, Serialize};

use crate::{BackupResult, SCHEMA_VERSION};

/// Versioned snapshot of the entire record store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub schema_version: u32,
    /// RFC3339 export timestamp
    pub exported_at: String,
    pub sessions: Vec<Session>,
    pub set_logs: Vec<SetLog>,
    pub metrics: Vec<Metric>,
    pub cycle_state: Option<CycleState>,
}

impl Snapshot {
    /// Pretty-printed JSON document
    pub fn to_json(&self) -> BackupResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Export the entire record store as a snapshot
pub fn export_snapshot(store: &dyn RecordStore) -> BackupResult<Snapshot> {
    Ok(Snapshot {
        schema_version: SCHEMA_VERSION,
        exported_at: fitcycle_util::now().to_rfc3339(),
        sessions: store.list_all_sessions()?,
        set_logs: store.list_all_set_logs()?,
        metrics: store.list_all_metrics()?,
        cycle_state: store.get_state()?,
    })
}
