//! Store trait definitions

use chrono::NaiveDate;
use fitcycle_model::{CycleState, Metric, Session, SetLog};
use fitcycle_util::SessionId;

use crate::StoreResult;

/// Main store trait
pub trait RecordStore: Send + Sync {
    // Sessions

    /// Get the session logged for a calendar date, if any
    fn get_session_by_date(&self, date: NaiveDate) -> StoreResult<Option<Session>>;

    /// Upsert a session (unique on date)
    fn put_session(&self, session: &Session) -> StoreResult<()>;

    /// Delete a session by id (its set logs are the caller's concern)
    fn delete_session(&self, id: &SessionId) -> StoreResult<()>;

    /// Sessions with `from <= date <= to`, ascending by date
    fn list_sessions_in_range(&self, from: NaiveDate, to: NaiveDate) -> StoreResult<Vec<Session>>;

    /// Most recently created sessions, newest first
    fn list_recent_sessions(&self, limit: usize) -> StoreResult<Vec<Session>>;

    // Set logs

    /// Append one set log
    fn add_set_log(&self, log: &SetLog) -> StoreResult<()>;

    /// Delete every set log belonging to a session
    fn delete_set_logs_for_session(&self, session_id: &SessionId) -> StoreResult<()>;

    /// Set logs belonging to a session
    fn list_set_logs_for_session(&self, session_id: &SessionId) -> StoreResult<Vec<SetLog>>;

    /// All set logs for one (day, exercise) pair, any date
    fn list_set_logs_for_day_exercise(
        &self,
        day_number: u8,
        exercise_name: &str,
    ) -> StoreResult<Vec<SetLog>>;

    // Metrics

    /// Get the metric row for a date, if any
    fn get_metric_by_date(&self, date: NaiveDate) -> StoreResult<Option<Metric>>;

    /// Upsert a metric row (whole-row; merge is the caller's concern)
    fn put_metric(&self, metric: &Metric) -> StoreResult<()>;

    /// Metrics with `from <= date <= to`, ascending by date
    fn list_metrics_in_range(&self, from: NaiveDate, to: NaiveDate) -> StoreResult<Vec<Metric>>;

    // Cycle state (single slot)

    /// Load the cycle state, if one has been saved
    fn get_state(&self) -> StoreResult<Option<CycleState>>;

    /// Save the cycle state
    fn put_state(&self, state: &CycleState) -> StoreResult<()>;

    // Bulk operations (backup codec only)

    fn list_all_sessions(&self) -> StoreResult<Vec<Session>>;
    fn list_all_set_logs(&self) -> StoreResult<Vec<SetLog>>;
    fn list_all_metrics(&self) -> StoreResult<Vec<Metric>>;

    /// Remove every record of every kind, including the cycle state
    fn clear_all(&self) -> StoreResult<()>;

    fn bulk_put_sessions(&self, sessions: &[Session]) -> StoreResult<()>;
    fn bulk_put_set_logs(&self, logs: &[SetLog]) -> StoreResult<()>;
    fn bulk_put_metrics(&self, metrics: &[Metric]) -> StoreResult<()>;

    // Health

    /// Check if the store is usable
    fn is_healthy(&self) -> bool;
}
