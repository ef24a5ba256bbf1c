//! SQLite-based store implementation

use chrono::NaiveDate;
use fitcycle_model::{CycleState, Metric, Session, SessionKind, SetLog};
use fitcycle_util::{format_iso_date, parse_iso_date, parse_timestamp, SessionId};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::{RecordStore, StoreError, StoreResult};

/// SQLite-based record store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            r#"
            -- Sessions: one per calendar day
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL UNIQUE,
                kind TEXT NOT NULL,
                day_number INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Set logs: one per completed set
            CREATE TABLE IF NOT EXISTS set_logs (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                date TEXT NOT NULL,
                day_number INTEGER NOT NULL,
                exercise_name TEXT NOT NULL,
                set_number INTEGER NOT NULL,
                reps INTEGER NOT NULL,
                weight REAL NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Metrics: one per calendar day
            CREATE TABLE IF NOT EXISTS metrics (
                date TEXT PRIMARY KEY,
                bodyweight_lb REAL,
                calories REAL,
                updated_at TEXT NOT NULL
            );

            -- Cycle state (single row)
            CREATE TABLE IF NOT EXISTS cycle_state (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                state_json TEXT NOT NULL
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_sessions_created ON sessions(created_at);
            CREATE INDEX IF NOT EXISTS idx_set_logs_session ON set_logs(session_id);
            CREATE INDEX IF NOT EXISTS idx_set_logs_day_exercise
                ON set_logs(day_number, exercise_name);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

// Row tuples as read from SQLite, before date/timestamp parsing
type SessionRow = (String, String, String, i64, String, String);
type SetLogRow = (String, String, String, i64, String, i64, i64, f64, String);
type MetricRow = (String, Option<f64>, Option<f64>, String);

fn parse_date_field(table: &str, value: &str) -> StoreResult<NaiveDate> {
    parse_iso_date(value)
        .ok_or_else(|| StoreError::Database(format!("bad date in {table} row: {value}")))
}

fn parse_ts_field(table: &str, value: &str) -> StoreResult<chrono::DateTime<chrono::Local>> {
    parse_timestamp(value)
        .ok_or_else(|| StoreError::Database(format!("bad timestamp in {table} row: {value}")))
}

fn session_from_row(row: SessionRow) -> StoreResult<Session> {
    let (id, date, kind, day_number, created_at, updated_at) = row;
    Ok(Session {
        id: SessionId::new(id),
        date: parse_date_field("sessions", &date)?,
        kind: SessionKind::parse(&kind)
            .ok_or_else(|| StoreError::Database(format!("bad session kind: {kind}")))?,
        day_number: day_number as u8,
        created_at: parse_ts_field("sessions", &created_at)?,
        updated_at: parse_ts_field("sessions", &updated_at)?,
    })
}

fn set_log_from_row(row: SetLogRow) -> StoreResult<SetLog> {
    let (id, session_id, date, day_number, exercise_name, set_number, reps, weight, created_at) =
        row;
    Ok(SetLog {
        id: id.into(),
        session_id: SessionId::new(session_id),
        date: parse_date_field("set_logs", &date)?,
        day_number: day_number as u8,
        exercise_name,
        set_number: set_number as u32,
        reps: reps as u32,
        weight,
        created_at: parse_ts_field("set_logs", &created_at)?,
    })
}

fn metric_from_row(row: MetricRow) -> StoreResult<Metric> {
    let (date, bodyweight_lb, calories, updated_at) = row;
    Ok(Metric {
        date: parse_date_field("metrics", &date)?,
        bodyweight_lb,
        calories,
        updated_at: parse_ts_field("metrics", &updated_at)?,
    })
}

const SESSION_COLS: &str = "id, date, kind, day_number, created_at, updated_at";
const SET_LOG_COLS: &str =
    "id, session_id, date, day_number, exercise_name, set_number, reps, weight, created_at";
const METRIC_COLS: &str = "date, bodyweight_lb, calories, updated_at";

impl SqliteStore {
    fn insert_session(conn: &Connection, session: &Session) -> StoreResult<()> {
        conn.execute(
            r#"
            INSERT INTO sessions (id, date, kind, day_number, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id)
            DO UPDATE SET
                date = excluded.date,
                kind = excluded.kind,
                day_number = excluded.day_number,
                updated_at = excluded.updated_at
            "#,
            params![
                session.id.as_str(),
                format_iso_date(session.date),
                session.kind.as_str(),
                i64::from(session.day_number),
                session.created_at.to_rfc3339(),
                session.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn insert_set_log(conn: &Connection, log: &SetLog) -> StoreResult<()> {
        conn.execute(
            r#"
            INSERT INTO set_logs
                (id, session_id, date, day_number, exercise_name,
                 set_number, reps, weight, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id)
            DO UPDATE SET
                session_id = excluded.session_id,
                date = excluded.date,
                day_number = excluded.day_number,
                exercise_name = excluded.exercise_name,
                set_number = excluded.set_number,
                reps = excluded.reps,
                weight = excluded.weight
            "#,
            params![
                log.id.as_str(),
                log.session_id.as_str(),
                format_iso_date(log.date),
                i64::from(log.day_number),
                log.exercise_name,
                i64::from(log.set_number),
                i64::from(log.reps),
                log.weight,
                log.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn insert_metric(conn: &Connection, metric: &Metric) -> StoreResult<()> {
        conn.execute(
            r#"
            INSERT INTO metrics (date, bodyweight_lb, calories, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(date)
            DO UPDATE SET
                bodyweight_lb = excluded.bodyweight_lb,
                calories = excluded.calories,
                updated_at = excluded.updated_at
            "#,
            params![
                format_iso_date(metric.date),
                metric.bodyweight_lb,
                metric.calories,
                metric.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

impl RecordStore for SqliteStore {
    fn get_session_by_date(&self, date: NaiveDate) -> StoreResult<Option<Session>> {
        let conn = self.conn.lock().unwrap();

        let row: Option<SessionRow> = conn
            .query_row(
                &format!("SELECT {SESSION_COLS} FROM sessions WHERE date = ?"),
                [format_iso_date(date)],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                },
            )
            .optional()?;

        row.map(session_from_row).transpose()
    }

    fn put_session(&self, session: &Session) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        Self::insert_session(&conn, session)?;
        debug!(session_id = %session.id, date = %session.date, "Session saved");
        Ok(())
    }

    fn delete_session(&self, id: &SessionId) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM sessions WHERE id = ?", [id.as_str()])?;
        Ok(())
    }

    fn list_sessions_in_range(&self, from: NaiveDate, to: NaiveDate) -> StoreResult<Vec<Session>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT {SESSION_COLS} FROM sessions WHERE date >= ? AND date <= ? ORDER BY date ASC"
        ))?;
        let rows = stmt.query_map(params![format_iso_date(from), format_iso_date(to)], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(session_from_row(row?)?);
        }
        Ok(sessions)
    }

    fn list_recent_sessions(&self, limit: usize) -> StoreResult<Vec<Session>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT {SESSION_COLS} FROM sessions ORDER BY created_at DESC LIMIT ?"
        ))?;
        let rows = stmt.query_map([limit], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(session_from_row(row?)?);
        }
        Ok(sessions)
    }

    fn add_set_log(&self, log: &SetLog) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        Self::insert_set_log(&conn, log)?;
        Ok(())
    }

    fn delete_set_logs_for_session(&self, session_id: &SessionId) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM set_logs WHERE session_id = ?",
            [session_id.as_str()],
        )?;
        if deleted > 0 {
            debug!(session_id = %session_id, deleted, "Set logs deleted");
        }
        Ok(())
    }

    fn list_set_logs_for_session(&self, session_id: &SessionId) -> StoreResult<Vec<SetLog>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT {SET_LOG_COLS} FROM set_logs WHERE session_id = ?
             ORDER BY exercise_name ASC, set_number ASC"
        ))?;
        let rows = stmt.query_map([session_id.as_str()], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
                row.get(8)?,
            ))
        })?;

        let mut logs = Vec::new();
        for row in rows {
            logs.push(set_log_from_row(row?)?);
        }
        Ok(logs)
    }

    fn list_set_logs_for_day_exercise(
        &self,
        day_number: u8,
        exercise_name: &str,
    ) -> StoreResult<Vec<SetLog>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT {SET_LOG_COLS} FROM set_logs
             WHERE day_number = ? AND exercise_name = ?
             ORDER BY date ASC, created_at ASC"
        ))?;
        let rows = stmt.query_map(params![i64::from(day_number), exercise_name], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
                row.get(8)?,
            ))
        })?;

        let mut logs = Vec::new();
        for row in rows {
            logs.push(set_log_from_row(row?)?);
        }
        Ok(logs)
    }

    fn get_metric_by_date(&self, date: NaiveDate) -> StoreResult<Option<Metric>> {
        let conn = self.conn.lock().unwrap();

        let row: Option<MetricRow> = conn
            .query_row(
                &format!("SELECT {METRIC_COLS} FROM metrics WHERE date = ?"),
                [format_iso_date(date)],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        row.map(metric_from_row).transpose()
    }

    fn put_metric(&self, metric: &Metric) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        Self::insert_metric(&conn, metric)?;
        debug!(date = %metric.date, "Metric saved");
        Ok(())
    }

    fn list_metrics_in_range(&self, from: NaiveDate, to: NaiveDate) -> StoreResult<Vec<Metric>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT {METRIC_COLS} FROM metrics WHERE date >= ? AND date <= ? ORDER BY date ASC"
        ))?;
        let rows = stmt.query_map(params![format_iso_date(from), format_iso_date(to)], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?;

        let mut metrics = Vec::new();
        for row in rows {
            metrics.push(metric_from_row(row?)?);
        }
        Ok(metrics)
    }

    fn get_state(&self) -> StoreResult<Option<CycleState>> {
        let conn = self.conn.lock().unwrap();

        let json: Option<String> = conn
            .query_row(
                "SELECT state_json FROM cycle_state WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(s) => {
                let state: CycleState = serde_json::from_str(&s)?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    fn put_state(&self, state: &CycleState) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let json = serde_json::to_string(state)?;

        conn.execute(
            r#"
            INSERT INTO cycle_state (id, state_json)
            VALUES (1, ?)
            ON CONFLICT(id)
            DO UPDATE SET state_json = excluded.state_json
            "#,
            [json],
        )?;

        debug!("Cycle state saved");
        Ok(())
    }

    fn list_all_sessions(&self) -> StoreResult<Vec<Session>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT {SESSION_COLS} FROM sessions ORDER BY date ASC"
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(session_from_row(row?)?);
        }
        Ok(sessions)
    }

    fn list_all_set_logs(&self) -> StoreResult<Vec<SetLog>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT {SET_LOG_COLS} FROM set_logs ORDER BY date ASC, created_at ASC"
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
                row.get(8)?,
            ))
        })?;

        let mut logs = Vec::new();
        for row in rows {
            logs.push(set_log_from_row(row?)?);
        }
        Ok(logs)
    }

    fn list_all_metrics(&self) -> StoreResult<Vec<Metric>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!("SELECT {METRIC_COLS} FROM metrics ORDER BY date ASC"))?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?;

        let mut metrics = Vec::new();
        for row in rows {
            metrics.push(metric_from_row(row?)?);
        }
        Ok(metrics)
    }

    fn clear_all(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            DELETE FROM set_logs;
            DELETE FROM sessions;
            DELETE FROM metrics;
            DELETE FROM cycle_state;
            "#,
        )?;
        debug!("All records cleared");
        Ok(())
    }

    fn bulk_put_sessions(&self, sessions: &[Session]) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        for session in sessions {
            Self::insert_session(&conn, session)?;
        }
        debug!(count = sessions.len(), "Sessions bulk-written");
        Ok(())
    }

    fn bulk_put_set_logs(&self, logs: &[SetLog]) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        for log in logs {
            Self::insert_set_log(&conn, log)?;
        }
        debug!(count = logs.len(), "Set logs bulk-written");
        Ok(())
    }

    fn bulk_put_metrics(&self, metrics: &[Metric]) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        for metric in metrics {
            Self::insert_metric(&conn, metric)?;
        }
        debug!(count = metrics.len(), "Metrics bulk-written");
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}
