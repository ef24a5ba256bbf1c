//! Row validators for snapshot import
//!
//! Each validator turns loosely-typed rows into typed, sanitized records or
//! a structured failure naming the row and the reason. Import never proceeds
//! past an invalid row.

use chrono::{DateTime, Local, NaiveDate};
use fitcycle_model::{CycleState, Metric, Session, SessionKind, SetLog};
use fitcycle_util::{parse_iso_date, parse_timestamp, SessionId};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;

use crate::BackupError;

fn row_err(kind: &'static str, index: usize, reason: impl Into<String>) -> BackupError {
    BackupError::InvalidRow {
        kind,
        index,
        reason: reason.into(),
    }
}

fn require_array<'a>(value: Option<&'a Value>, field: &str) -> Result<&'a Vec<Value>, BackupError> {
    value
        .and_then(Value::as_array)
        .ok_or_else(|| BackupError::MalformedInput(format!("{field} must be an array")))
}

/// Integer in a closed range, rejecting floats like 2.5
fn int_in_range(
    value: Option<f64>,
    min: i64,
    max: i64,
    kind: &'static str,
    index: usize,
    field: &str,
) -> Result<i64, BackupError> {
    let v = value.ok_or_else(|| row_err(kind, index, format!("{field} missing")))?;
    if !v.is_finite() || v.fract() != 0.0 {
        return Err(row_err(kind, index, format!("{field} must be an integer")));
    }
    let v = v as i64;
    if v < min || v > max {
        return Err(row_err(
            kind,
            index,
            format!("{field} must be in {min}..={max}"),
        ));
    }
    Ok(v)
}

fn parse_date_for(
    raw: Option<&str>,
    kind: &'static str,
    index: usize,
    field: &str,
) -> Result<NaiveDate, BackupError> {
    raw.and_then(parse_iso_date)
        .ok_or_else(|| row_err(kind, index, format!("{field} must be YYYY-MM-DD")))
}

fn parse_ts_for(
    raw: Option<&str>,
    kind: &'static str,
    index: usize,
    field: &str,
) -> Result<DateTime<Local>, BackupError> {
    raw.and_then(parse_timestamp)
        .ok_or_else(|| row_err(kind, index, format!("{field} must be an RFC3339 timestamp")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSessionRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    day_number: Option<f64>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

/// Validate the sessions array of a snapshot
pub fn validate_sessions(value: Option<&Value>) -> Result<Vec<Session>, BackupError> {
    let rows = require_array(value, "sessions")?;
    let mut out = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let raw: RawSessionRow = serde_json::from_value(row.clone())
            .map_err(|e| row_err("session", index, e.to_string()))?;

        let id = raw
            .id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| row_err("session", index, "id missing or empty"))?;
        let date = parse_date_for(raw.date.as_deref(), "session", index, "date")?;
        let kind = raw
            .kind
            .as_deref()
            .and_then(SessionKind::parse)
            .ok_or_else(|| row_err("session", index, "type must be WORKOUT or REST"))?;
        let day_number = int_in_range(raw.day_number, 0, 5, "session", index, "dayNumber")? as u8;
        let created_at = parse_ts_for(raw.created_at.as_deref(), "session", index, "createdAt")?;
        let updated_at = parse_ts_for(raw.updated_at.as_deref(), "session", index, "updatedAt")?;

        out.push(Session {
            id: SessionId::new(id),
            date,
            kind,
            day_number,
            created_at,
            updated_at,
        });
    }

    Ok(out)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSetLogRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    exercise_name: Option<String>,
    #[serde(default)]
    day_number: Option<f64>,
    #[serde(default)]
    set_number: Option<f64>,
    #[serde(default)]
    reps: Option<f64>,
    #[serde(default)]
    weight: Option<f64>,
    #[serde(default)]
    created_at: Option<String>,
}

/// Validate the setLogs array of a snapshot
pub fn validate_set_logs(value: Option<&Value>) -> Result<Vec<SetLog>, BackupError> {
    let rows = require_array(value, "setLogs")?;
    let mut out = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let raw: RawSetLogRow = serde_json::from_value(row.clone())
            .map_err(|e| row_err("setLog", index, e.to_string()))?;

        let id = raw
            .id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| row_err("setLog", index, "id missing or empty"))?;
        let session_id = raw
            .session_id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| row_err("setLog", index, "sessionId missing or empty"))?;
        let date = parse_date_for(raw.date.as_deref(), "setLog", index, "date")?;
        let exercise_name = raw
            .exercise_name
            .filter(|s| !s.is_empty())
            .ok_or_else(|| row_err("setLog", index, "exerciseName missing or empty"))?;
        let day_number = int_in_range(raw.day_number, 0, 5, "setLog", index, "dayNumber")? as u8;
        let set_number =
            int_in_range(raw.set_number, 1, i64::from(u32::MAX), "setLog", index, "setNumber")?
                as u32;
        let reps =
            int_in_range(raw.reps, 0, i64::from(u32::MAX), "setLog", index, "reps")? as u32;
        let weight = raw
            .weight
            .filter(|w| w.is_finite() && *w >= 0.0)
            .ok_or_else(|| row_err("setLog", index, "weight must be a non-negative number"))?;
        let created_at = parse_ts_for(raw.created_at.as_deref(), "setLog", index, "createdAt")?;

        out.push(SetLog {
            id: id.into(),
            session_id: SessionId::new(session_id),
            date,
            day_number,
            exercise_name,
            set_number,
            reps,
            weight,
            created_at,
        });
    }

    Ok(out)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetricRow {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    bodyweight_lb: Option<f64>,
    #[serde(default)]
    calories: Option<f64>,
    #[serde(default)]
    updated_at: Option<String>,
}

/// Validate the metrics array of a snapshot
pub fn validate_metrics(value: Option<&Value>) -> Result<Vec<Metric>, BackupError> {
    let rows = require_array(value, "metrics")?;
    let mut out = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let raw: RawMetricRow = serde_json::from_value(row.clone())
            .map_err(|e| row_err("metric", index, e.to_string()))?;

        let date = parse_date_for(raw.date.as_deref(), "metric", index, "date")?;
        if let Some(bw) = raw.bodyweight_lb {
            if !(bw.is_finite() && bw > 0.0) {
                return Err(row_err(
                    "metric",
                    index,
                    "bodyweightLb must be positive when present",
                ));
            }
        }
        if let Some(cal) = raw.calories {
            if !(cal.is_finite() && cal > 0.0) {
                return Err(row_err(
                    "metric",
                    index,
                    "calories must be positive when present",
                ));
            }
        }
        let updated_at = parse_ts_for(raw.updated_at.as_deref(), "metric", index, "updatedAt")?;

        out.push(Metric {
            date,
            bodyweight_lb: raw.bodyweight_lb,
            calories: raw.calories,
            updated_at,
        });
    }

    Ok(out)
}

/// Salvage a structurally valid cycle state from a snapshot.
///
/// Days outside 1..=5 are dropped, rest days are clamped to 0..=2, and an
/// inactive state is forced to the canonical inactive shape. Returns `None`
/// when the payload is unsalvageable (active without a parseable start
/// date); the caller reconstructs from sessions instead.
pub fn sanitize_cycle_state(value: &Value) -> Option<CycleState> {
    let obj = value.as_object()?;

    let active = obj.get("active").and_then(Value::as_bool).unwrap_or(false);
    if !active {
        return Some(CycleState::inactive());
    }

    let start_date = obj
        .get("startDate")
        .and_then(Value::as_str)
        .and_then(parse_iso_date)?;

    let completed_workout_days: BTreeSet<u8> = obj
        .get("completedWorkoutDays")
        .and_then(Value::as_array)
        .map(|days| {
            days.iter()
                .filter_map(Value::as_u64)
                .filter(|d| (1..=5).contains(d))
                .map(|d| d as u8)
                .collect()
        })
        .unwrap_or_default();

    let rest_days_used = obj
        .get("restDaysUsed")
        .and_then(Value::as_u64)
        .unwrap_or(0)
        .min(2) as u8;

    Some(CycleState {
        active: true,
        start_date: Some(start_date),
        completed_workout_days,
        rest_days_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn session_rows_validate() {
        let rows = json!([{
            "id": "session-1",
            "date": "2026-03-01",
            "type": "WORKOUT",
            "dayNumber": 1,
            "createdAt": "2026-03-01T10:00:00+00:00",
            "updatedAt": "2026-03-01T10:00:00+00:00"
        }]);

        let sessions = validate_sessions(Some(&rows)).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].day_number, 1);
        assert_eq!(sessions[0].kind, SessionKind::Workout);
    }

    #[test]
    fn session_day_number_out_of_domain() {
        let rows = json!([{
            "id": "session-1",
            "date": "2026-03-01",
            "type": "WORKOUT",
            "dayNumber": 9,
            "createdAt": "2026-03-01T10:00:00+00:00",
            "updatedAt": "2026-03-01T10:00:00+00:00"
        }]);

        let err = validate_sessions(Some(&rows)).unwrap_err();
        assert!(matches!(
            err,
            BackupError::InvalidRow { kind: "session", index: 0, .. }
        ));
    }

    #[test]
    fn sessions_must_be_an_array() {
        let err = validate_sessions(Some(&json!("nope"))).unwrap_err();
        assert!(matches!(err, BackupError::MalformedInput(_)));
        let err = validate_sessions(None).unwrap_err();
        assert!(matches!(err, BackupError::MalformedInput(_)));
    }

    #[test]
    fn set_log_set_number_must_be_positive() {
        let rows = json!([{
            "id": "set-1",
            "sessionId": "session-1",
            "date": "2026-03-01",
            "exerciseName": "Bench",
            "dayNumber": 1,
            "setNumber": 0,
            "reps": 6,
            "weight": 185.0,
            "createdAt": "2026-03-01T10:00:00+00:00"
        }]);

        let err = validate_set_logs(Some(&rows)).unwrap_err();
        assert!(matches!(err, BackupError::InvalidRow { kind: "setLog", .. }));
    }

    #[test]
    fn metric_rejects_non_positive_values() {
        let rows = json!([{
            "date": "2026-03-01",
            "bodyweightLb": -1.0,
            "updatedAt": "2026-03-01T10:00:00+00:00"
        }]);

        let err = validate_metrics(Some(&rows)).unwrap_err();
        assert!(matches!(err, BackupError::InvalidRow { kind: "metric", .. }));
    }

    #[test]
    fn sanitize_filters_days_and_clamps_rest() {
        let raw = json!({
            "active": true,
            "startDate": "2026-03-01",
            "completedWorkoutDays": [1, 2, 9, 0, 2],
            "restDaysUsed": 7
        });

        let state = sanitize_cycle_state(&raw).unwrap();
        assert_eq!(state.completed_workout_days, BTreeSet::from([1, 2]));
        assert_eq!(state.rest_days_used, 2);
        assert_eq!(state.start_date, Some(parse_iso_date("2026-03-01").unwrap()));
    }

    #[test]
    fn sanitize_forces_canonical_inactive_shape() {
        let raw = json!({
            "active": false,
            "startDate": "2026-03-01",
            "completedWorkoutDays": [1, 2],
            "restDaysUsed": 1
        });

        assert_eq!(sanitize_cycle_state(&raw), Some(CycleState::inactive()));
    }

    #[test]
    fn sanitize_rejects_active_without_start_date() {
        let raw = json!({
            "active": true,
            "completedWorkoutDays": [1],
            "restDaysUsed": 0
        });

        assert_eq!(sanitize_cycle_state(&raw), None);
        assert_eq!(sanitize_cycle_state(&json!(null)), None);
    }
}
