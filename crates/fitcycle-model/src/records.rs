//! Persisted record types

use chrono::{DateTime, Local, NaiveDate};
use fitcycle_util::{SessionId, SetLogId};
use serde::{Deserialize, Serialize};

/// Whether a logged day was a workout or a rest day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionKind {
    #[serde(rename = "WORKOUT")]
    Workout,
    #[serde(rename = "REST")]
    Rest,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Workout => "WORKOUT",
            SessionKind::Rest => "REST",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "WORKOUT" => Some(SessionKind::Workout),
            "REST" => Some(SessionKind::Rest),
            _ => None,
        }
    }
}

/// One logged calendar day. At most one Session exists per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: SessionKind,
    /// 0 for rest days, 1-5 for workout days
    pub day_number: u8,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
}

impl Session {
    /// New workout session for `date`, position `day_number` in the plan
    pub fn workout(date: NaiveDate, day_number: u8) -> Self {
        let now = fitcycle_util::now();
        Self {
            id: SessionId::generate(),
            date,
            kind: SessionKind::Workout,
            day_number,
            created_at: now,
            updated_at: now,
        }
    }

    /// New rest session for `date`
    pub fn rest(date: NaiveDate) -> Self {
        let now = fitcycle_util::now();
        Self {
            id: SessionId::generate(),
            date,
            kind: SessionKind::Rest,
            day_number: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One completed set within a workout session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLog {
    pub id: SetLogId,
    pub session_id: SessionId,
    pub date: NaiveDate,
    pub day_number: u8,
    pub exercise_name: String,
    /// 1-based set position within the exercise
    pub set_number: u32,
    /// Target reps for the day type; fixed, not per-set
    pub reps: u32,
    pub weight: f64,
    pub created_at: DateTime<Local>,
}

/// Daily body metrics, keyed by date (at most one record per date)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub date: NaiveDate,
    #[serde(default)]
    pub bodyweight_lb: Option<f64>,
    #[serde(default)]
    pub calories: Option<f64>,
    pub updated_at: DateTime<Local>,
}

impl Metric {
    /// Empty metric row for `date`
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            bodyweight_lb: None,
            calories: None,
            updated_at: fitcycle_util::now(),
        }
    }

    /// True if the row carries at least one value
    pub fn has_data(&self) -> bool {
        self.bodyweight_lb.is_some() || self.calories.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_kind_strings() {
        assert_eq!(SessionKind::Workout.as_str(), "WORKOUT");
        assert_eq!(SessionKind::parse("REST"), Some(SessionKind::Rest));
        assert_eq!(SessionKind::parse("rest"), None);
    }

    #[test]
    fn session_serializes_with_contract_field_names() {
        let session = Session::workout(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(), 2);
        let json = serde_json::to_value(&session).unwrap();

        assert_eq!(json["type"], "WORKOUT");
        assert_eq!(json["dayNumber"], 2);
        assert_eq!(json["date"], "2026-03-01");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }

    #[test]
    fn rest_session_has_day_zero() {
        let session = Session::rest(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(session.kind, SessionKind::Rest);
        assert_eq!(session.day_number, 0);
    }

    #[test]
    fn metric_round_trip() {
        let metric = Metric {
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            bodyweight_lb: Some(212.4),
            calories: None,
            updated_at: fitcycle_util::now(),
        };

        let json = serde_json::to_string(&metric).unwrap();
        assert!(json.contains("bodyweightLb"));

        let parsed: Metric = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.bodyweight_lb, Some(212.4));
        assert_eq!(parsed.calories, None);
        assert!(parsed.has_data());
    }
}
