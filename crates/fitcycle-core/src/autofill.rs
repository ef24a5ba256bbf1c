//! Autofill engine
//!
//! Reconstructs "last known weight per set" for one (day, exercise) pair
//! from historical set logs.

use chrono::NaiveDate;
use fitcycle_model::SetLog;
use std::collections::BTreeMap;

/// Most recent weight per set number from logs strictly before `cutoff`.
///
/// For each set number the entry with the lexicographically greatest
/// `(date, created_at)` pair wins: most recent calendar date, ties broken by
/// insertion order. Only positive weights are fillable; a set with no
/// qualifying history is simply absent from the result.
pub fn latest_weights(logs: &[SetLog], cutoff: NaiveDate) -> BTreeMap<u32, f64> {
    let mut best: BTreeMap<u32, &SetLog> = BTreeMap::new();

    for log in logs {
        if log.date >= cutoff {
            continue;
        }
        if !(log.weight.is_finite() && log.weight > 0.0) {
            continue;
        }

        match best.get(&log.set_number) {
            Some(current)
                if (current.date, current.created_at) >= (log.date, log.created_at) => {}
            _ => {
                best.insert(log.set_number, log);
            }
        }
    }

    best.into_iter().map(|(set, log)| (set, log.weight)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local};
    use fitcycle_util::{parse_iso_date, SessionId, SetLogId};

    fn d(s: &str) -> NaiveDate {
        parse_iso_date(s).unwrap()
    }

    fn log(date: &str, set_number: u32, weight: f64) -> SetLog {
        SetLog {
            id: SetLogId::generate(),
            session_id: SessionId::new("session-1"),
            date: d(date),
            day_number: 1,
            exercise_name: "Barbell Bench Press".into(),
            set_number,
            reps: 6,
            weight,
            created_at: Local::now(),
        }
    }

    #[test]
    fn most_recent_date_wins() {
        let logs = vec![log("2026-01-01", 1, 180.0), log("2026-01-05", 1, 185.0)];
        let weights = latest_weights(&logs, d("2026-02-01"));
        assert_eq!(weights.get(&1), Some(&185.0));
    }

    #[test]
    fn cutoff_is_exclusive() {
        let logs = vec![log("2026-01-01", 1, 180.0), log("2026-01-05", 1, 185.0)];
        let weights = latest_weights(&logs, d("2026-01-05"));
        assert_eq!(weights.get(&1), Some(&180.0));

        let weights = latest_weights(&logs, d("2026-01-01"));
        assert!(weights.is_empty());
    }

    #[test]
    fn same_date_ties_break_by_insertion_order() {
        let mut older = log("2026-01-05", 1, 180.0);
        let mut newer = log("2026-01-05", 1, 190.0);
        older.created_at = Local::now() - Duration::seconds(60);
        newer.created_at = Local::now();

        // order in the slice must not matter
        let weights = latest_weights(&[newer.clone(), older.clone()], d("2026-02-01"));
        assert_eq!(weights.get(&1), Some(&190.0));

        let weights = latest_weights(&[older, newer], d("2026-02-01"));
        assert_eq!(weights.get(&1), Some(&190.0));
    }

    #[test]
    fn non_positive_weights_are_not_fillable() {
        let logs = vec![log("2026-01-05", 1, 0.0), log("2026-01-01", 2, -5.0)];
        let weights = latest_weights(&logs, d("2026-02-01"));
        assert!(weights.is_empty());
    }

    #[test]
    fn sets_are_independent() {
        let logs = vec![
            log("2026-01-01", 1, 180.0),
            log("2026-01-01", 2, 175.0),
            log("2026-01-05", 2, 177.5),
        ];
        let weights = latest_weights(&logs, d("2026-02-01"));
        assert_eq!(weights.get(&1), Some(&180.0));
        assert_eq!(weights.get(&2), Some(&177.5));
        assert_eq!(weights.get(&3), None);
    }
}
