//! Cycle state machine transitions
//!
//! Pure functions over `CycleState`. Every legality rule lives here; the
//! engine wraps these with persistence. A transition that fails leaves the
//! state untouched.

use chrono::NaiveDate;
use fitcycle_model::{
    CycleState, Session, SessionKind, CYCLE_WINDOW_DAYS, REST_DAYS_PER_CYCLE,
};
use fitcycle_util::days_between;
use std::collections::BTreeSet;
use thiserror::Error;

/// Illegal state transitions. The operation is rejected; nothing changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("Cycle has not started; the Day 1 workout starts it")]
    CycleNotStarted,

    #[error("Cycle is complete; no more logs can be added")]
    CycleComplete,

    #[error("Rest limit reached (2/2)")]
    RestLimitReached,

    #[error("A session is already logged for today")]
    AlreadyLoggedToday,

    #[error("Workout day {requested} is out of order; expected day {expected}")]
    InvalidDayOrder { requested: u8, expected: u8 },

    #[error("All five workout days are complete; only rest remains")]
    WorkoutDaysExhausted,
}

/// Whether a workout may be logged today
pub fn can_log_workout(state: &CycleState, has_session_today: bool) -> bool {
    if has_session_today {
        return false;
    }
    if state.is_complete() {
        return false;
    }
    if state.active && state.next_workout_day().is_none() {
        return false;
    }
    true
}

/// Record a workout day.
///
/// From `Inactive` this starts the cycle: day 1 is recorded no matter which
/// day was requested. From `Active`, `day` must be the next due day.
/// Returns the day actually recorded.
pub fn apply_workout(
    state: &mut CycleState,
    today: NaiveDate,
    day: u8,
) -> Result<u8, SequenceError> {
    if !state.active {
        state.active = true;
        state.start_date = Some(today);
        state.completed_workout_days = BTreeSet::from([1]);
        state.rest_days_used = 0;
        return Ok(1);
    }

    if state.is_complete() {
        return Err(SequenceError::CycleComplete);
    }

    let expected = state
        .next_workout_day()
        .ok_or(SequenceError::WorkoutDaysExhausted)?;

    if state.completed_workout_days.contains(&day) || day != expected {
        return Err(SequenceError::InvalidDayOrder {
            requested: day,
            expected,
        });
    }

    state.completed_workout_days.insert(day);
    Ok(day)
}

/// Record a rest day
pub fn apply_rest(state: &mut CycleState, has_session_today: bool) -> Result<(), SequenceError> {
    if !state.active {
        return Err(SequenceError::CycleNotStarted);
    }
    if state.is_complete() {
        return Err(SequenceError::CycleComplete);
    }
    if state.rest_days_used >= REST_DAYS_PER_CYCLE {
        return Err(SequenceError::RestLimitReached);
    }
    if has_session_today {
        return Err(SequenceError::AlreadyLoggedToday);
    }

    state.rest_days_used += 1;
    Ok(())
}

/// What expiry handling is due for a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryAction {
    /// Closed date window `[start, start+6]` whose sessions (and their set
    /// logs) must be purged. `None` when the cycle completed: history is
    /// kept and only the state resets.
    pub purge_window: Option<(NaiveDate, NaiveDate)>,
}

/// Decide expiry handling. `None` means the cycle is inactive or still
/// inside its 7-day window and nothing happens.
pub fn expiry_action(state: &CycleState, today: NaiveDate) -> Option<ExpiryAction> {
    if !state.active {
        return None;
    }

    let Some(start) = state.start_date else {
        // Active without a start date violates the state invariant; reset
        // without touching history.
        return Some(ExpiryAction { purge_window: None });
    };

    if days_between(start, today) <= CYCLE_WINDOW_DAYS - 1 {
        return None;
    }

    let window = (start, start + chrono::Duration::days(CYCLE_WINDOW_DAYS - 1));
    Some(ExpiryAction {
        purge_window: (!state.is_complete()).then_some(window),
    })
}

/// Reconstruct cycle state from raw session history.
///
/// Finds the first workout session dated on/after `today - 6`, then derives
/// the state from every session inside that session's own 7-day window.
/// Falls back to the canonical inactive shape when no such window exists.
pub fn rebuild_from_sessions(sessions: &[Session], today: NaiveDate) -> CycleState {
    let window_floor = today - chrono::Duration::days(CYCLE_WINDOW_DAYS - 1);

    let start = sessions
        .iter()
        .filter(|s| s.kind == SessionKind::Workout)
        .filter(|s| s.date >= window_floor && s.date <= today)
        .map(|s| s.date)
        .min();

    let Some(start) = start else {
        return CycleState::inactive();
    };

    let end = start + chrono::Duration::days(CYCLE_WINDOW_DAYS - 1);
    let in_window = |s: &&Session| s.date >= start && s.date <= end;

    let completed_workout_days: BTreeSet<u8> = sessions
        .iter()
        .filter(in_window)
        .filter(|s| s.kind == SessionKind::Workout)
        .map(|s| s.day_number)
        .filter(|d| (1..=5).contains(d))
        .collect();

    if completed_workout_days.is_empty() {
        return CycleState::inactive();
    }

    let rest_days = sessions
        .iter()
        .filter(in_window)
        .filter(|s| s.kind == SessionKind::Rest)
        .count();

    CycleState {
        active: true,
        start_date: Some(start),
        completed_workout_days,
        rest_days_used: (rest_days as u8).min(REST_DAYS_PER_CYCLE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitcycle_util::parse_iso_date;

    fn d(s: &str) -> NaiveDate {
        parse_iso_date(s).unwrap()
    }

    fn active_state(start: &str, days: &[u8], rest: u8) -> CycleState {
        CycleState {
            active: true,
            start_date: Some(d(start)),
            completed_workout_days: days.iter().copied().collect(),
            rest_days_used: rest,
        }
    }

    #[test]
    fn cold_start_forces_day_one() {
        // Requesting day 3 from inactive still records day 1
        let mut state = CycleState::inactive();
        let recorded = apply_workout(&mut state, d("2026-03-01"), 3).unwrap();

        assert_eq!(recorded, 1);
        assert!(state.active);
        assert_eq!(state.start_date, Some(d("2026-03-01")));
        assert_eq!(state.completed_workout_days, BTreeSet::from([1]));
        assert_eq!(state.rest_days_used, 0);
    }

    #[test]
    fn workout_must_follow_day_order() {
        let mut state = active_state("2026-03-01", &[1], 0);
        let before = state.clone();

        let err = apply_workout(&mut state, d("2026-03-02"), 3).unwrap_err();
        assert_eq!(
            err,
            SequenceError::InvalidDayOrder {
                requested: 3,
                expected: 2
            }
        );
        assert_eq!(state, before);

        // Repeating an already-completed day is also out of order
        let err = apply_workout(&mut state, d("2026-03-02"), 1).unwrap_err();
        assert!(matches!(err, SequenceError::InvalidDayOrder { .. }));
        assert_eq!(state, before);

        assert_eq!(apply_workout(&mut state, d("2026-03-02"), 2), Ok(2));
        assert_eq!(state.completed_workout_days, BTreeSet::from([1, 2]));
    }

    #[test]
    fn sixth_workout_is_rejected() {
        let mut state = active_state("2026-03-01", &[1, 2, 3, 4, 5], 1);
        let err = apply_workout(&mut state, d("2026-03-06"), 1).unwrap_err();
        assert!(matches!(err, SequenceError::WorkoutDaysExhausted));
    }

    #[test]
    fn workout_on_complete_cycle_is_rejected() {
        let mut state = active_state("2026-03-01", &[1, 2, 3, 4, 5], 2);
        let err = apply_workout(&mut state, d("2026-03-07"), 1).unwrap_err();
        assert_eq!(err, SequenceError::CycleComplete);
    }

    #[test]
    fn rest_rules() {
        let mut state = CycleState::inactive();
        assert_eq!(
            apply_rest(&mut state, false),
            Err(SequenceError::CycleNotStarted)
        );

        let mut state = active_state("2026-03-01", &[1], 0);
        assert_eq!(
            apply_rest(&mut state, true),
            Err(SequenceError::AlreadyLoggedToday)
        );

        assert_eq!(apply_rest(&mut state, false), Ok(()));
        assert_eq!(apply_rest(&mut state, false), Ok(()));
        assert_eq!(state.rest_days_used, 2);
        assert_eq!(
            apply_rest(&mut state, false),
            Err(SequenceError::RestLimitReached)
        );
        assert_eq!(state.rest_days_used, 2);
    }

    #[test]
    fn second_rest_completes_cycle() {
        let mut state = active_state("2026-03-01", &[1, 2, 3, 4, 5], 1);
        apply_rest(&mut state, false).unwrap();
        assert!(state.is_complete());
    }

    #[test]
    fn can_log_workout_guards() {
        let state = CycleState::inactive();
        assert!(can_log_workout(&state, false));
        assert!(!can_log_workout(&state, true));

        let complete = active_state("2026-03-01", &[1, 2, 3, 4, 5], 2);
        assert!(!can_log_workout(&complete, false));

        let exhausted = active_state("2026-03-01", &[1, 2, 3, 4, 5], 0);
        assert!(!can_log_workout(&exhausted, false));
    }

    #[test]
    fn expiry_inside_window_is_noop() {
        let state = active_state("2026-03-01", &[1, 2], 0);
        assert_eq!(expiry_action(&state, d("2026-03-07")), None); // day 7 of 7
        assert_eq!(expiry_action(&CycleState::inactive(), d("2026-03-08")), None);
    }

    #[test]
    fn expiry_of_incomplete_cycle_purges_window() {
        let state = active_state("2026-03-01", &[1, 2], 0);
        let action = expiry_action(&state, d("2026-03-08")).unwrap();
        assert_eq!(action.purge_window, Some((d("2026-03-01"), d("2026-03-07"))));
    }

    #[test]
    fn expiry_of_complete_cycle_keeps_history() {
        let state = active_state("2026-03-01", &[1, 2, 3, 4, 5], 2);
        let action = expiry_action(&state, d("2026-03-09")).unwrap();
        assert_eq!(action.purge_window, None);
    }

    #[test]
    fn rebuild_finds_recent_window() {
        let sessions = vec![
            // stale history, outside the trailing window
            Session::workout(d("2026-02-01"), 1),
            // current window: workout on 03-02, rest on 03-03, workout 03-04
            Session::workout(d("2026-03-02"), 1),
            Session::rest(d("2026-03-03")),
            Session::workout(d("2026-03-04"), 2),
        ];

        let state = rebuild_from_sessions(&sessions, d("2026-03-06"));
        assert!(state.active);
        assert_eq!(state.start_date, Some(d("2026-03-02")));
        assert_eq!(state.completed_workout_days, BTreeSet::from([1, 2]));
        assert_eq!(state.rest_days_used, 1);
    }

    #[test]
    fn rebuild_with_no_recent_workout_is_inactive() {
        let sessions = vec![
            Session::workout(d("2026-02-01"), 1),
            Session::rest(d("2026-03-05")),
        ];
        let state = rebuild_from_sessions(&sessions, d("2026-03-10"));
        assert_eq!(state, CycleState::inactive());
    }

    #[test]
    fn rebuild_clamps_rest_days() {
        let sessions = vec![
            Session::workout(d("2026-03-01"), 1),
            Session::rest(d("2026-03-02")),
            Session::rest(d("2026-03-03")),
            Session::rest(d("2026-03-04")),
        ];
        let state = rebuild_from_sessions(&sessions, d("2026-03-05"));
        assert_eq!(state.rest_days_used, 2);
    }
}
