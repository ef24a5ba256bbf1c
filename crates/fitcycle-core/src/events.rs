//! Core events emitted by the engine

use chrono::NaiveDate;

/// Events emitted by the cycle engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// A new 7-day cycle opened (Day 1 workout logged)
    CycleStarted { start_date: NaiveDate },

    /// Workout day logged
    WorkoutLogged { date: NaiveDate, day_number: u8 },

    /// Rest day logged
    RestLogged { date: NaiveDate, rest_days_used: u8 },

    /// 5 workouts + 2 rests are in
    CycleCompleted,

    /// Cycle passed its 7-day window and was reset; `purged_sessions` is the
    /// number of sessions deleted (0 when the cycle had completed)
    CycleExpired { purged_sessions: usize },
}
