//! Shared data model for fitcycle
//!
//! Three persisted record kinds (Session, SetLog, Metric) plus the singleton
//! CycleState. Serde field names match the backup snapshot contract
//! (camelCase), so a record serializes identically whether it is going into
//! the state table or a backup file.

mod records;
mod state;

pub use records::*;
pub use state::*;

/// Number of workout days in one cycle
pub const WORKOUT_DAYS_PER_CYCLE: u8 = 5;

/// Number of rest days allowed in one cycle
pub const REST_DAYS_PER_CYCLE: u8 = 2;

/// Length of the cycle window in calendar days
pub const CYCLE_WINDOW_DAYS: i64 = 7;
