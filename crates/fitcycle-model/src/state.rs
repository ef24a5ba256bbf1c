//! Cycle state data
//!
//! The singleton record the cycle state machine operates on. Pure queries
//! live here; guarded transitions live in fitcycle-core.

use crate::{REST_DAYS_PER_CYCLE, WORKOUT_DAYS_PER_CYCLE};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// State of the current 7-day cycle.
///
/// Invariant: `active == false` implies the canonical inactive shape
/// (`start_date == None`, no completed days, no rest days used).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleState {
    pub active: bool,
    /// Set only while active
    pub start_date: Option<NaiveDate>,
    /// Subset of {1..5}
    pub completed_workout_days: BTreeSet<u8>,
    /// 0..=2
    pub rest_days_used: u8,
}

impl CycleState {
    /// The canonical inactive shape
    pub fn inactive() -> Self {
        Self {
            active: false,
            start_date: None,
            completed_workout_days: BTreeSet::new(),
            rest_days_used: 0,
        }
    }

    /// A cycle is complete when all 5 workout days and both rest days are in
    pub fn is_complete(&self) -> bool {
        self.completed_workout_days.len() == usize::from(WORKOUT_DAYS_PER_CYCLE)
            && self.rest_days_used == REST_DAYS_PER_CYCLE
    }

    /// Lowest workout day in 1..=5 not yet completed, or `None` if all done
    pub fn next_workout_day(&self) -> Option<u8> {
        (1..=WORKOUT_DAYS_PER_CYCLE).find(|d| !self.completed_workout_days.contains(d))
    }

    /// Rest days still available in this cycle
    pub fn rest_days_left(&self) -> u8 {
        REST_DAYS_PER_CYCLE.saturating_sub(self.rest_days_used)
    }
}

impl Default for CycleState {
    fn default() -> Self {
        Self::inactive()
    }
}
