//! Derived stats over session and metric history

use chrono::NaiveDate;
use fitcycle_model::{Metric, Session, SessionKind};
use std::collections::BTreeSet;

/// Summary block for the status/stats surface
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSummary {
    /// Consecutive tracked days ending at the latest tracked date
    pub streak_days: u32,
    pub workouts_7d: usize,
    pub workouts_30d: usize,
    pub avg_calories_7d: Option<f64>,
    pub avg_calories_14d: Option<f64>,
    /// Last minus first non-null bodyweight over the trailing 14 days
    pub weight_change_14d: Option<f64>,
    pub latest_bodyweight_lb: Option<f64>,
}

/// Dates that have any logged session (workout or rest)
pub fn tracked_dates(sessions: &[Session]) -> BTreeSet<NaiveDate> {
    sessions.iter().map(|s| s.date).collect()
}

/// Length of the consecutive-day run ending at the latest tracked date.
/// Anchored on the latest tracked date, not today: a streak does not break
/// until a day is actually skipped and logged past.
pub fn compute_streak(dates: &BTreeSet<NaiveDate>) -> u32 {
    let Some(&latest) = dates.iter().next_back() else {
        return 0;
    };

    let mut streak = 0u32;
    loop {
        let day = latest - chrono::Duration::days(i64::from(streak));
        if dates.contains(&day) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Number of workout sessions in a slice
pub fn workout_count(sessions: &[Session]) -> usize {
    sessions
        .iter()
        .filter(|s| s.kind == SessionKind::Workout)
        .count()
}

/// Mean of the calorie values that are present
pub fn average_calories(metrics: &[Metric]) -> Option<f64> {
    let values: Vec<f64> = metrics.iter().filter_map(|m| m.calories).collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Last minus first non-null bodyweight (metrics must be date-ascending,
/// which is how the store returns them)
pub fn weight_change(metrics: &[Metric]) -> Option<f64> {
    let first = metrics.iter().find_map(|m| m.bodyweight_lb)?;
    let last = metrics.iter().rev().find_map(|m| m.bodyweight_lb)?;
    Some(last - first)
}

/// Most recent metric row carrying any value
pub fn latest_metric(metrics: &[Metric]) -> Option<&Metric> {
    metrics.iter().rev().find(|m| m.has_data())
}
