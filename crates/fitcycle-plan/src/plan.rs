//! Validated plan structures

use crate::schema::{RawDay, RawDayType, RawExercise, RawPlan};
use std::collections::BTreeMap;
use std::time::Duration;

/// Rest hint after finishing an isolation exercise
pub const REST_SHORT: Duration = Duration::from_secs(90);

/// Rest hint after finishing a compound (or unclassified) exercise
pub const REST_LONG: Duration = Duration::from_secs(180);

/// Name fragments that classify an exercise as isolation work
const ISOLATION_KEYWORDS: &[&str] = &[
    "curl",
    "raise",
    "fly",
    "pushdown",
    "extension",
    "shrug",
    "plank",
    "crunch",
    "face pull",
    "rotation",
    "wrist",
];

/// Heavy or light day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayType {
    Heavy,
    Light,
}

/// Validated training plan ready for use by the core engine
#[derive(Debug, Clone)]
pub struct Plan {
    pub heavy_reps: u32,
    pub light_reps: u32,
    days: BTreeMap<u8, PlanDay>,
}

impl Plan {
    /// Convert from raw plan (after validation)
    pub fn from_raw(raw: RawPlan) -> Self {
        let days = raw
            .days
            .into_iter()
            .map(|d| (d.number, PlanDay::from_raw(d)))
            .collect();

        Self {
            heavy_reps: raw.meta.heavy_reps,
            light_reps: raw.meta.light_reps,
            days,
        }
    }

    pub(crate) fn from_parts(heavy_reps: u32, light_reps: u32, days: BTreeMap<u8, PlanDay>) -> Self {
        Self {
            heavy_reps,
            light_reps,
            days,
        }
    }

    /// Get a day definition by number (1-5)
    pub fn day(&self, number: u8) -> Option<&PlanDay> {
        self.days.get(&number)
    }

    /// All days in ascending order
    pub fn days(&self) -> impl Iterator<Item = &PlanDay> {
        self.days.values()
    }

    /// Fixed target reps for a day, by its heavy/light type.
    /// Unknown day numbers fall back to the light target.
    pub fn target_reps(&self, day_number: u8) -> u32 {
        match self.day_type(day_number) {
            DayType::Heavy => self.heavy_reps,
            DayType::Light => self.light_reps,
        }
    }

    pub fn day_type(&self, day_number: u8) -> DayType {
        self.days
            .get(&day_number)
            .map(|d| d.day_type)
            .unwrap_or(DayType::Light)
    }
}

/// One validated workout day
#[derive(Debug, Clone)]
pub struct PlanDay {
    pub number: u8,
    pub title: String,
    pub day_type: DayType,
    pub exercises: Vec<Exercise>,
}

impl PlanDay {
    fn from_raw(raw: RawDay) -> Self {
        Self {
            number: raw.number,
            title: raw.title,
            day_type: match raw.day_type {
                RawDayType::Heavy => DayType::Heavy,
                RawDayType::Light => DayType::Light,
            },
            exercises: raw.exercises.into_iter().map(Exercise::from_raw).collect(),
        }
    }

    /// Total number of sets across all exercises
    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.sets).sum()
    }
}

/// One validated exercise
#[derive(Debug, Clone)]
pub struct Exercise {
    pub name: String,
    pub sets: u32,
    pub rest_override: Option<Duration>,
}

impl Exercise {
    fn from_raw(raw: RawExercise) -> Self {
        Self {
            name: raw.name,
            sets: raw.sets,
            rest_override: raw.rest_secs.map(Duration::from_secs),
        }
    }

    /// Suggested rest after the last set of this exercise: the explicit
    /// override when present, otherwise a keyword classification of the name.
    pub fn rest_hint(&self) -> Duration {
        if let Some(rest) = self.rest_override {
            return rest;
        }

        let name = self.name.to_lowercase();
        if ISOLATION_KEYWORDS.iter().any(|kw| name.contains(kw)) {
            REST_SHORT
        } else {
            REST_LONG
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(name: &str, rest_secs: Option<u64>) -> Exercise {
        Exercise {
            name: name.into(),
            sets: 3,
            rest_override: rest_secs.map(Duration::from_secs),
        }
    }

    #[test]
    fn isolation_names_get_short_rest() {
        assert_eq!(exercise("Barbell Curl", None).rest_hint(), REST_SHORT);
        assert_eq!(exercise("Lateral Raises", None).rest_hint(), REST_SHORT);
        assert_eq!(exercise("Rope Pushdown", None).rest_hint(), REST_SHORT);
        assert_eq!(exercise("Face Pulls", None).rest_hint(), REST_SHORT);
    }

    #[test]
    fn compound_names_get_long_rest() {
        assert_eq!(exercise("Barbell Bench Press", None).rest_hint(), REST_LONG);
        assert_eq!(exercise("Back Squat OR Leg Press", None).rest_hint(), REST_LONG);
        assert_eq!(exercise("Romanian Deadlift", None).rest_hint(), REST_LONG);
    }

    #[test]
    fn override_wins_over_classification() {
        let ex = exercise("Barbell Curl", Some(240));
        assert_eq!(ex.rest_hint(), Duration::from_secs(240));
    }
}
