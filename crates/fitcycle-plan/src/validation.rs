//! Plan validation

use crate::schema::RawPlan;
use std::collections::HashSet;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum PlanValidationError {
    #[error("Day {day}: {message}")]
    DayError { day: u8, message: String },

    #[error("Duplicate day number: {0}")]
    DuplicateDay(u8),

    #[error("Missing day number: {0}")]
    MissingDay(u8),

    #[error("Day {day}, exercise '{exercise}': {message}")]
    ExerciseError {
        day: u8,
        exercise: String,
        message: String,
    },

    #[error("Plan meta error: {0}")]
    MetaError(String),
}

/// Validate a raw plan document
pub fn validate_plan(plan: &RawPlan) -> Vec<PlanValidationError> {
    let mut errors = Vec::new();

    if plan.meta.heavy_reps == 0 {
        errors.push(PlanValidationError::MetaError(
            "heavy_reps must be >= 1".into(),
        ));
    }
    if plan.meta.light_reps == 0 {
        errors.push(PlanValidationError::MetaError(
            "light_reps must be >= 1".into(),
        ));
    }

    let mut seen = HashSet::new();
    for day in &plan.days {
        if !(1..=5).contains(&day.number) {
            errors.push(PlanValidationError::DayError {
                day: day.number,
                message: "day number must be in 1..=5".into(),
            });
            continue;
        }
        if !seen.insert(day.number) {
            errors.push(PlanValidationError::DuplicateDay(day.number));
        }

        if day.title.trim().is_empty() {
            errors.push(PlanValidationError::DayError {
                day: day.number,
                message: "title cannot be empty".into(),
            });
        }
        if day.exercises.is_empty() {
            errors.push(PlanValidationError::DayError {
                day: day.number,
                message: "exercise list cannot be empty".into(),
            });
        }

        for exercise in &day.exercises {
            if exercise.name.trim().is_empty() {
                errors.push(PlanValidationError::ExerciseError {
                    day: day.number,
                    exercise: exercise.name.clone(),
                    message: "name cannot be empty".into(),
                });
            }
            if exercise.sets == 0 {
                errors.push(PlanValidationError::ExerciseError {
                    day: day.number,
                    exercise: exercise.name.clone(),
                    message: "set count must be >= 1".into(),
                });
            }
            if exercise.rest_secs == Some(0) {
                errors.push(PlanValidationError::ExerciseError {
                    day: day.number,
                    exercise: exercise.name.clone(),
                    message: "rest_secs must be positive when present".into(),
                });
            }
        }
    }

    for number in 1..=5u8 {
        if !seen.contains(&number) {
            errors.push(PlanValidationError::MissingDay(number));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RawDay, RawDayType, RawExercise, RawPlanMeta};

    fn raw_day(number: u8) -> RawDay {
        RawDay {
            number,
            title: format!("Day {number}"),
            day_type: if number <= 3 {
                RawDayType::Heavy
            } else {
                RawDayType::Light
            },
            exercises: vec![RawExercise {
                name: "Bench Press".into(),
                sets: 3,
                rest_secs: None,
            }],
        }
    }

    fn raw_plan() -> RawPlan {
        RawPlan {
            plan_version: 1,
            meta: RawPlanMeta {
                heavy_reps: 6,
                light_reps: 12,
            },
            days: (1..=5).map(raw_day).collect(),
        }
    }

    #[test]
    fn valid_plan_has_no_errors() {
        assert!(validate_plan(&raw_plan()).is_empty());
    }

    #[test]
    fn missing_day_is_reported() {
        let mut plan = raw_plan();
        plan.days.remove(4);
        let errors = validate_plan(&plan);
        assert!(errors
            .iter()
            .any(|e| matches!(e, PlanValidationError::MissingDay(5))));
    }

    #[test]
    fn zero_sets_rejected() {
        let mut plan = raw_plan();
        plan.days[0].exercises[0].sets = 0;
        let errors = validate_plan(&plan);
        assert!(errors
            .iter()
            .any(|e| matches!(e, PlanValidationError::ExerciseError { day: 1, .. })));
    }

    #[test]
    fn out_of_range_day_rejected() {
        let mut plan = raw_plan();
        plan.days[0].number = 6;
        let errors = validate_plan(&plan);
        assert!(errors
            .iter()
            .any(|e| matches!(e, PlanValidationError::DayError { day: 6, .. })));
    }
}
