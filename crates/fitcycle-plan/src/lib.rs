//! Training plan parsing and validation for fitcycle
//!
//! The 5-day plan the logging sequencer walks is data:
//! - Versioned TOML schema
//! - Day definitions (heavy/light) with fixed target reps
//! - Exercise lists with set counts and optional rest-hint overrides
//! - Validation with clear error messages
//!
//! A built-in default plan is always available; a plan file only overrides it.

mod defaults;
mod plan;
mod schema;
mod validation;

pub use defaults::*;
pub use plan::*;
pub use schema::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Plan loading errors
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Failed to read plan file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<PlanValidationError> },

    #[error("Unsupported plan version: {0}")]
    UnsupportedVersion(u32),
}

pub type PlanResult<T> = Result<T, PlanError>;

/// Current supported plan version
pub const CURRENT_PLAN_VERSION: u32 = 1;

/// Load and validate a plan from a TOML file
pub fn load_plan(path: impl AsRef<Path>) -> PlanResult<Plan> {
    let content = std::fs::read_to_string(path)?;
    parse_plan(&content)
}

/// Parse and validate a plan from a TOML string
pub fn parse_plan(content: &str) -> PlanResult<Plan> {
    let raw: RawPlan = toml::from_str(content)?;

    if raw.plan_version != CURRENT_PLAN_VERSION {
        return Err(PlanError::UnsupportedVersion(raw.plan_version));
    }

    let errors = validate_plan(&raw);
    if !errors.is_empty() {
        return Err(PlanError::ValidationFailed { errors });
    }

    Ok(Plan::from_raw(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_plan() {
        let content = r#"
            plan_version = 1

            [meta]
            heavy_reps = 5
            light_reps = 10

            [[days]]
            number = 1
            title = "Day 1"
            day_type = "heavy"
            exercises = [{ name = "Bench Press", sets = 3 }]

            [[days]]
            number = 2
            title = "Day 2"
            day_type = "heavy"
            exercises = [{ name = "Row", sets = 3 }]

            [[days]]
            number = 3
            title = "Day 3"
            day_type = "heavy"
            exercises = [{ name = "Squat", sets = 3 }]

            [[days]]
            number = 4
            title = "Day 4"
            day_type = "light"
            exercises = [{ name = "Press", sets = 3 }]

            [[days]]
            number = 5
            title = "Day 5"
            day_type = "light"
            exercises = [{ name = "Pulldown", sets = 3 }]
        "#;

        let plan = parse_plan(content).unwrap();
        assert_eq!(plan.target_reps(1), 5);
        assert_eq!(plan.target_reps(4), 10);
        assert_eq!(plan.day(1).unwrap().exercises[0].name, "Bench Press");
    }

    #[test]
    fn reject_wrong_version() {
        let content = r#"
            plan_version = 99
            [meta]
            heavy_reps = 5
            light_reps = 10
        "#;

        let result = parse_plan(content);
        assert!(matches!(result, Err(PlanError::UnsupportedVersion(99))));
    }

    #[test]
    fn reject_invalid_plan() {
        // day 2 missing, day 1 duplicated
        let content = r#"
            plan_version = 1

            [meta]
            heavy_reps = 5
            light_reps = 10

            [[days]]
            number = 1
            title = "Day 1"
            day_type = "heavy"
            exercises = [{ name = "Bench Press", sets = 3 }]

            [[days]]
            number = 1
            title = "Day 1 again"
            day_type = "heavy"
            exercises = [{ name = "Row", sets = 3 }]
        "#;

        let result = parse_plan(content);
        assert!(matches!(result, Err(PlanError::ValidationFailed { .. })));
    }
}
