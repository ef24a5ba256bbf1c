//! Raw plan schema (as parsed from TOML)

use serde::{Deserialize, Serialize};

/// Raw plan document as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawPlan {
    /// Plan schema version
    pub plan_version: u32,

    /// Rep targets per day type
    pub meta: RawPlanMeta,

    /// Day definitions; must cover days 1-5 exactly once each
    #[serde(default)]
    pub days: Vec<RawDay>,
}

/// Rep targets
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawPlanMeta {
    pub heavy_reps: u32,
    pub light_reps: u32,
}

/// One workout day definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawDay {
    /// Position in the 5-day sequence (1-5)
    pub number: u8,

    /// Display title
    pub title: String,

    /// Heavy or light day
    pub day_type: RawDayType,

    /// Exercise list, in execution order
    #[serde(default)]
    pub exercises: Vec<RawExercise>,
}

/// Raw day type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RawDayType {
    Heavy,
    Light,
}

/// One exercise definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawExercise {
    pub name: String,

    /// Number of sets (>= 1)
    pub sets: u32,

    /// Explicit between-exercise rest hint in seconds; when absent the
    /// hint is derived from the exercise name (isolation vs compound)
    #[serde(default)]
    pub rest_secs: Option<u64>,
}
