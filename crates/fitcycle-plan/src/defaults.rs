//! Built-in default plan
//!
//! Five-day split: three heavy days (chest/back/legs) at 6 target reps,
//! two light days at 12. Used whenever no plan file is supplied.

use crate::plan::{DayType, Exercise, Plan, PlanDay};
use std::collections::BTreeMap;

const DEFAULT_HEAVY_REPS: u32 = 6;
const DEFAULT_LIGHT_REPS: u32 = 12;

fn ex(name: &str, sets: u32) -> Exercise {
    Exercise {
        name: name.into(),
        sets,
        rest_override: None,
    }
}

fn day(number: u8, title: &str, day_type: DayType, exercises: Vec<Exercise>) -> (u8, PlanDay) {
    (
        number,
        PlanDay {
            number,
            title: title.into(),
            day_type,
            exercises,
        },
    )
}

/// The built-in 5-day plan
pub fn default_plan() -> Plan {
    let days: BTreeMap<u8, PlanDay> = [
        day(
            1,
            "Day 1 — Heavy Chest + Triceps",
            DayType::Heavy,
            vec![
                ex("Barbell Bench Press", 4),
                ex("Incline DB Press", 3),
                ex("Weighted Dips", 3),
                ex("Cable Fly", 2),
                ex("Close-Grip Bench", 3),
                ex("Rope Pushdown", 2),
                ex("Lateral Raises", 3),
            ],
        ),
        day(
            2,
            "Day 2 — Heavy Back + Biceps",
            DayType::Heavy,
            vec![
                ex("Weighted Pull-Ups", 4),
                ex("Barbell Row", 3),
                ex("One-Arm DB Row", 3),
                ex("Seated Cable Row", 2),
                ex("Face Pulls", 3),
                ex("Barbell Curl", 3),
                ex("Hammer Curl", 2),
                ex("Shrugs", 2),
            ],
        ),
        day(
            3,
            "Day 3 — Legs + Shoulders",
            DayType::Heavy,
            vec![
                ex("Back Squat", 4),
                ex("Romanian Deadlift", 3),
                ex("Leg Curl", 3),
                ex("Walking Lunges", 2),
                ex("Calf Raises", 4),
                ex("Overhead Press", 3),
                ex("Lateral Raises", 3),
                ex("Rear Delt Fly", 3),
                ex("Cable Crunch", 3),
                ex("Cable External Rotations", 2),
            ],
        ),
        day(
            4,
            "Day 4 — Light Chest + Triceps",
            DayType::Light,
            vec![
                ex("Incline Bench", 3),
                ex("Machine Chest Press", 3),
                ex("Push-Ups", 2),
                ex("Cable Fly", 3),
                ex("Overhead Triceps Extension", 3),
                ex("Rope Pushdown", 3),
                ex("Lateral Raises", 3),
            ],
        ),
        day(
            5,
            "Day 5 — Light Back + Biceps",
            DayType::Light,
            vec![
                ex("Lat Pulldown", 3),
                ex("Chest-Supported Row", 3),
                ex("Cable Row", 2),
                ex("Straight-Arm Pulldown", 2),
                ex("Face Pulls", 3),
                ex("Incline DB Curls", 3),
                ex("Cable Curl", 2),
                ex("Wrist Curls", 2),
                ex("Plank", 3),
            ],
        ),
    ]
    .into_iter()
    .collect();

    Plan::from_parts(DEFAULT_HEAVY_REPS, DEFAULT_LIGHT_REPS, days)
}
