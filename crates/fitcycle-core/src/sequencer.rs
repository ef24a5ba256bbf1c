//! Workout logging sequencer
//!
//! A linear walk over (exercise, set) pairs for one plan day. The wizard
//! collects one positive weight per set, suggests a rest duration between
//! exercises, allows backward navigation without losing input, and on finish
//! validates that every set has a weight.

use fitcycle_plan::PlanDay;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Sequencer input errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WizardError {
    #[error("Weight must be a positive number")]
    NonPositiveWeight,

    #[error("Enter a weight for the current set before advancing")]
    WeightRequired,

    #[error("Missing weight for {exercise_name} set {set_number}")]
    Incomplete {
        exercise_name: String,
        set_number: u32,
    },
}

/// Result of advancing one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAdvance {
    /// Moved to the next set of the same exercise
    NextSet,
    /// Crossed an exercise boundary; rest before the next exercise
    NextExercise { rest_hint: Duration },
    /// The walk is past the last set; call `finish`
    Done,
}

/// View of the current step
#[derive(Debug, Clone, PartialEq)]
pub struct StepView<'a> {
    pub exercise_index: usize,
    pub exercise_name: &'a str,
    /// 1-based set position within the exercise
    pub set_number: u32,
    pub target_reps: u32,
    /// Weight currently in the draft for this step, if any (autofilled or
    /// previously entered)
    pub weight: Option<f64>,
}

/// Finished draft, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedWorkout {
    pub day_number: u8,
    pub target_reps: u32,
    pub sets: Vec<CompletedSet>,
}

/// One collected set
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedSet {
    pub exercise_name: String,
    pub set_number: u32,
    pub weight: f64,
}

#[derive(Debug)]
struct ExerciseSlots {
    name: String,
    rest_hint: Duration,
    weights: Vec<Option<f64>>,
}

/// The per-set logging wizard for one plan day
#[derive(Debug)]
pub struct WorkoutWizard {
    day_number: u8,
    day_title: String,
    target_reps: u32,
    exercises: Vec<ExerciseSlots>,
    pos: usize,
}

impl WorkoutWizard {
    /// Build a wizard for a plan day with empty slots
    pub fn new(day: &PlanDay, target_reps: u32) -> Self {
        let exercises = day
            .exercises
            .iter()
            .map(|e| ExerciseSlots {
                name: e.name.clone(),
                rest_hint: e.rest_hint(),
                weights: vec![None; e.sets as usize],
            })
            .collect();

        Self {
            day_number: day.number,
            day_title: day.title.clone(),
            target_reps,
            exercises,
            pos: 0,
        }
    }

    pub fn day_number(&self) -> u8 {
        self.day_number
    }

    pub fn day_title(&self) -> &str {
        &self.day_title
    }

    pub fn target_reps(&self) -> u32 {
        self.target_reps
    }

    /// Total number of steps (sets) in the walk
    pub fn step_count(&self) -> usize {
        self.exercises.iter().map(|e| e.weights.len()).sum()
    }

    /// Current 0-based step position
    pub fn position(&self) -> usize {
        self.pos
    }

    fn locate(&self, pos: usize) -> (usize, usize) {
        let mut remaining = pos;
        for (i, exercise) in self.exercises.iter().enumerate() {
            if remaining < exercise.weights.len() {
                return (i, remaining);
            }
            remaining -= exercise.weights.len();
        }
        // pos is clamped by the navigation methods
        let last = self.exercises.len() - 1;
        (last, self.exercises[last].weights.len() - 1)
    }

    /// View of the current step
    pub fn current(&self) -> StepView<'_> {
        let (ex_idx, set_idx) = self.locate(self.pos);
        let exercise = &self.exercises[ex_idx];
        StepView {
            exercise_index: ex_idx,
            exercise_name: &exercise.name,
            set_number: set_idx as u32 + 1,
            target_reps: self.target_reps,
            weight: exercise.weights[set_idx],
        }
    }

    /// Fill empty slots of one exercise with suggested weights
    /// (set number -> weight). Values the user already entered are kept.
    pub fn prefill_exercise(&mut self, exercise_index: usize, suggested: &BTreeMap<u32, f64>) {
        let Some(exercise) = self.exercises.get_mut(exercise_index) else {
            return;
        };
        for (set_idx, slot) in exercise.weights.iter_mut().enumerate() {
            if slot.is_some() {
                continue;
            }
            if let Some(&w) = suggested.get(&(set_idx as u32 + 1)) {
                if w > 0.0 {
                    *slot = Some(w);
                }
            }
        }
    }

    /// Record a weight for the current step
    pub fn enter_weight(&mut self, weight: f64) -> Result<(), WizardError> {
        if !(weight.is_finite() && weight > 0.0) {
            return Err(WizardError::NonPositiveWeight);
        }
        let (ex_idx, set_idx) = self.locate(self.pos);
        self.exercises[ex_idx].weights[set_idx] = Some(weight);
        Ok(())
    }

    /// Advance past the current step. Requires a positive weight in the
    /// current slot.
    pub fn advance(&mut self) -> Result<StepAdvance, WizardError> {
        let (ex_idx, set_idx) = self.locate(self.pos);
        let exercise = &self.exercises[ex_idx];
        if exercise.weights[set_idx].is_none() {
            return Err(WizardError::WeightRequired);
        }

        if self.pos + 1 >= self.step_count() {
            return Ok(StepAdvance::Done);
        }

        let leaving_exercise = set_idx + 1 == exercise.weights.len();
        let rest_hint = exercise.rest_hint;
        self.pos += 1;

        if leaving_exercise {
            Ok(StepAdvance::NextExercise { rest_hint })
        } else {
            Ok(StepAdvance::NextSet)
        }
    }

    /// Step backward. Entered values are kept. Returns false at the first step.
    pub fn back(&mut self) -> bool {
        if self.pos == 0 {
            return false;
        }
        self.pos -= 1;
        true
    }

    /// Validate the full draft and produce the completed workout.
    ///
    /// If any set is missing a weight the wizard repositions itself to the
    /// first missing step and reports it, rather than failing silently.
    pub fn finish(&mut self) -> Result<CompletedWorkout, WizardError> {
        let mut pos = 0;
        for exercise in &self.exercises {
            for (set_idx, slot) in exercise.weights.iter().enumerate() {
                let filled = matches!(slot, Some(w) if *w > 0.0);
                if !filled {
                    self.pos = pos;
                    return Err(WizardError::Incomplete {
                        exercise_name: exercise.name.clone(),
                        set_number: set_idx as u32 + 1,
                    });
                }
                pos += 1;
            }
        }

        let sets = self
            .exercises
            .iter()
            .flat_map(|exercise| {
                exercise.weights.iter().enumerate().map(|(set_idx, slot)| {
                    CompletedSet {
                        exercise_name: exercise.name.clone(),
                        set_number: set_idx as u32 + 1,
                        // validated above
                        weight: slot.unwrap_or_default(),
                    }
                })
            })
            .collect();

        Ok(CompletedWorkout {
            day_number: self.day_number,
            target_reps: self.target_reps,
            sets,
        })
    }
}
