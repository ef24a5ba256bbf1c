//! Core logic for fitcycle
//!
//! This crate is the heart of the system, containing:
//! - The cycle state machine (Inactive -> Active -> expiry/reset) with every
//!   legality check expressed as a named guarded transition
//! - The cycle engine that persists state changes through the record store
//! - The autofill engine (last known weight per exercise/set)
//! - The workout logging sequencer (the per-set wizard)
//! - Derived stats (streak, trailing-window counts, weight change)

mod autofill;
mod cycle;
mod engine;
mod events;
mod sequencer;
mod stats;

pub use autofill::*;
pub use cycle::*;
pub use engine::*;
pub use events::*;
pub use sequencer::*;
pub use stats::*;

use fitcycle_store::StoreError;
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Plan has no definition for day {0}")]
    PlanDayMissing(u8),

    #[error("Metric value must be positive and finite, got {0}")]
    InvalidMetricValue(f64),
}

pub type CoreResult<T> = Result<T, CoreError>;
