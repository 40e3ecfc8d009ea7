//! Tasks that back run orchestration.
//!
//! The simulation loop owns the combat context for the whole run; the pacer
//! decides how the loop suspends between ticks.

mod pacing;
mod simulation;

pub use pacing::ExecutionMode;

pub(crate) use pacing::Pacer;
pub(crate) use simulation::{RunLoop, RunPlan};
