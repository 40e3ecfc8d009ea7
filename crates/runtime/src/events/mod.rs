//! Topic-based event bus for run events.
//!
//! The loop publishes throttled snapshots, per-tick combat events and run
//! lifecycle events; consumers subscribe only to the topics they need.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{CombatRecord, PullCleared, RunEvent};
