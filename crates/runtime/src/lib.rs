//! Async orchestration for dungeon runs.
//!
//! This crate drives the deterministic `game-core` simulation through a whole
//! dungeon: pull sequencing, travel, recovery between pulls, the real-time or
//! batch tick loop, and the result. Hosts build a [`Runner`], steer it through
//! a [`RunHandle`], and observe it through the event bus and [`RunHooks`].
//!
//! Modules are organized by responsibility:
//! - [`runner`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`hooks`] defines the host callback surface
//! - [`providers`] ships the default player-action resolver
//! - `workers` keeps the run loop and pacing internal to the crate
pub mod api;
pub mod events;
pub mod hooks;
pub mod providers;
pub mod runner;

mod workers;

pub use api::{Result, RunHandle, RuntimeError};
pub use events::{CombatRecord, Event, EventBus, PullCleared, RunEvent, Topic};
pub use hooks::{NoopHooks, RunHooks};
pub use providers::AutoAttackResolver;
pub use runner::{RunTask, Runner, RunnerBuilder};
pub use workers::ExecutionMode;
