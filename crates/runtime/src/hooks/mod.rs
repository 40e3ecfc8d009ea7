//! Host callbacks invoked by the run loop.
//!
//! Hooks cover the side effects a host attaches to a run: experience and
//! loot bookkeeping, death penalties, camera shake and a throttled view of
//! the fight. Every method defaults to a no-op, so hosts override only what
//! they use. Hooks are awaited inline, between ticks.

use async_trait::async_trait;

use game_core::{CombatState, RunResult};

use crate::events::PullCleared;

/// Callbacks for run milestones. Every method defaults to a no-op.
///
/// Hooks are awaited inline by the run loop, so slow hooks slow the run.
#[async_trait]
pub trait RunHooks: Send {
    /// Experience awarded by a pull clear or by the completion reward.
    async fn on_experience(&mut self, _amount: u64) {}

    /// A wiped run; `dead` lists the members who were dead at the end.
    async fn on_death_penalty(&mut self, _dead: &[String]) {}

    /// Orb, key and loot accumulation point after every cleared pull.
    async fn on_pull_cleared(&mut self, _pull: &PullCleared) {}

    async fn on_screen_shake(&mut self, _intensity: f64) {}

    /// Called at the snapshot interval with the flushed floating numbers and log.
    async fn on_snapshot(&mut self, _state: &CombatState) {}

    async fn on_run_finished(&mut self, _result: &RunResult) {}
}

/// Hooks that ignore everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

#[async_trait]
impl RunHooks for NoopHooks {}
