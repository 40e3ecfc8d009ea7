//! Event types for different topics.

use serde::Serialize;

use game_core::{CombatEvent, CombatPhase, RecoveryReport, Reward, RunResult, Tick};

/// A combat event stamped with the tick it happened on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombatRecord {
    pub tick: Tick,
    pub event: CombatEvent,
}

/// A cleared trash or boss pull and what it paid out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PullCleared {
    pub pull_index: usize,
    pub name: String,
    pub is_boss: bool,
    /// Forces credited by this pull.
    pub forces: u32,
    pub reward: Reward,
    pub tick: Tick,
}

/// Run lifecycle events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RunEvent {
    Started {
        dungeon: String,
        seed: u64,
        /// Trash pulls on the route plus the boss.
        pulls: usize,
    },
    PhaseChanged {
        phase: CombatPhase,
        pull_index: usize,
        tick: Tick,
    },
    PullStarted {
        pull_index: usize,
        name: String,
        is_gate: bool,
        is_boss: bool,
        enemies: usize,
        tick: Tick,
    },
    PullCleared(PullCleared),
    RecoveryFinished {
        report: RecoveryReport,
        tick: Tick,
    },
    Finished(Box<RunResult>),
    /// External stop; no result is produced.
    Stopped {
        tick: Tick,
    },
}
