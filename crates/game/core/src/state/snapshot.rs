//! UI-facing snapshots of the combat state.

use super::buffers::{FloatingNumber, LogEntry};
use super::cast::ActiveCast;
use super::common::{EnemyId, MemberId, Role, Tick};
use super::context::{CombatContext, RunProgress};
use super::enemy::EnemyBehavior;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CombatPhase {
    #[default]
    Traveling,
    Combat,
    Recovery,
    Defeat,
    Victory,
}

impl CombatPhase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Defeat | Self::Victory)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemberView {
    pub id: MemberId,
    pub name: String,
    pub role: Role,
    pub health: f64,
    pub max_health: f64,
    pub mana: f64,
    pub max_mana: f64,
    pub energy_shield: f64,
    pub max_energy_shield: f64,
    pub is_dead: bool,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyView {
    pub id: EnemyId,
    pub name: String,
    pub behavior: EnemyBehavior,
    pub health: f64,
    pub max_health: f64,
    pub energy_shield: f64,
    pub cast: Option<ActiveCast>,
    pub is_dead: bool,
}

/// Immutable snapshot handed to presentation layers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatState {
    pub phase: CombatPhase,
    pub tick: Tick,
    pub elapsed_secs: f64,
    pub time_remaining_secs: f64,
    pub pull_index: usize,
    pub progress: RunProgress,
    pub team: Vec<MemberView>,
    pub enemies: Vec<EnemyView>,
    pub floating: Vec<FloatingNumber>,
    pub log: Vec<LogEntry>,
}

impl CombatContext {
    /// Captures a snapshot and flushes the floating-number and log buffers into it.
    pub fn snapshot(&mut self) -> CombatState {
        let team = self
            .team
            .iter()
            .map(|m| MemberView {
                id: m.id,
                name: m.name.clone(),
                role: m.role,
                health: m.health.current,
                max_health: m.health.max,
                mana: m.mana.current,
                max_mana: m.mana.max,
                energy_shield: m.energy_shield.current,
                max_energy_shield: m.energy_shield.max,
                is_dead: m.is_dead,
            })
            .collect();
        let enemies = self
            .enemies
            .iter()
            .map(|e| EnemyView {
                id: e.id,
                name: e.name.clone(),
                behavior: e.behavior,
                health: e.health.current,
                max_health: e.health.max,
                energy_shield: e.energy_shield.current,
                cast: e.cast.active().cloned(),
                is_dead: e.is_dead,
            })
            .collect();

        CombatState {
            phase: self.phase,
            tick: self.tick,
            elapsed_secs: self.elapsed_secs(),
            time_remaining_secs: self.time_remaining_secs(),
            pull_index: self.encounter.pull_index,
            progress: self.progress,
            team,
            enemies,
            floating: self.floating.drain(),
            log: self.log.drain(),
        }
    }
}
