//! The single mutable simulation state for one run.

use super::buffers::{BoundedBuffer, DamageLogEntry, FloatKind, FloatingNumber, LogEntry};
use super::common::{ActorRef, EnemyId, MemberId, Tick};
use super::effects::{BossBuffState, PartyBuffState, PartyDebuffState};
use super::enemy::AnimatedEnemy;
use super::member::TeamMemberState;
use super::snapshot::CombatPhase;
use crate::config::CombatConfig;
use crate::env::MemberSpec;
use crate::rng::CombatRng;

/// Notable things that happened during a tick, drained by the host each tick.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEvent {
    MemberDied {
        member: MemberId,
        killer: Option<String>,
    },
    EnemyDied {
        enemy: EnemyId,
        forces: u32,
    },
    MemberRevived {
        member: MemberId,
    },
    CastStarted {
        caster: EnemyId,
        ability: String,
        target: Option<MemberId>,
        end_tick: Tick,
    },
    CastResolved {
        caster: EnemyId,
        ability: String,
    },
    BossAbility {
        boss: EnemyId,
        ability: String,
    },
    ScreenShake {
        intensity: f64,
    },
    BloodlustStarted,
}

/// Where in the dungeon the current combat is happening.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncounterInfo {
    pub pull_index: usize,
    pub is_gate: bool,
    pub is_boss: bool,
}

/// Dungeon progress counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunProgress {
    pub forces_killed: u32,
    pub forces_required: u32,
    pub pulls_cleared: usize,
    pub total_pulls: usize,
    pub boss_defeated: bool,
}

impl RunProgress {
    /// Fraction of the dungeon completed. Forces drive it when the dungeon requires any.
    pub fn fraction(&self) -> f64 {
        let raw = if self.forces_required > 0 {
            f64::from(self.forces_killed) / f64::from(self.forces_required)
        } else if self.total_pulls > 0 {
            self.pulls_cleared as f64 / self.total_pulls as f64
        } else {
            0.0
        };
        crate::numeric::clamp_unit(raw)
    }
}

/// Mutable state of a dungeon run.
///
/// Owned by the run loop; each phase receives it by mutable reference and
/// leaves it consistent before returning.
#[derive(Clone, Debug)]
pub struct CombatContext {
    pub config: CombatConfig,
    pub tick: Tick,
    pub phase: CombatPhase,
    pub team: Vec<TeamMemberState>,
    pub enemies: Vec<AnimatedEnemy>,
    pub party_debuffs: PartyDebuffState,
    pub party_buffs: PartyBuffState,
    pub boss_buffs: BossBuffState,
    pub rng: CombatRng,
    pub floating: BoundedBuffer<FloatingNumber>,
    pub log: BoundedBuffer<LogEntry>,
    pub damage_log: BoundedBuffer<DamageLogEntry>,
    pub events: Vec<CombatEvent>,
    pub encounter: EncounterInfo,
    pub progress: RunProgress,
    /// Hard limit on simulated time; zero disables it.
    pub time_limit_ticks: u64,
    /// Ticks spent in combat (not traveling or recovering).
    pub combat_ticks: u64,
    pub seed: u64,
}

impl CombatContext {
    pub fn new(config: CombatConfig, party: &[MemberSpec], seed: u64) -> Self {
        let team = party
            .iter()
            .enumerate()
            .map(|(i, spec)| TeamMemberState::from_spec(MemberId(i as u16), spec))
            .collect();
        Self {
            floating: BoundedBuffer::new(config.floating_capacity),
            log: BoundedBuffer::new(config.log_capacity),
            damage_log: BoundedBuffer::new(config.damage_log_capacity),
            config,
            tick: Tick::ZERO,
            phase: CombatPhase::Traveling,
            team,
            enemies: Vec::new(),
            party_debuffs: PartyDebuffState::default(),
            party_buffs: PartyBuffState::default(),
            boss_buffs: BossBuffState::default(),
            rng: CombatRng::new(seed),
            events: Vec::new(),
            encounter: EncounterInfo::default(),
            progress: RunProgress::default(),
            time_limit_ticks: 0,
            combat_ticks: 0,
            seed,
        }
    }

    #[must_use]
    pub fn with_time_limit_secs(mut self, secs: f64) -> Self {
        self.time_limit_ticks = CombatConfig::secs_to_ticks(secs);
        self
    }

    #[must_use]
    pub fn with_progress(mut self, forces_required: u32, total_pulls: usize) -> Self {
        self.progress.forces_required = forces_required;
        self.progress.total_pulls = total_pulls;
        self
    }

    /// Simulated seconds elapsed in the run.
    pub fn elapsed_secs(&self) -> f64 {
        self.tick.as_secs()
    }

    pub fn time_remaining_secs(&self) -> f64 {
        if self.time_limit_ticks == 0 {
            return 0.0;
        }
        Tick(self.time_limit_ticks.saturating_sub(self.tick.0)).as_secs()
    }

    pub fn is_timed_out(&self) -> bool {
        self.time_limit_ticks > 0 && self.tick.0 >= self.time_limit_ticks
    }

    pub fn begin_travel(&mut self, pull_index: usize) {
        self.phase = CombatPhase::Traveling;
        self.encounter.pull_index = pull_index;
        self.enemies.clear();
        self.boss_buffs.clear();
        self.party_debuffs.clear();
        for member in &mut self.team {
            member.cast.cancel();
        }
    }

    pub fn begin_pull(&mut self, enemies: Vec<AnimatedEnemy>, encounter: EncounterInfo) {
        self.enemies = enemies;
        self.encounter = encounter;
        self.phase = CombatPhase::Combat;
        self.boss_buffs.clear();
    }

    pub fn begin_recovery(&mut self) {
        self.phase = CombatPhase::Recovery;
        self.enemies.clear();
        self.party_debuffs.clear();
        self.boss_buffs.clear();
    }

    pub fn member(&self, id: MemberId) -> Option<&TeamMemberState> {
        self.team.get(id.index())
    }

    pub fn member_mut(&mut self, id: MemberId) -> Option<&mut TeamMemberState> {
        self.team.get_mut(id.index())
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&AnimatedEnemy> {
        self.enemies.get(id.index())
    }

    pub fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut AnimatedEnemy> {
        self.enemies.get_mut(id.index())
    }

    pub fn living_members(&self) -> Vec<MemberId> {
        self.team
            .iter()
            .filter(|m| m.is_alive())
            .map(|m| m.id)
            .collect()
    }

    pub fn alive_enemies(&self) -> Vec<EnemyId> {
        self.enemies
            .iter()
            .filter(|e| e.is_alive())
            .map(|e| e.id)
            .collect()
    }

    pub fn all_members_dead(&self) -> bool {
        self.team.iter().all(|m| m.is_dead)
    }

    pub fn all_enemies_dead(&self) -> bool {
        self.enemies.iter().all(|e| e.is_dead)
    }

    /// Display name of an actor for logs and death attribution.
    pub fn actor_name(&self, actor: ActorRef) -> String {
        match actor {
            ActorRef::Member(id) => self
                .member(id)
                .map_or_else(|| id.to_string(), |m| m.name.clone()),
            ActorRef::Enemy(id) => self
                .enemy(id)
                .map_or_else(|| id.to_string(), |e| e.name.clone()),
            ActorRef::Environment => String::from("environment"),
        }
    }

    /// Most recent damage-log entry against `member`.
    pub fn last_damage_to(&self, member: MemberId) -> Option<&DamageLogEntry> {
        self.damage_log.iter().rev().find(|entry| entry.target == member)
    }

    pub fn push_log(&mut self, message: impl Into<String>) {
        let entry = LogEntry {
            tick: self.tick,
            message: message.into(),
        };
        self.log.push(entry);
    }

    pub fn push_floating(&mut self, target: ActorRef, amount: f64, kind: FloatKind) {
        let entry = FloatingNumber {
            tick: self.tick,
            target,
            amount,
            kind,
        };
        self.floating.push(entry);
    }

    pub fn emit(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }
}
