use super::cast::CastState;
use super::common::{MemberId, ResourcePool, Role, Tick, TimedValue};
use super::stats::{CombatCounters, DefensiveStats, OffensiveStats};
use crate::config::CombatConfig;
use crate::env::MemberSpec;
use crate::numeric;
use crate::result::DeathCause;
use crate::talents::TalentModifiers;

/// Member-local timed buffs. Each value lapses at its paired end tick.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemberBuffs {
    /// Damage reduction, percent.
    pub damage_reduction: Option<TimedValue>,
    /// Flat armor bonus.
    pub armor: Option<TimedValue>,
    /// Block chance bonus, percent.
    pub block: Option<TimedValue>,
    /// Stacks backing the armor buff when it comes from blocking.
    pub block_stacks: u8,
}

impl MemberBuffs {
    /// Drops every buff whose end tick has passed. Losing the armor buff also
    /// resets the block stacks behind it.
    pub fn expire(&mut self, now: Tick) {
        if self.damage_reduction.is_some_and(|b| b.is_expired(now)) {
            self.damage_reduction = None;
        }
        if self.armor.is_some_and(|b| b.is_expired(now)) {
            self.armor = None;
            self.block_stacks = 0;
        }
        if self.block.is_some_and(|b| b.is_expired(now)) {
            self.block = None;
        }
    }

    /// Active bonuses, zero when the buff is absent.
    pub fn armor_bonus(&self) -> f64 {
        self.armor.map_or(0.0, |b| b.value)
    }

    pub fn block_bonus(&self) -> f64 {
        self.block.map_or(0.0, |b| b.value)
    }

    pub fn damage_reduction_bonus(&self) -> f64 {
        self.damage_reduction.map_or(0.0, |b| b.value)
    }
}

/// Party member combat state for the duration of one run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamMemberState {
    pub id: MemberId,
    pub name: String,
    pub role: Role,
    pub level: u32,
    pub health: ResourcePool,
    pub mana: ResourcePool,
    pub energy_shield: ResourcePool,
    pub health_regen_pct: f64,
    pub mana_regen_pct: f64,
    pub defense: DefensiveStats,
    pub offense: OffensiveStats,
    pub talents: TalentModifiers,
    pub cast: CastState,
    pub buffs: MemberBuffs,
    /// Tick of the last non-blocked hit; delays energy shield recharge.
    pub last_hit_tick: Option<Tick>,
    /// Next tick the player-action layer may swing.
    pub next_action_tick: Tick,
    pub counters: CombatCounters,
    pub is_dead: bool,
    /// Set once death bookkeeping has run for the current death.
    pub death_tick: Option<Tick>,
    /// The killing blow, captured when the member dies.
    pub death_cause: Option<DeathCause>,
}

impl TeamMemberState {
    /// Builds a member from upstream stats, substituting safe values for degenerate input.
    pub fn from_spec(id: MemberId, spec: &MemberSpec) -> Self {
        let max_health = numeric::sanitize_stat(spec.max_health, 1.0, 1.0, "max_health");
        let max_mana = numeric::sanitize_stat(spec.max_mana, 0.0, 0.0, "max_mana");
        let max_es =
            numeric::sanitize_stat(spec.max_energy_shield, 0.0, 0.0, "max_energy_shield");

        let mut offense = spec.offense;
        offense.accuracy = numeric::sanitize_stat(offense.accuracy, 0.0, 0.0, "accuracy");
        offense.attack_damage =
            numeric::sanitize_stat(offense.attack_damage, 0.0, 0.0, "attack_damage");
        offense.attack_interval_ticks = offense.attack_interval_ticks.max(1);
        offense.heal_power = numeric::non_negative(offense.heal_power);
        offense.crit_multiplier =
            numeric::sanitize_stat(offense.crit_multiplier, 1.0, 1.5, "crit_multiplier");

        Self {
            id,
            name: spec.name.clone(),
            role: spec.role,
            level: spec.level,
            health: ResourcePool::full(max_health),
            mana: ResourcePool::full(max_mana),
            energy_shield: ResourcePool::full(max_es),
            health_regen_pct: numeric::non_negative(spec.health_regen_pct),
            mana_regen_pct: numeric::non_negative(spec.mana_regen_pct),
            defense: spec.defense.sanitized(),
            offense,
            talents: TalentModifiers::fold(&spec.talents),
            cast: CastState::Idle,
            buffs: MemberBuffs::default(),
            last_hit_tick: None,
            next_action_tick: Tick::ZERO,
            counters: CombatCounters::default(),
            is_dead: false,
            death_tick: None,
            death_cause: None,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    /// Re-derives `is_dead` from health after any mutation that lowers it.
    pub fn sync_life(&mut self) {
        self.health.repair();
        self.energy_shield.repair();
        self.mana.repair();
        self.is_dead = self.health.is_empty();
    }

    /// Missing health as a fraction of maximum.
    pub fn missing_health_ratio(&self) -> f64 {
        1.0 - self.health.ratio()
    }

    /// Brings a dead member back with the given fractions of health and mana.
    pub fn revive(&mut self, health_fraction: f64, mana_fraction: f64) -> bool {
        if !self.is_dead {
            return false;
        }
        self.health.set_fraction(health_fraction);
        if self.health.is_empty() {
            self.health.set(1.0);
        }
        self.mana.set_fraction(mana_fraction);
        self.energy_shield.set(0.0);
        self.cast.cancel();
        self.buffs = MemberBuffs::default();
        self.last_hit_tick = None;
        self.death_tick = None;
        self.death_cause = None;
        self.sync_life();
        true
    }

    /// Effective block chance for a hit, including temporary buffs.
    pub fn block_chance(&self, spell: bool) -> f64 {
        let base = if spell {
            self.defense.spell_block_chance
        } else {
            self.defense.block_chance
        };
        numeric::clamp_percent(base + self.buffs.block_bonus(), 0.0, 100.0)
    }

    /// Ticks the energy shield waits after a hit before recharging.
    pub fn es_recharge_delay_ticks(&self) -> u64 {
        let reduction =
            numeric::clamp_percent(self.talents.es_recharge_delay_reduction, 0.0, 100.0);
        CombatConfig::secs_to_ticks(
            CombatConfig::ES_BASE_RECHARGE_DELAY_SECS * (1.0 - reduction / 100.0),
        )
    }
}
