use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::cast::CastState;
use super::common::{EnemyId, MemberId, ResourcePool, Tick};
use super::stats::DefensiveStats;
use crate::combat::DamageType;
use crate::env::{BossKit, CleaveProfile, EnemyTemplate, ScalingParams};
use crate::numeric;
use crate::talents::TalentModifiers;

/// Decision procedure an enemy runs each tick.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EnemyBehavior {
    #[default]
    Melee,
    Archer,
    Caster,
    Aoe,
    Tankbuster,
    Boss,
}

/// Tick at which each of an enemy's cooldowns is ready again.
///
/// Cooldowns are stored as expiry ticks, so advancing the simulation clock
/// elapses every cooldown by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BehaviorCooldowns {
    pub global: Tick,
    pub attack: Tick,
    pub ability: Tick,
    pub cleave: Tick,
}

impl BehaviorCooldowns {
    /// Shared cooldown armed after any action.
    #[inline]
    pub fn global_ready(&self, now: Tick) -> bool {
        now >= self.global
    }

    /// Basic swing timer.
    #[inline]
    pub fn attack_ready(&self, now: Tick) -> bool {
        now >= self.attack
    }

    /// The behavior's special ability.
    #[inline]
    pub fn ability_ready(&self, now: Tick) -> bool {
        now >= self.ability
    }

    #[inline]
    pub fn cleave_ready(&self, now: Tick) -> bool {
        now >= self.cleave
    }
}

/// Boss-only ability bookkeeping.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct BossAbilityState {
    pub kit: Option<Arc<BossKit>>,
    /// Ability id to the tick its cooldown expires.
    pub ready_at: BTreeMap<String, Tick>,
    pub last_used: BTreeMap<String, Tick>,
    pub used_once: BTreeSet<String>,
    /// Tick at which a health-gated ability's gate was first observed open.
    pub gate_opened: BTreeMap<String, Tick>,
    pub legacy_pulse_ready: Tick,
    pub legacy_buster_ready: Tick,
}

impl BossAbilityState {
    pub fn with_kit(kit: Option<Arc<BossKit>>, now: Tick) -> Self {
        use crate::config::CombatConfig;
        Self {
            kit,
            legacy_pulse_ready: now + CombatConfig::LEGACY_PULSE_TICKS,
            legacy_buster_ready: now + CombatConfig::LEGACY_BUSTER_COOLDOWN_TICKS,
            ..Self::default()
        }
    }

    pub fn has_kit(&self) -> bool {
        self.kit.is_some()
    }

    /// Whether `id` is off cooldown. Abilities never used are ready.
    pub fn is_ready(&self, id: &str, now: Tick) -> bool {
        self.ready_at.get(id).is_none_or(|ready| now >= *ready)
    }

    /// Arms the cooldown for `id`. `once` also retires it for the rest of the fight.
    pub fn mark_used(&mut self, id: &str, now: Tick, cooldown_ticks: u64, once: bool) {
        self.ready_at.insert(id.to_owned(), now + cooldown_ticks);
        self.last_used.insert(id.to_owned(), now);
        if once {
            self.used_once.insert(id.to_owned());
        }
    }
}

/// Enemy or boss combat state for one pull.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimatedEnemy {
    pub id: EnemyId,
    pub name: String,
    pub behavior: EnemyBehavior,
    pub health: ResourcePool,
    pub energy_shield: ResourcePool,
    pub defense: DefensiveStats,
    pub talents: TalentModifiers,
    pub accuracy: f64,
    pub damage: f64,
    pub damage_type: DamageType,
    pub attack_interval_ticks: u64,
    pub ability_cooldown_ticks: u64,
    pub cast_ticks: u64,
    pub cleave: Option<CleaveProfile>,
    pub cooldowns: BehaviorCooldowns,
    pub cast: CastState,
    pub last_target: Option<MemberId>,
    pub forces: u32,
    pub boss: Option<BossAbilityState>,
    pub is_dead: bool,
    pub death_tick: Option<Tick>,
}

impl AnimatedEnemy {
    /// Spawns an enemy from its template with pull scaling applied.
    ///
    /// Swings are ready at once; specials start half way through their cooldown.
    pub fn from_template(
        id: EnemyId,
        template: &EnemyTemplate,
        scaling: &ScalingParams,
        now: Tick,
    ) -> Self {
        let health_mult =
            numeric::sanitize_stat(scaling.health_multiplier, 0.0, 1.0, "health_multiplier");
        let damage_mult =
            numeric::sanitize_stat(scaling.damage_multiplier, 0.0, 1.0, "damage_multiplier");
        let max_health =
            numeric::sanitize_stat(template.max_health * health_mult, 1.0, 1.0, "enemy_max_health");
        let max_es = numeric::sanitize_stat(
            template.max_energy_shield * health_mult,
            0.0,
            0.0,
            "enemy_max_es",
        );

        Self {
            id,
            name: template.name.clone(),
            behavior: template.behavior,
            health: ResourcePool::full(max_health),
            energy_shield: ResourcePool::full(max_es),
            defense: template.defense.sanitized(),
            talents: TalentModifiers::default(),
            accuracy: numeric::sanitize_stat(template.accuracy, 0.0, 0.0, "enemy_accuracy"),
            damage: numeric::sanitize_stat(template.damage * damage_mult, 0.0, 0.0, "enemy_damage"),
            damage_type: template.damage_type,
            attack_interval_ticks: template.attack_interval_ticks.max(1),
            ability_cooldown_ticks: template.ability_cooldown_ticks.max(1),
            cast_ticks: template.cast_ticks,
            cleave: template.cleave,
            cooldowns: BehaviorCooldowns {
                global: now,
                attack: now,
                // Specials come off cooldown once before the first use.
                ability: now + template.ability_cooldown_ticks / 2,
                cleave: now + template.cleave.map_or(0, |c| c.cooldown_ticks / 2),
            },
            cast: CastState::Idle,
            last_target: None,
            forces: template.forces,
            boss: None,
            is_dead: false,
            death_tick: None,
        }
    }

    /// Attaches boss ability state and switches the enemy to boss behavior.
    #[must_use]
    pub fn into_boss(mut self, kit: Option<Arc<BossKit>>, now: Tick) -> Self {
        self.behavior = EnemyBehavior::Boss;
        self.boss = Some(BossAbilityState::with_kit(kit, now));
        self
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    #[inline]
    pub fn is_boss(&self) -> bool {
        self.boss.is_some()
    }

    /// Repairs pools after damage and re-derives `is_dead` from health.
    pub fn sync_life(&mut self) {
        self.health.repair();
        self.energy_shield.repair();
        self.is_dead = self.health.is_empty();
    }
}
