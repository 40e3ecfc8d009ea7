//! Dungeon, pull and enemy definitions.

use crate::combat::DamageType;
use crate::error::CombatError;
use crate::state::{DefensiveStats, EnemyBehavior};

/// Secondary area swing a melee enemy performs on its own cooldown.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CleaveProfile {
    pub cooldown_ticks: u64,
    /// Fraction of base damage dealt to each living member.
    pub factor: f64,
}

/// Enemy stat template. Scaled and instantiated per pull.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnemyTemplate {
    pub name: String,
    pub behavior: EnemyBehavior,
    pub max_health: f64,
    pub max_energy_shield: f64,
    pub defense: DefensiveStats,
    pub accuracy: f64,
    pub damage: f64,
    pub damage_type: DamageType,
    /// Ticks between basic attacks.
    pub attack_interval_ticks: u64,
    /// Ticks between special actions (bolt, party hit, tank buster).
    pub ability_cooldown_ticks: u64,
    pub cast_ticks: u64,
    pub cleave: Option<CleaveProfile>,
    /// Forces credited when this enemy dies.
    pub forces: u32,
}

impl EnemyTemplate {
    pub fn new(name: impl Into<String>, behavior: EnemyBehavior) -> Self {
        Self {
            name: name.into(),
            behavior,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_damage(mut self, damage: f64) -> Self {
        self.damage = damage;
        self
    }

    #[must_use]
    pub fn with_health(mut self, max_health: f64) -> Self {
        self.max_health = max_health;
        self
    }

    #[must_use]
    pub fn with_attack_interval(mut self, ticks: u64) -> Self {
        self.attack_interval_ticks = ticks;
        self
    }

    #[must_use]
    pub fn with_ability(mut self, cooldown_ticks: u64, cast_ticks: u64) -> Self {
        self.ability_cooldown_ticks = cooldown_ticks;
        self.cast_ticks = cast_ticks;
        self
    }
}

impl Default for EnemyTemplate {
    fn default() -> Self {
        Self {
            name: String::from("enemy"),
            behavior: EnemyBehavior::Melee,
            max_health: 100.0,
            max_energy_shield: 0.0,
            defense: DefensiveStats::default(),
            accuracy: 100.0,
            damage: 10.0,
            damage_type: DamageType::Physical,
            attack_interval_ticks: 20,
            ability_cooldown_ticks: 80,
            cast_ticks: 20,
            cleave: None,
            forces: 1,
        }
    }
}

/// Boss stat template plus an optional ability kit reference.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BossTemplate {
    pub stats: EnemyTemplate,
    /// Kit id resolved through the encounter oracle. `None` selects the legacy rotation.
    pub kit: Option<String>,
}

/// One scripted group of enemies.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PullDefinition {
    pub name: String,
    pub enemies: Vec<EnemyTemplate>,
    /// Gate pulls hold a miniboss; area cooldowns are shortened.
    pub is_gate: bool,
    pub travel_ticks: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BossPull {
    pub boss: BossTemplate,
    pub adds: Vec<EnemyTemplate>,
    pub travel_ticks: Option<u64>,
}

/// Experience and currency table for a dungeon.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RewardTable {
    pub experience_per_force: u64,
    pub currency_per_pull: u64,
    pub completion_experience: u64,
    pub completion_currency: u64,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DungeonDefinition {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub time_limit_secs: f64,
    pub required_forces: u32,
    pub pulls: Vec<PullDefinition>,
    pub boss: BossPull,
    pub rewards: RewardTable,
}

impl DungeonDefinition {
    /// Trash pulls plus the boss pull.
    pub fn total_pulls(&self) -> usize {
        self.pulls.len() + 1
    }

    /// Rejects definitions a run cannot start from.
    pub fn validate(&self) -> Result<(), CombatError> {
        let invalid = |reason| CombatError::InvalidDungeon {
            id: self.id.clone(),
            reason,
        };
        if self.id.is_empty() {
            return Err(invalid("missing id"));
        }
        if !self.time_limit_secs.is_finite() || self.time_limit_secs < 0.0 {
            return Err(invalid("time limit must be a non-negative number of seconds"));
        }
        if self.pulls.iter().any(|pull| pull.enemies.is_empty()) {
            return Err(invalid("every pull needs at least one enemy"));
        }
        Ok(())
    }
}

/// Order in which trash pulls are taken. Empty means every pull in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RoutePlan {
    pub pulls: Vec<usize>,
}

impl RoutePlan {
    /// Resolves the plan against a dungeon, dropping indices that do not exist.
    pub fn resolve<'a>(&self, dungeon: &'a DungeonDefinition) -> Vec<(usize, &'a PullDefinition)> {
        if self.pulls.is_empty() {
            return dungeon.pulls.iter().enumerate().collect();
        }
        self.pulls
            .iter()
            .filter_map(|&index| match dungeon.pulls.get(index) {
                Some(pull) => Some((index, pull)),
                None => {
                    tracing::error!(
                        target: "combat::env",
                        index,
                        dungeon = %dungeon.id,
                        "route references unknown pull; skipped"
                    );
                    None
                }
            })
            .collect()
    }
}

/// Difficulty scaling applied to every enemy when a pull starts.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScalingParams {
    pub health_multiplier: f64,
    pub damage_multiplier: f64,
}

impl Default for ScalingParams {
    fn default() -> Self {
        Self {
            health_multiplier: 1.0,
            damage_multiplier: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pulls_are_rejected() {
        let dungeon = DungeonDefinition {
            id: String::from("crypt"),
            pulls: vec![PullDefinition::default()],
            ..DungeonDefinition::default()
        };
        assert!(matches!(
            dungeon.validate(),
            Err(CombatError::InvalidDungeon { reason, .. }) if reason.contains("enemy")
        ));
    }

    #[test]
    fn route_skips_unknown_pulls() {
        let dungeon = DungeonDefinition {
            id: String::from("crypt"),
            pulls: vec![PullDefinition::default(), PullDefinition::default()],
            ..DungeonDefinition::default()
        };
        let route = RoutePlan { pulls: vec![1, 7, 0] };
        let order: Vec<_> = route.resolve(&dungeon).into_iter().map(|(i, _)| i).collect();
        assert_eq!(order, vec![1, 0]);
    }
}
