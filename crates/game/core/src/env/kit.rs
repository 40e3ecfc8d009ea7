//! Boss ability kits.

use crate::combat::{DamageType, HitKind};

/// Who a kit ability lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AbilityTarget {
    #[default]
    Tank,
    RandomMember,
    AllMembers,
    /// Boss itself (buffs, self-heal).
    Caster,
}

/// Effect a kit ability applies on resolution.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AbilityEffect {
    /// Direct damage as a multiple of the boss's base damage.
    Damage {
        multiplier: f64,
        damage_type: DamageType,
        kind: HitKind,
    },
    /// Stacking damage-over-time debuff.
    Affliction {
        multiplier_per_tick: f64,
        damage_type: DamageType,
        interval_ticks: u64,
        duration_ticks: u64,
        max_stacks: u8,
    },
    Enrage {
        damage_pct: f64,
        duration_ticks: u64,
    },
    Barrier {
        reduction_pct: f64,
        duration_ticks: u64,
    },
    /// Heals the boss for a fraction of its maximum health.
    Mend { fraction: f64 },
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BossAbility {
    pub id: String,
    pub name: String,
    pub cast_ticks: u64,
    pub cooldown_ticks: u64,
    /// Higher goes first under both shipped priority policies.
    pub priority: i32,
    pub signature: bool,
    pub once_per_fight: bool,
    /// Usable only while boss health ratio is at or below this fraction.
    pub health_gate: Option<f64>,
    pub target: AbilityTarget,
    pub effect: AbilityEffect,
    pub screen_shake: bool,
}

impl Default for BossAbility {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            cast_ticks: 0,
            cooldown_ticks: 100,
            priority: 0,
            signature: false,
            once_per_fight: false,
            health_gate: None,
            target: AbilityTarget::Tank,
            effect: AbilityEffect::Damage {
                multiplier: 1.0,
                damage_type: DamageType::Physical,
                kind: HitKind::Attack,
            },
            screen_shake: false,
        }
    }
}

impl BossAbility {
    pub fn gate_open(&self, health_ratio: f64) -> bool {
        self.health_gate.is_none_or(|gate| health_ratio <= gate)
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BossKit {
    pub id: String,
    pub abilities: Vec<BossAbility>,
    /// Ticks between filler melee swings when nothing is ready.
    pub melee_interval_ticks: u64,
}

impl BossKit {
    pub fn ability(&self, id: &str) -> Option<&BossAbility> {
        self.abilities.iter().find(|a| a.id == id)
    }
}
