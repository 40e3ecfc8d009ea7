use std::collections::BTreeMap;

use crate::combat::{DamageType, Resistances};
use crate::numeric;

/// Defensive stat block shared by party members and enemies.
///
/// Chances are percentages out of 100; armor and evasion are ratings.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DefensiveStats {
    pub armor: f64,
    pub evasion: f64,
    pub block_chance: f64,
    pub spell_block_chance: f64,
    pub suppression_chance: f64,
    pub resistances: Resistances,
}

impl DefensiveStats {
    /// Scrubs every field so downstream formulas only see finite, non-negative ratings.
    pub fn sanitized(mut self) -> Self {
        self.armor = numeric::non_negative(self.armor);
        self.evasion = numeric::non_negative(self.evasion);
        self.block_chance = numeric::clamp_percent(self.block_chance, 0.0, 100.0);
        self.spell_block_chance = numeric::clamp_percent(self.spell_block_chance, 0.0, 100.0);
        self.suppression_chance = numeric::clamp_percent(self.suppression_chance, 0.0, 100.0);
        self
    }
}

/// Offensive stat block for party members.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OffensiveStats {
    pub accuracy: f64,
    pub attack_damage: f64,
    pub damage_type: DamageType,
    /// Ticks between auto-attacks before haste.
    pub attack_interval_ticks: u64,
    /// Healing per cast for healers.
    pub heal_power: f64,
    pub heal_mana_cost: f64,
    /// Crit chance (out of 100) for attacks and heals.
    pub crit_chance: f64,
    pub crit_multiplier: f64,
}

impl Default for OffensiveStats {
    fn default() -> Self {
        Self {
            accuracy: 100.0,
            attack_damage: 10.0,
            damage_type: DamageType::Physical,
            attack_interval_ticks: 15,
            heal_power: 0.0,
            heal_mana_cost: 0.0,
            crit_chance: 5.0,
            crit_multiplier: 1.5,
        }
    }
}

/// Accumulated per-member combat statistics for the run.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatCounters {
    pub damage_dealt: f64,
    pub healing_done: f64,
    pub damage_taken: f64,
    pub healing_received: f64,
    pub hits_landed: u32,
    pub heals_cast: u32,
    pub deaths: u32,
    pub damage_by_ability: BTreeMap<String, f64>,
    pub healing_by_ability: BTreeMap<String, f64>,
    pub damage_taken_by_source: BTreeMap<String, f64>,
}

impl CombatCounters {
    pub fn record_damage_dealt(&mut self, ability: &str, amount: f64) {
        let amount = numeric::non_negative(amount);
        self.damage_dealt += amount;
        self.hits_landed += 1;
        *self.damage_by_ability.entry(ability.to_owned()).or_default() += amount;
    }

    pub fn record_healing_done(&mut self, ability: &str, amount: f64) {
        let amount = numeric::non_negative(amount);
        self.healing_done += amount;
        self.heals_cast += 1;
        *self.healing_by_ability.entry(ability.to_owned()).or_default() += amount;
    }

    pub fn record_damage_taken(&mut self, source: &str, amount: f64) {
        let amount = numeric::non_negative(amount);
        self.damage_taken += amount;
        *self
            .damage_taken_by_source
            .entry(source.to_owned())
            .or_default() += amount;
    }

    pub fn record_healing_received(&mut self, amount: f64) {
        self.healing_received += numeric::non_negative(amount);
    }
}
