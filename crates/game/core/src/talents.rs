//! Talent effects and the folded modifier set the engine consumes.
//!
//! Talents arrive from upstream as a list of typed [`TalentEffect`]s. They are
//! folded once, when a member enters the run, into [`TalentModifiers`]; the
//! mitigation pipeline and regen processor only ever read the folded form.

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::combat::{DamageType, HitKind};

bitflags! {
    /// Properties of a hit that conditional damage reductions can key on.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct DamageCondition: u16 {
        const PHYSICAL = 1 << 0;
        const ELEMENTAL = 1 << 1;
        const CHAOS = 1 << 2;
        const HITS = 1 << 3;
        const DOT = 1 << 4;
        const ATTACKS = 1 << 5;
        /// Defender currently has energy shield.
        const HAS_ES = 1 << 6;
        /// Defender has a non-zero block chance.
        const HAS_BLOCK = 1 << 7;
        /// Elemental damage that a conversion talent turns into physical.
        const ELEMENTAL_TO_PHYSICAL = 1 << 8;
    }
}

impl DamageCondition {
    /// Conditions matched by a hit against a defender.
    pub fn for_hit(
        damage_type: DamageType,
        kind: HitKind,
        has_es: bool,
        has_block: bool,
        converts: bool,
    ) -> Self {
        let mut matched = Self::empty();
        match damage_type {
            DamageType::Physical => matched |= Self::PHYSICAL,
            DamageType::Chaos => matched |= Self::CHAOS,
            _ => matched |= Self::ELEMENTAL,
        }
        match kind {
            HitKind::Attack => matched |= Self::HITS | Self::ATTACKS,
            HitKind::Spell => matched |= Self::HITS,
            HitKind::DamageOverTime => matched |= Self::DOT,
            HitKind::Reflect => {}
        }
        if has_es {
            matched |= Self::HAS_ES;
        }
        if has_block {
            matched |= Self::HAS_BLOCK;
        }
        if converts && damage_type.is_elemental() {
            matched |= Self::ELEMENTAL_TO_PHYSICAL;
        }
        matched
    }
}

/// One talent-granted effect. All percentages are expressed out of 100.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TalentEffect {
    /// Reduction applied to every hit, or only when `condition` is fully matched.
    DamageReduction {
        percent: f64,
        #[cfg_attr(feature = "serde", serde(default))]
        condition: Option<DamageCondition>,
    },
    BlockEffectiveness(f64),
    SuppressionEffect(f64),
    /// Share of armor that also mitigates chaos damage.
    ChaosVsArmor(f64),
    /// Share of armor that also mitigates elemental spells.
    SpellVsArmor(f64),
    /// Share of evasion rating added to armor for mitigation.
    EvasionToMitigation(f64),
    ElementalToPhysical(f64),
    /// Heal for a share of the pre-reduction blocked amount.
    LifeOnBlock(f64),
    /// Each block grants stacking armor for a while.
    BlockArmorStack {
        armor_per_stack: f64,
        max_stacks: u8,
        duration_ticks: u64,
    },
    /// Heal a share of maximum health whenever a hit is evaded.
    HealOnEvade(f64),
    Thorns(f64),
    EsRechargeDelayReduction(f64),
    /// Additional energy shield recharge rate, percent of max per second.
    EsRechargeRate(f64),
    /// Flat energy shield regeneration, percent of max per second.
    EsRegeneration(f64),
    /// Increased mana regeneration.
    ManaRegen(f64),
    /// Increased damage dealt.
    DamageBonus(f64),
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockArmorStack {
    pub armor_per_stack: f64,
    pub max_stacks: u8,
    pub duration_ticks: u64,
}

/// Upper bound on distinct conditional reductions tracked per member.
pub const MAX_CONDITIONAL_REDUCTIONS: usize = 16;

/// Talent effects folded into additive totals.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TalentModifiers {
    pub damage_reduction: f64,
    pub conditional_reductions: ArrayVec<(DamageCondition, f64), MAX_CONDITIONAL_REDUCTIONS>,
    pub block_effectiveness: f64,
    pub suppression_effect: f64,
    pub chaos_vs_armor: f64,
    pub spell_vs_armor: f64,
    pub evasion_to_mitigation: f64,
    pub elemental_to_physical: f64,
    pub life_on_block: f64,
    pub block_armor_stack: Option<BlockArmorStack>,
    pub heal_on_evade: f64,
    pub thorns: f64,
    pub es_recharge_delay_reduction: f64,
    pub es_recharge_rate: f64,
    pub es_regeneration: f64,
    pub mana_regen: f64,
    pub damage_bonus: f64,
}

impl TalentModifiers {
    pub fn fold<'a>(effects: impl IntoIterator<Item = &'a TalentEffect>) -> Self {
        let mut mods = Self::default();
        for effect in effects {
            mods.apply(effect);
        }
        mods
    }

    fn apply(&mut self, effect: &TalentEffect) {
        match *effect {
            TalentEffect::DamageReduction {
                percent,
                condition: None,
            } => self.damage_reduction += percent,
            TalentEffect::DamageReduction {
                percent,
                condition: Some(condition),
            } => self.add_conditional(condition, percent),
            TalentEffect::BlockEffectiveness(v) => self.block_effectiveness += v,
            TalentEffect::SuppressionEffect(v) => self.suppression_effect += v,
            TalentEffect::ChaosVsArmor(v) => self.chaos_vs_armor += v,
            TalentEffect::SpellVsArmor(v) => self.spell_vs_armor += v,
            TalentEffect::EvasionToMitigation(v) => self.evasion_to_mitigation += v,
            TalentEffect::ElementalToPhysical(v) => self.elemental_to_physical += v,
            TalentEffect::LifeOnBlock(v) => self.life_on_block += v,
            TalentEffect::BlockArmorStack {
                armor_per_stack,
                max_stacks,
                duration_ticks,
            } => {
                // Strongest stack definition wins.
                let candidate = BlockArmorStack {
                    armor_per_stack,
                    max_stacks,
                    duration_ticks,
                };
                let replace = self.block_armor_stack.is_none_or(|current| {
                    candidate.armor_per_stack * f64::from(candidate.max_stacks)
                        > current.armor_per_stack * f64::from(current.max_stacks)
                });
                if replace {
                    self.block_armor_stack = Some(candidate);
                }
            }
            TalentEffect::HealOnEvade(v) => self.heal_on_evade += v,
            TalentEffect::Thorns(v) => self.thorns += v,
            TalentEffect::EsRechargeDelayReduction(v) => self.es_recharge_delay_reduction += v,
            TalentEffect::EsRechargeRate(v) => self.es_recharge_rate += v,
            TalentEffect::EsRegeneration(v) => self.es_regeneration += v,
            TalentEffect::ManaRegen(v) => self.mana_regen += v,
            TalentEffect::DamageBonus(v) => self.damage_bonus += v,
        }
    }

    fn add_conditional(&mut self, condition: DamageCondition, percent: f64) {
        if let Some(entry) = self
            .conditional_reductions
            .iter_mut()
            .find(|(c, _)| *c == condition)
        {
            entry.1 += percent;
            return;
        }
        if self
            .conditional_reductions
            .try_push((condition, percent))
            .is_err()
        {
            tracing::warn!(
                target: "combat::talents",
                ?condition,
                "conditional reduction table full; effect ignored"
            );
        }
    }

    /// Sum of the general reduction and every conditional reduction `matched` satisfies.
    pub fn reduction_for(&self, matched: DamageCondition) -> f64 {
        self.conditional_reductions
            .iter()
            .filter(|(condition, _)| matched.contains(*condition))
            .fold(self.damage_reduction, |acc, (_, percent)| acc + percent)
    }

    /// Multiplier applied to this member's mana regeneration.
    pub fn mana_regen_multiplier(&self) -> f64 {
        (1.0 + self.mana_regen / 100.0).max(0.0)
    }

    pub fn damage_multiplier(&self) -> f64 {
        (1.0 + self.damage_bonus / 100.0).max(0.0)
    }
}
