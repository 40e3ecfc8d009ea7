//! Pure damage mitigation pipeline.
//!
//! [`resolve_hit`] turns an [`IncomingHit`] into a [`HitOutcome`] against a
//! [`DefenderProfile`]. Random draws are supplied up front in [`HitRolls`], so
//! the function itself is deterministic and side-effect free apart from
//! diagnostic logging. Every intermediate value is scrubbed through
//! [`numeric::guard_damage`].

use super::armor;
use super::damage::{DamageType, HitKind, IncomingHit, Resistances};
use super::evasion;
use crate::config::CombatConfig;
use crate::numeric;
use crate::rng::CombatRng;
use crate::talents::{DamageCondition, TalentModifiers};

/// Defensive view of whoever is being hit.
#[derive(Clone, Copy, Debug)]
pub struct DefenderProfile<'a> {
    /// Armor including temporary buffs.
    pub armor: f64,
    pub evasion: f64,
    /// Block chance against attacks, percent, buffs included.
    pub block_chance: f64,
    /// Block chance against spells, percent, buffs included.
    pub spell_block_chance: f64,
    pub suppression_chance: f64,
    pub resistances: Resistances,
    /// Energy shield currently available to absorb damage.
    pub energy_shield: f64,
    /// Damage reduction from temporary buffs, percent.
    pub bonus_reduction: f64,
    pub talents: &'a TalentModifiers,
}

/// Uniform draws in `[0, 1)` for each avoidance roll.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct HitRolls {
    pub evade: f64,
    pub block: f64,
    pub suppress: f64,
}

impl HitRolls {
    /// Draws all three rolls, consumed whether or not they are used.
    pub fn draw(rng: &mut CombatRng) -> Self {
        Self {
            evade: rng.unit(),
            block: rng.unit(),
            suppress: rng.unit(),
        }
    }

    /// Rolls that never avoid anything (every check fails).
    pub const fn certain_hit() -> Self {
        Self {
            evade: 1.0,
            block: 1.0,
            suppress: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitOutcome {
    /// Raw damage after the attacker's multiplier.
    pub raw: f64,
    pub damage_to_es: f64,
    pub damage_to_life: f64,
    pub total: f64,
    pub evaded: bool,
    pub blocked: bool,
    pub suppressed: bool,
    /// Damage that reached the block step, before block reduction.
    pub blocked_amount: f64,
}

impl HitOutcome {
    fn evaded(raw: f64) -> Self {
        Self {
            raw,
            evaded: true,
            ..Self::default()
        }
    }

    /// Damage that actually left the defender's pools.
    pub fn received(&self) -> f64 {
        self.damage_to_es + self.damage_to_life
    }
}

/// Resolves one hit through evasion, armor, talents, block or suppression,
/// conversion, resistances and energy shield absorption.
pub fn resolve_hit(
    hit: &IncomingHit,
    defender: &DefenderProfile<'_>,
    rolls: HitRolls,
) -> HitOutcome {
    let talents = defender.talents;
    let raw = hit.scaled_raw();

    // 1. evasion
    if hit.kind.can_evade()
        && evasion::check_evade(hit.attacker.accuracy, defender.evasion, rolls.evade)
    {
        return HitOutcome::evaded(raw);
    }

    let converts = talents.elemental_to_physical > 0.0;
    let matched = DamageCondition::for_hit(
        hit.damage_type,
        hit.kind,
        defender.energy_shield > 0.0,
        defender.block_chance > 0.0,
        converts,
    );

    // 2-3. armor, with talent-adjusted effectiveness
    let rating = armor::effective_armor(
        defender.armor,
        defender.evasion,
        talents,
        hit.damage_type,
        hit.kind,
    );
    let mut damage = numeric::guard_damage(armor::mitigate(raw, rating), "armor");

    // 4. general and condition-matched reductions, one multiplier
    let reduction = numeric::clamp_percent(
        talents.reduction_for(matched) + defender.bonus_reduction,
        0.0,
        CombatConfig::DAMAGE_REDUCTION_CAP,
    );
    damage = numeric::guard_damage(damage * (1.0 - reduction / 100.0), "talent_reduction");

    // 5-6. block or suppression, never both
    let mut blocked = false;
    let mut suppressed = false;
    let mut blocked_amount = 0.0;
    if hit.kind.can_block() {
        let chance = if hit.kind == HitKind::Spell {
            defender.spell_block_chance
        } else {
            defender.block_chance
        };
        let chance = numeric::clamp_percent(chance, 0.0, 100.0) / 100.0;
        if rolls.block < chance {
            blocked = true;
            blocked_amount = damage;
            let block_reduction = numeric::clamp_percent(
                CombatConfig::BASE_BLOCK_REDUCTION + talents.block_effectiveness,
                0.0,
                CombatConfig::BLOCK_REDUCTION_CAP,
            );
            damage = numeric::guard_damage(damage * (1.0 - block_reduction / 100.0), "block");
        }
    }
    if !blocked && hit.kind.can_suppress() {
        let chance = numeric::clamp_percent(defender.suppression_chance, 0.0, 100.0) / 100.0;
        if rolls.suppress < chance {
            suppressed = true;
            let suppression = numeric::clamp_percent(
                CombatConfig::BASE_SUPPRESSION_REDUCTION + talents.suppression_effect,
                0.0,
                CombatConfig::SUPPRESSION_REDUCTION_CAP,
            );
            damage = numeric::guard_damage(damage * (1.0 - suppression / 100.0), "suppression");
        }
    }

    // 7. elemental share converted to physical and mitigated by armor separately
    let mut physical_part = 0.0;
    if converts && hit.damage_type.is_elemental() {
        let share = numeric::clamp_unit(talents.elemental_to_physical / 100.0);
        physical_part = damage * share;
        damage -= physical_part;
        let physical_rating = armor::effective_armor(
            defender.armor,
            defender.evasion,
            talents,
            DamageType::Physical,
            hit.kind,
        );
        physical_part = numeric::guard_damage(
            armor::mitigate(physical_part, physical_rating),
            "conversion",
        );
    }

    // 8. resistances
    let resistance = defender.resistances.against(hit.damage_type);
    damage = numeric::guard_damage(damage * (1.0 - resistance / 100.0), "resistance");

    // 9. rounding, minimum damage, absorption
    let mut total = numeric::round_damage(damage + physical_part);
    if total <= 0.0 && raw > CombatConfig::MIN_DAMAGE_THRESHOLD && !blocked && !suppressed {
        total = 1.0;
    }
    let total = numeric::guard_damage(total, "final");
    let damage_to_es = total.min(numeric::non_negative(defender.energy_shield));
    let damage_to_life = numeric::guard_damage(total - damage_to_es, "life");

    HitOutcome {
        raw,
        damage_to_es,
        damage_to_life,
        total,
        evaded: false,
        blocked,
        suppressed,
        blocked_amount,
    }
}

/// Builds the thorns reflection for damage a defender actually received.
///
/// Only attacks and spells reflect; damage over time and reflections do not.
pub fn thorns_reflection(received: f64, thorns_pct: f64, hit: &IncomingHit) -> Option<IncomingHit> {
    if !hit.kind.is_hit() {
        return None;
    }
    let amount = numeric::non_negative(received) * numeric::non_negative(thorns_pct) / 100.0;
    if amount <= 0.0 {
        return None;
    }
    Some(IncomingHit {
        raw: amount,
        damage_type: DamageType::Physical,
        kind: HitKind::Reflect,
        source: hit.source,
        ability: String::from("thorns"),
        attacker: Default::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ActorRef, EnemyId};

    fn profile(talents: &TalentModifiers) -> DefenderProfile<'_> {
        DefenderProfile {
            armor: 0.0,
            evasion: 0.0,
            block_chance: 0.0,
            spell_block_chance: 0.0,
            suppression_chance: 0.0,
            resistances: Resistances::default(),
            energy_shield: 0.0,
            bonus_reduction: 0.0,
            talents,
        }
    }

    fn swing(raw: f64) -> IncomingHit {
        IncomingHit::new(raw, DamageType::Physical, HitKind::Attack, ActorRef::Enemy(EnemyId(0)))
    }

    #[test]
    fn unmitigated_hit_passes_through() {
        let talents = TalentModifiers::default();
        let out = resolve_hit(&swing(30.0), &profile(&talents), HitRolls::default());
        assert_eq!(out.total, 30.0);
        assert_eq!(out.damage_to_life, 30.0);
        assert!(!out.blocked && !out.evaded);
    }

    #[test]
    fn certain_block_halves_damage() {
        let talents = TalentModifiers::default();
        let mut def = profile(&talents);
        def.block_chance = 100.0;
        let out = resolve_hit(&swing(30.0), &def, HitRolls::default());
        assert!(out.blocked);
        assert_eq!(out.blocked_amount, 30.0);
        assert_eq!(out.total, 15.0);
    }

    #[test]
    fn block_reduction_is_capped() {
        let talents = TalentModifiers {
            block_effectiveness: 80.0,
            ..TalentModifiers::default()
        };
        let mut def = profile(&talents);
        def.block_chance = 100.0;
        let out = resolve_hit(&swing(100.0), &def, HitRolls::default());
        assert_eq!(out.total, 10.0);
    }

    #[test]
    fn spells_can_be_suppressed_but_not_evaded() {
        let talents = TalentModifiers::default();
        let mut def = profile(&talents);
        def.evasion = 1e6;
        def.suppression_chance = 100.0;
        let bolt = IncomingHit::new(40.0, DamageType::Cold, HitKind::Spell, ActorRef::Environment);
        let out = resolve_hit(&bolt, &def, HitRolls::default());
        assert!(!out.evaded);
        assert!(out.suppressed);
        assert_eq!(out.total, 20.0);
    }

    #[test]
    fn energy_shield_absorbs_first() {
        let talents = TalentModifiers::default();
        let mut def = profile(&talents);
        def.energy_shield = 12.0;
        let out = resolve_hit(&swing(30.0), &def, HitRolls::default());
        assert_eq!(out.damage_to_es, 12.0);
        assert_eq!(out.damage_to_life, 18.0);
    }

    #[test]
    fn minimum_damage_applies_only_to_clean_hits() {
        let talents = TalentModifiers::default();
        let mut def = profile(&talents);
        def.resistances = Resistances::uniform(75.0);
        let spark =
            IncomingHit::new(1.5, DamageType::Lightning, HitKind::Spell, ActorRef::Environment);
        assert_eq!(resolve_hit(&spark, &def, HitRolls::default()).total, 1.0);

        def.spell_block_chance = 100.0;
        let blocked = resolve_hit(&spark, &def, HitRolls::default());
        assert!(blocked.blocked);
        assert_eq!(blocked.total, 0.0);
    }

    #[test]
    fn nan_raw_damage_is_zeroed() {
        let talents = TalentModifiers::default();
        let out = resolve_hit(&swing(f64::NAN), &profile(&talents), HitRolls::default());
        assert_eq!(out.total, 0.0);
        assert!(out.total.is_finite());
    }

    #[test]
    fn conversion_routes_elemental_through_armor() {
        let talents = TalentModifiers {
            elemental_to_physical: 50.0,
            ..TalentModifiers::default()
        };
        let mut def = profile(&talents);
        def.armor = 1e9;
        let fire =
            IncomingHit::new(100.0, DamageType::Fire, HitKind::Attack, ActorRef::Environment);
        let out = resolve_hit(&fire, &def, HitRolls::default());
        // 50 stays fire, 50 becomes physical and hits the 90% armor cap.
        assert_eq!(out.total, 55.0);
    }

    #[test]
    fn thorns_never_reflect_reflections() {
        let hit = swing(10.0);
        let reflect = thorns_reflection(40.0, 25.0, &hit).expect("reflection");
        assert_eq!(reflect.raw, 10.0);
        assert_eq!(reflect.kind, HitKind::Reflect);
        assert!(thorns_reflection(40.0, 25.0, &reflect).is_none());
    }
}
