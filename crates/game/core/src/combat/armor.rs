//! Armor mitigation with diminishing returns.

use super::damage::{DamageType, HitKind};
use crate::config::CombatConfig;
use crate::numeric;
use crate::talents::TalentModifiers;

/// Fraction of a hit removed by armor.
///
/// ```text
/// reduction = armor / (armor + k * raw)     capped at 90%
/// ```
///
/// Non-decreasing in `armor`, non-increasing in `raw`.
pub fn armor_reduction(armor: f64, raw: f64) -> f64 {
    let armor = numeric::non_negative(armor);
    let raw = numeric::non_negative(raw);
    if armor <= 0.0 {
        return 0.0;
    }
    let reduction = numeric::finite_or(
        armor / (armor + CombatConfig::ARMOR_CONSTANT * raw),
        0.0,
    );
    reduction.clamp(0.0, CombatConfig::ARMOR_REDUCTION_CAP)
}

/// Damage left after armor.
pub fn mitigate(raw: f64, armor: f64) -> f64 {
    raw * (1.0 - armor_reduction(armor, raw))
}

/// Armor rating that applies against a hit, after talent conversions.
///
/// Physical damage meets the full rating. Chaos and elemental spells only
/// meet the share granted by `chaos_vs_armor` / `spell_vs_armor`; elemental
/// attacks ignore armor entirely.
pub fn effective_armor(
    armor: f64,
    evasion: f64,
    talents: &TalentModifiers,
    damage_type: DamageType,
    kind: HitKind,
) -> f64 {
    let converted = numeric::non_negative(evasion)
        * numeric::non_negative(talents.evasion_to_mitigation)
        / 100.0;
    let total = numeric::non_negative(armor) + converted;
    let share = match damage_type {
        DamageType::Physical => 1.0,
        DamageType::Chaos => talents.chaos_vs_armor / 100.0,
        _ if kind == HitKind::Spell => talents.spell_vs_armor / 100.0,
        _ => 0.0,
    };
    numeric::non_negative(total * numeric::clamp_unit(share))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_armor_no_reduction() {
        assert_eq!(armor_reduction(0.0, 30.0), 0.0);
        assert_eq!(mitigate(30.0, 0.0), 30.0);
    }

    #[test]
    fn reduction_is_monotonic() {
        let mut last = 0.0;
        for armor in [0.0, 10.0, 100.0, 1_000.0, 10_000.0, 1e7] {
            let r = armor_reduction(armor, 50.0);
            assert!(r >= last);
            last = r;
        }
        let mut last = 1.0;
        for raw in [1.0, 10.0, 100.0, 1_000.0] {
            let r = armor_reduction(500.0, raw);
            assert!(r <= last);
            last = r;
        }
    }

    #[test]
    fn reduction_is_capped() {
        assert_eq!(armor_reduction(1e9, 1.0), CombatConfig::ARMOR_REDUCTION_CAP);
    }

    #[test]
    fn elemental_attacks_ignore_armor() {
        let talents = TalentModifiers::default();
        assert_eq!(
            effective_armor(1_000.0, 0.0, &talents, DamageType::Fire, HitKind::Attack),
            0.0
        );
        let talents = TalentModifiers {
            chaos_vs_armor: 50.0,
            ..TalentModifiers::default()
        };
        assert_eq!(
            effective_armor(1_000.0, 0.0, &talents, DamageType::Chaos, HitKind::Attack),
            500.0
        );
    }
}
