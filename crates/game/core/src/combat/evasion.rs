//! Accuracy versus evasion.

use crate::config::CombatConfig;
use crate::numeric;

/// Chance (0..=1) that an attack with `accuracy` connects against `evasion`.
///
/// # Formula
///
/// ```text
/// hit_chance = 1.25 * accuracy / (accuracy + (evasion / 5)^0.9)
/// clamped to [5%, 100%]
/// ```
///
/// A defender with no evasion is always hit.
pub fn calculate_hit_chance(accuracy: f64, evasion: f64) -> f64 {
    let evasion = numeric::non_negative(evasion);
    if evasion <= 0.0 {
        return 1.0;
    }
    let accuracy = numeric::non_negative(accuracy);
    let denominator = accuracy + (evasion / 5.0).powf(0.9);
    let chance = numeric::finite_or(1.25 * accuracy / denominator, CombatConfig::MIN_HIT_CHANCE);
    chance.clamp(CombatConfig::MIN_HIT_CHANCE, 1.0)
}

/// Chance (0..=1) that an attack is evaded.
pub fn evade_chance(accuracy: f64, evasion: f64) -> f64 {
    1.0 - calculate_hit_chance(accuracy, evasion)
}

/// `roll` is a uniform draw in `[0, 1)`.
pub fn check_evade(accuracy: f64, evasion: f64, roll: f64) -> bool {
    roll < evade_chance(accuracy, evasion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_evasion_never_evades() {
        assert_eq!(evade_chance(0.0, 0.0), 0.0);
        assert_eq!(evade_chance(500.0, -10.0), 0.0);
        assert!(!check_evade(100.0, 0.0, 0.0));
    }

    #[test]
    fn hit_chance_has_floor_and_ceiling() {
        assert_eq!(calculate_hit_chance(0.0, 1_000.0), CombatConfig::MIN_HIT_CHANCE);
        assert_eq!(calculate_hit_chance(10_000.0, 10.0), 1.0);
        let mid = calculate_hit_chance(100.0, 500.0);
        assert!(mid > 0.05 && mid < 1.0);
    }

    #[test]
    fn more_evasion_means_more_evades() {
        let low = evade_chance(200.0, 300.0);
        let high = evade_chance(200.0, 3_000.0);
        assert!(high > low);
    }
}
