//! Safe-numeric validation layer.
//!
//! Every state-mutation boundary (post-damage, post-heal, post-regen) funnels
//! its arithmetic through these helpers instead of carrying bespoke NaN checks.
//! Upstream stat aggregation is a black box, so any value may arrive as NaN,
//! infinite, or negative; the simulation must keep running regardless.
//!
//! Substitution rules:
//! - damage and healing amounts: non-finite or negative ⇒ `0`
//! - pool current values: non-finite ⇒ the pool maximum, then clamped to `[0, max]`
//! - pool maxima: non-finite or negative ⇒ `0`

/// Returns `value` when finite, `fallback` otherwise.
#[inline]
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

/// Scrubs an amount (damage, healing, regen) to a finite non-negative number.
#[inline]
pub fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Scrubs a damage amount, logging when the input was degenerate.
///
/// `stage` names the pipeline step so a bad upstream stat can be traced back.
pub fn guard_damage(value: f64, stage: &'static str) -> f64 {
    if !value.is_finite() {
        tracing::warn!(
            target: "combat::numeric",
            stage,
            value = ?value,
            "non-finite damage replaced with 0"
        );
        return 0.0;
    }
    value.max(0.0)
}

/// Clamps a pool's current value into `[0, max]`; non-finite input becomes `max`.
#[inline]
pub fn clamp_pool(current: f64, max: f64) -> f64 {
    let max = non_negative(max);
    finite_or(current, max).clamp(0.0, max)
}

/// Clamps a fraction into `[0, 1]`; non-finite input becomes `0`.
#[inline]
pub fn clamp_unit(value: f64) -> f64 {
    finite_or(value, 0.0).clamp(0.0, 1.0)
}

/// Clamps a percentage into `[min, max]`; non-finite input becomes `0`.
#[inline]
pub fn clamp_percent(value: f64, min: f64, max: f64) -> f64 {
    finite_or(value, 0.0).clamp(min, max)
}

/// Rounds a final damage figure to a whole number (half away from zero).
#[inline]
pub fn round_damage(value: f64) -> f64 {
    non_negative(value).round()
}

/// Validates a stat coming from outside the simulation.
///
/// Returns the value unchanged when it is finite and at least `min`; otherwise
/// logs the substitution and returns `fallback`.
pub fn sanitize_stat(value: f64, min: f64, fallback: f64, field: &'static str) -> f64 {
    if value.is_finite() && value >= min {
        value
    } else {
        tracing::warn!(
            target: "combat::numeric",
            field,
            value = ?value,
            fallback,
            "degenerate input stat replaced"
        );
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_clamp_substitutes_max_for_nan() {
        assert_eq!(clamp_pool(f64::NAN, 50.0), 50.0);
        assert_eq!(clamp_pool(-3.0, 50.0), 0.0);
        assert_eq!(clamp_pool(75.0, 50.0), 50.0);
        assert_eq!(clamp_pool(10.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn damage_guard_zeroes_degenerate_values() {
        assert_eq!(guard_damage(f64::NAN, "test"), 0.0);
        assert_eq!(guard_damage(f64::NEG_INFINITY, "test"), 0.0);
        assert_eq!(guard_damage(-4.0, "test"), 0.0);
        assert_eq!(guard_damage(12.5, "test"), 12.5);
    }

    #[test]
    fn sanitize_stat_rejects_non_positive_max() {
        assert_eq!(sanitize_stat(0.0, 1.0, 100.0, "max_health"), 100.0);
        assert_eq!(sanitize_stat(250.0, 1.0, 100.0, "max_health"), 250.0);
    }
}
