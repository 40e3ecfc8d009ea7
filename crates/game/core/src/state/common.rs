use std::fmt;

use crate::config::CombatConfig;
use crate::numeric;

/// Discrete simulation step. One tick is [`CombatConfig::TICK_MILLIS`] of simulated time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Number of ticks elapsed since `earlier`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Simulated seconds represented by this tick count.
    #[inline]
    pub fn as_secs(self) -> f64 {
        self.0 as f64 * CombatConfig::TICK_SECONDS
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0.saturating_add(rhs))
    }
}

impl std::ops::Sub<u64> for Tick {
    type Output = Tick;
    fn sub(self, rhs: u64) -> Tick {
        Tick(self.0.saturating_sub(rhs))
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a party member within the run's roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemberId(pub u16);

impl MemberId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "member#{}", self.0)
    }
}

/// Index of an enemy within the current pull.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyId(pub u16);

impl EnemyId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enemy#{}", self.0)
    }
}

/// Who caused a damage or healing event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActorRef {
    Member(MemberId),
    Enemy(EnemyId),
    /// Damage with no living source (expired debuffs, environment).
    Environment,
}

/// Party role. Drives enemy target selection and recovery healer choice.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Role {
    Tank,
    Healer,
    Damage,
}

/// Current/maximum pair for health, mana and energy shield.
///
/// All mutators clamp to `[0, max]` and scrub non-finite input, so a pool can
/// never leave its valid range regardless of what the caller computes.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourcePool {
    pub current: f64,
    pub max: f64,
}

impl ResourcePool {
    /// Creates a full pool. Degenerate maxima collapse to zero.
    pub fn full(max: f64) -> Self {
        let max = numeric::non_negative(max);
        Self { current: max, max }
    }

    pub fn new(current: f64, max: f64) -> Self {
        let max = numeric::non_negative(max);
        Self {
            current: numeric::clamp_pool(current, max),
            max,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    #[inline]
    pub fn missing(&self) -> f64 {
        (self.max - self.current).max(0.0)
    }

    /// Fraction of the pool that is filled, `0.0` for an empty maximum.
    pub fn ratio(&self) -> f64 {
        if self.max <= 0.0 {
            0.0
        } else {
            numeric::finite_or(self.current / self.max, 0.0)
        }
    }

    /// Adds up to `amount`, returning what was actually gained.
    pub fn restore(&mut self, amount: f64) -> f64 {
        let amount = numeric::non_negative(amount);
        let before = self.current;
        self.current = numeric::clamp_pool(self.current + amount, self.max);
        self.current - before
    }

    /// Removes up to `amount`, returning what was actually removed.
    pub fn drain(&mut self, amount: f64) -> f64 {
        let amount = numeric::non_negative(amount);
        let before = self.current;
        self.current = numeric::clamp_pool(self.current - amount, self.max);
        before - self.current
    }

    pub fn set(&mut self, value: f64) {
        self.current = numeric::clamp_pool(value, self.max);
    }

    pub fn set_fraction(&mut self, fraction: f64) {
        self.set(self.max * numeric::clamp_unit(fraction));
    }

    pub fn fill(&mut self) {
        self.current = self.max;
    }

    /// Re-applies the pool invariants after any out-of-band mutation.
    pub fn repair(&mut self) {
        self.max = numeric::non_negative(self.max);
        self.current = numeric::clamp_pool(self.current, self.max);
    }
}

/// A buff value that lapses once `current_tick >= end_tick`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimedValue {
    pub value: f64,
    pub end_tick: Tick,
}

impl TimedValue {
    pub fn new(value: f64, end_tick: Tick) -> Self {
        Self { value, end_tick }
    }

    #[inline]
    pub fn is_expired(&self, now: Tick) -> bool {
        now >= self.end_tick
    }
}
