//! Cast lifecycle shared by enemies, bosses and the recovery healer.
//!
//! A cast is either fully present or absent: the enum shape makes a
//! half-populated cast unrepresentable.

use super::common::{MemberId, Tick};

/// What a cast will do when it completes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CastAbility {
    /// Caster enemy spell bolt.
    Bolt,
    /// Tankbuster enemy heavy strike.
    TankBuster,
    /// Kit-less boss heavy strike.
    LegacyTankBuster,
    /// Boss kit ability, looked up by id at resolution.
    Kit(String),
    /// Out-of-combat heal cast by the recovery healer.
    RecoveryHeal,
    MassResurrection,
}

impl CastAbility {
    pub fn label(&self) -> &str {
        match self {
            Self::Bolt => "bolt",
            Self::TankBuster => "tank_buster",
            Self::LegacyTankBuster => "crushing_blow",
            Self::Kit(id) => id,
            Self::RecoveryHeal => "recovery_heal",
            Self::MassResurrection => "mass_resurrection",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveCast {
    pub ability: CastAbility,
    pub start_tick: Tick,
    pub end_tick: Tick,
    pub target: Option<MemberId>,
}

impl ActiveCast {
    #[inline]
    pub fn total_ticks(&self) -> u64 {
        self.end_tick.since(self.start_tick)
    }

    /// Completed fraction in `[0, 1]` at `now`.
    pub fn progress(&self, now: Tick) -> f64 {
        let total = self.total_ticks();
        if total == 0 {
            return 1.0;
        }
        (now.since(self.start_tick) as f64 / total as f64).min(1.0)
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastState {
    #[default]
    Idle,
    Casting(ActiveCast),
}

impl CastState {
    #[inline]
    pub fn is_casting(&self) -> bool {
        matches!(self, Self::Casting(_))
    }

    pub fn active(&self) -> Option<&ActiveCast> {
        match self {
            Self::Casting(cast) => Some(cast),
            Self::Idle => None,
        }
    }

    pub fn target(&self) -> Option<MemberId> {
        self.active().and_then(|cast| cast.target)
    }

    pub fn begin(&mut self, ability: CastAbility, now: Tick, ticks: u64, target: Option<MemberId>) {
        *self = Self::Casting(ActiveCast {
            ability,
            start_tick: now,
            end_tick: now + ticks,
            target,
        });
    }

    /// Clears and returns the cast if it completes at `now`.
    ///
    /// The state is already idle when the caller executes the returned
    /// ability, so a follow-up action may start in the same tick.
    pub fn take_due(&mut self, now: Tick) -> Option<ActiveCast> {
        match self {
            Self::Casting(cast) if now >= cast.end_tick => match std::mem::take(self) {
                Self::Casting(cast) => Some(cast),
                Self::Idle => None,
            },
            _ => None,
        }
    }

    pub fn cancel(&mut self) -> Option<ActiveCast> {
        match std::mem::take(self) {
            Self::Casting(cast) => Some(cast),
            Self::Idle => None,
        }
    }
}
