//! Damage vocabulary shared by the mitigation pipeline and the AI.

use crate::config::CombatConfig;
use crate::numeric;
use crate::state::ActorRef;

/// Damage element. Physical is mitigated by armor, elements and chaos by resistances.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DamageType {
    #[default]
    Physical,
    Fire,
    Cold,
    Lightning,
    Chaos,
}

impl DamageType {
    pub const COUNT: usize = 5;

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn is_elemental(self) -> bool {
        matches!(self, Self::Fire | Self::Cold | Self::Lightning)
    }
}

/// Delivery mechanism of a hit; decides which defensive rolls apply.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HitKind {
    #[default]
    Attack,
    Spell,
    /// Periodic debuff tick. Not a hit: no evasion, block or suppression.
    DamageOverTime,
    /// Thorns reflection. Bypasses every avoidance roll and never reflects again.
    Reflect,
}

impl HitKind {
    #[inline]
    pub const fn is_hit(self) -> bool {
        matches!(self, Self::Attack | Self::Spell)
    }

    #[inline]
    pub const fn can_evade(self) -> bool {
        matches!(self, Self::Attack)
    }

    #[inline]
    pub const fn can_block(self) -> bool {
        self.is_hit()
    }

    #[inline]
    pub const fn can_suppress(self) -> bool {
        matches!(self, Self::Spell)
    }
}

/// Per-element resistance percentages. Physical has no resistance slot in use.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Resistances {
    pub fire: f64,
    pub cold: f64,
    pub lightning: f64,
    pub chaos: f64,
}

impl Resistances {
    pub const fn uniform(value: f64) -> Self {
        Self {
            fire: value,
            cold: value,
            lightning: value,
            chaos: value,
        }
    }

    /// Effective resistance against `damage_type`, clamped to the legal range.
    pub fn against(&self, damage_type: DamageType) -> f64 {
        let raw = match damage_type {
            DamageType::Physical => return 0.0,
            DamageType::Fire => self.fire,
            DamageType::Cold => self.cold,
            DamageType::Lightning => self.lightning,
            DamageType::Chaos => self.chaos,
        };
        numeric::clamp_percent(
            raw,
            CombatConfig::RESISTANCE_MIN,
            CombatConfig::RESISTANCE_CAP,
        )
    }
}

/// Who is striking and with what offensive modifiers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackerModifiers {
    pub accuracy: f64,
    /// Multiplier on raw damage before mitigation (bloodlust, enrage, talents).
    pub damage_multiplier: f64,
}

impl Default for AttackerModifiers {
    fn default() -> Self {
        Self {
            accuracy: 0.0,
            damage_multiplier: 1.0,
        }
    }
}

/// A single unit of incoming damage, before any mitigation.
#[derive(Clone, Debug, PartialEq)]
pub struct IncomingHit {
    pub raw: f64,
    pub damage_type: DamageType,
    pub kind: HitKind,
    pub source: ActorRef,
    /// Ability label used for stat breakdowns and death attribution.
    pub ability: String,
    pub attacker: AttackerModifiers,
}

impl IncomingHit {
    pub fn new(raw: f64, damage_type: DamageType, kind: HitKind, source: ActorRef) -> Self {
        Self {
            raw,
            damage_type,
            kind,
            source,
            ability: String::from("attack"),
            attacker: AttackerModifiers::default(),
        }
    }

    #[must_use]
    pub fn with_ability(mut self, ability: impl Into<String>) -> Self {
        self.ability = ability.into();
        self
    }

    #[must_use]
    pub fn with_attacker(mut self, attacker: AttackerModifiers) -> Self {
        self.attacker = attacker;
        self
    }

    /// Raw damage after the attacker's multiplier, scrubbed.
    pub fn scaled_raw(&self) -> f64 {
        let multiplier = numeric::finite_or(self.attacker.damage_multiplier, 1.0);
        numeric::guard_damage(numeric::non_negative(self.raw) * multiplier, "raw")
    }
}
