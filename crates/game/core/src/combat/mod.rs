//! Combat resolution.
//!
//! The mitigation pipeline ([`resolve_hit`]) is a pure function over an
//! incoming hit, a defender profile and pre-drawn rolls. The `apply` module
//! layers state mutation on top: pool drains, on-hit talents, thorns and the
//! damage log.
//!
//! # Pipeline order
//!
//! 1. evasion (attacks only)
//! 2. talent-adjusted armor effectiveness
//! 3. armor
//! 4. talent damage reduction
//! 5. block, or
//! 6. spell suppression
//! 7. elemental-to-physical conversion
//! 8. resistances
//! 9. rounding, minimum damage, energy shield then life

mod apply;
pub mod armor;
pub mod damage;
pub mod evasion;
pub mod pipeline;

pub use armor::{armor_reduction, effective_armor};
pub use damage::{AttackerModifiers, DamageType, HitKind, IncomingHit, Resistances};
pub use evasion::{calculate_hit_chance, check_evade, evade_chance};
pub use pipeline::{DefenderProfile, HitOutcome, HitRolls, resolve_hit, thorns_reflection};
