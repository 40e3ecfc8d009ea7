//! Party member input produced by upstream stat aggregation.

use crate::combat::Resistances;
use crate::config::CombatConfig;
use crate::error::CombatError;
use crate::state::{DefensiveStats, OffensiveStats, Role};
use crate::talents::TalentEffect;

/// Already-aggregated stats for one party member.
///
/// Equipment and passive trees are resolved upstream; the simulation treats
/// these numbers as given and sanitizes anything degenerate on entry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MemberSpec {
    pub name: String,
    pub role: Role,
    pub level: u32,
    pub max_health: f64,
    pub max_mana: f64,
    pub max_energy_shield: f64,
    /// Percent of max health regenerated per second.
    pub health_regen_pct: f64,
    /// Percent of max mana regenerated per second.
    pub mana_regen_pct: f64,
    pub defense: DefensiveStats,
    pub offense: OffensiveStats,
    pub talents: Vec<TalentEffect>,
}

impl MemberSpec {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_health(mut self, max_health: f64) -> Self {
        self.max_health = max_health;
        self
    }

    #[must_use]
    pub fn with_energy_shield(mut self, max_energy_shield: f64) -> Self {
        self.max_energy_shield = max_energy_shield;
        self
    }

    #[must_use]
    pub fn with_defense(mut self, defense: DefensiveStats) -> Self {
        self.defense = defense;
        self
    }

    #[must_use]
    pub fn with_offense(mut self, offense: OffensiveStats) -> Self {
        self.offense = offense;
        self
    }

    #[must_use]
    pub fn with_talents(mut self, talents: Vec<TalentEffect>) -> Self {
        self.talents = talents;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }
}

/// Checks roster size before a run starts. Stat values are sanitized later, not rejected.
pub fn validate_party(party: &[MemberSpec]) -> Result<(), CombatError> {
    if party.is_empty() {
        return Err(CombatError::EmptyParty);
    }
    if party.len() > CombatConfig::MAX_PARTY_SIZE {
        return Err(CombatError::PartyTooLarge {
            size: party.len(),
            max: CombatConfig::MAX_PARTY_SIZE,
        });
    }
    Ok(())
}

impl Default for MemberSpec {
    fn default() -> Self {
        Self {
            name: String::from("adventurer"),
            role: Role::Damage,
            level: 1,
            max_health: 100.0,
            max_mana: 50.0,
            max_energy_shield: 0.0,
            health_regen_pct: 0.0,
            mana_regen_pct: 1.0,
            defense: DefensiveStats {
                resistances: Resistances::default(),
                ..DefensiveStats::default()
            },
            offense: OffensiveStats::default(),
            talents: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_size_is_bounded() {
        assert_eq!(validate_party(&[]), Err(CombatError::EmptyParty));
        let six = vec![MemberSpec::default(); 6];
        assert!(matches!(
            validate_party(&six),
            Err(CombatError::PartyTooLarge { size: 6, max: 5 })
        ));
        assert!(validate_party(&six[..5]).is_ok());
    }
}
