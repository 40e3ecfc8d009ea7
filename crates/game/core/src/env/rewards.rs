//! Experience and currency generation.

use super::dungeon::{DungeonDefinition, PullDefinition};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reward {
    pub experience: u64,
    pub currency: u64,
}

impl Reward {
    #[must_use]
    pub fn scaled(self, scale: f64) -> Self {
        let scale = crate::numeric::non_negative(scale);
        Self {
            experience: (self.experience as f64 * scale).round() as u64,
            currency: (self.currency as f64 * scale).round() as u64,
        }
    }
}

impl std::ops::Add for Reward {
    type Output = Reward;
    fn add(self, rhs: Reward) -> Reward {
        Reward {
            experience: self.experience.saturating_add(rhs.experience),
            currency: self.currency.saturating_add(rhs.currency),
        }
    }
}

impl std::ops::AddAssign for Reward {
    fn add_assign(&mut self, rhs: Reward) {
        *self = *self + rhs;
    }
}

/// Produces rewards at pull clears and at run end.
pub trait RewardGenerator: Send + Sync {
    fn pull_cleared(
        &self,
        dungeon: &DungeonDefinition,
        pull: Option<&PullDefinition>,
        forces: u32,
    ) -> Reward;

    /// Completion reward, already multiplied by the run's reward scale.
    fn run_finished(&self, dungeon: &DungeonDefinition, reward_scale: f64) -> Reward;
}

/// Reward generator driven by the dungeon's [`RewardTable`](super::RewardTable).
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardRewards;

impl RewardGenerator for StandardRewards {
    fn pull_cleared(
        &self,
        dungeon: &DungeonDefinition,
        _pull: Option<&PullDefinition>,
        forces: u32,
    ) -> Reward {
        let table = dungeon.rewards;
        Reward {
            experience: table.experience_per_force.saturating_mul(u64::from(forces)),
            currency: table.currency_per_pull,
        }
    }

    fn run_finished(&self, dungeon: &DungeonDefinition, reward_scale: f64) -> Reward {
        let table = dungeon.rewards;
        Reward {
            experience: table.completion_experience,
            currency: table.completion_currency,
        }
        .scaled(reward_scale)
    }
}
