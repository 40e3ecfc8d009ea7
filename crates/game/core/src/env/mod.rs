//! Read-only encounter data consumed by the simulation.
//!
//! The encounter oracle supplies dungeon layouts, enemy templates and boss
//! kits. Party stats arrive pre-aggregated as [`MemberSpec`]s; reward tables
//! are interpreted by a [`RewardGenerator`].
mod dungeon;
mod kit;
mod party;
mod rewards;

pub use dungeon::{
    BossPull, BossTemplate, CleaveProfile, DungeonDefinition, EnemyTemplate, PullDefinition,
    RewardTable, RoutePlan, ScalingParams,
};
pub use kit::{AbilityEffect, AbilityTarget, BossAbility, BossKit};
pub use party::{MemberSpec, validate_party};
pub use rewards::{Reward, RewardGenerator, StandardRewards};

/// Source of dungeon definitions and boss kits.
pub trait EncounterOracle: Send + Sync {
    fn dungeon(&self, id: &str) -> Option<&DungeonDefinition>;

    fn boss_kit(&self, id: &str) -> Option<&BossKit>;

    /// Identifiers of every dungeon this oracle can serve.
    fn dungeon_ids(&self) -> Vec<String>;
}
