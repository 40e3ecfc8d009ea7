//! Combat state: party members, enemies, timed effects and the run context.
mod buffers;
mod cast;
mod common;
mod context;
mod effects;
mod enemy;
mod member;
mod snapshot;
mod stats;

pub use buffers::{BoundedBuffer, DamageLogEntry, FloatKind, FloatingNumber, LogEntry};
pub use cast::{ActiveCast, CastAbility, CastState};
pub use common::{ActorRef, EnemyId, MemberId, ResourcePool, Role, Tick, TimedValue};
pub use context::{CombatContext, CombatEvent, EncounterInfo, RunProgress};
pub use effects::{
    Bloodlust, BossBuffState, EnemyBuffs, HealOverTime, MAX_DEBUFFS_PER_MEMBER, PartyBuffState,
    PartyDebuffState, TimedDebuff,
};
pub use enemy::{AnimatedEnemy, BehaviorCooldowns, BossAbilityState, EnemyBehavior};
pub use member::{MemberBuffs, TeamMemberState};
pub use snapshot::{CombatPhase, CombatState, EnemyView, MemberView};
pub use stats::{CombatCounters, DefensiveStats, OffensiveStats};
