//! Deterministic dungeon combat simulation.
//!
//! `game-core` defines the canonical rules (mitigation, regeneration, enemy
//! behavior, recovery, results) and exposes pure APIs that can be reused by
//! the async runtime and by offline tools. All per-tick state mutation flows
//! through [`engine::CombatEngine`], and supporting crates depend on the types
//! re-exported here.
pub mod ai;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod numeric;
pub mod player;
pub mod recovery;
pub mod regen;
pub mod result;
pub mod rng;
pub mod state;
pub mod talents;

pub use ai::{AbilityPriority, DeclaredOrder, EnemyAi, SignaturePriority};
pub use combat::{DamageType, HitKind, HitOutcome, IncomingHit, Resistances, resolve_hit};
pub use config::{CombatConfig, OverflowPolicy, PriorityPolicyKind};
pub use engine::{CombatEngine, CommandKind, CommandMailbox, ExternalCommand, TickOutcome};
pub use env::{
    BossAbility, BossKit, BossPull, BossTemplate, DungeonDefinition, EncounterOracle,
    EnemyTemplate, MemberSpec, PullDefinition, Reward, RewardGenerator, RewardTable, RoutePlan,
    ScalingParams, StandardRewards,
};
pub use error::{CombatError, ErrorContext, ErrorSeverity, GameError};
pub use player::{HealOutcome, IdleResolver, PlayerActionResolver, PlayerPhase};
pub use recovery::{RecoveryMachine, RecoveryReport, RecoveryStage};
pub use result::{DeathCause, FailReason, MemberSummary, RunOutcome, RunResult, generate_result};
pub use rng::CombatRng;
pub use state::{
    ActorRef, AnimatedEnemy, CombatContext, CombatEvent, CombatPhase, CombatState, EncounterInfo,
    EnemyBehavior, EnemyId, MemberId, Role, TeamMemberState, Tick,
};
pub use talents::{TalentEffect, TalentModifiers};
