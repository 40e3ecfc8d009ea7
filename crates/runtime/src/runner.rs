//! High-level run orchestrator.
//!
//! The runner owns the run loop, wires up the control handle and event bus,
//! and exposes a builder-based API for hosts to configure a dungeon run.

use std::sync::Arc;

use tokio::task::JoinHandle;

use game_core::env::validate_party;
use game_core::{
    BossKit, CombatConfig, CombatContext, CombatError, DungeonDefinition, EncounterOracle,
    MemberSpec, PlayerActionResolver, RewardGenerator, RoutePlan, RunResult, ScalingParams,
    StandardRewards,
};

use crate::api::{Result, RunControl, RunHandle, RuntimeError};
use crate::events::EventBus;
use crate::hooks::{NoopHooks, RunHooks};
use crate::providers::AutoAttackResolver;
use crate::workers::{ExecutionMode, Pacer, RunLoop, RunPlan};

/// A configured dungeon run, ready to start.
///
/// Design: Runner owns the loop and runs it once.
/// [`RunHandle`] provides a cloneable façade for steering it.
pub struct Runner {
    handle: RunHandle,
    run_loop: RunLoop,
}

impl Runner {
    /// Create a new runner builder
    pub fn builder() -> RunnerBuilder {
        RunnerBuilder::new()
    }

    /// Get a cloneable handle to this run
    pub fn handle(&self) -> RunHandle {
        self.handle.clone()
    }

    /// Runs the dungeon on the current task.
    ///
    /// Returns `None` when the run was stopped through a [`RunHandle`].
    pub async fn run(self) -> Option<RunResult> {
        self.run_loop.drive().await
    }

    /// Runs the dungeon on a background task.
    pub fn spawn(self) -> RunTask {
        let handle = self.handle.clone();
        let join = tokio::spawn(self.run());
        RunTask { handle, join }
    }
}

/// A run executing on a background task.
pub struct RunTask {
    handle: RunHandle,
    join: JoinHandle<Option<RunResult>>,
}

impl RunTask {
    /// A control handle for the running task. Handles are cheap to clone and
    /// stay valid after the run ends.
    pub fn handle(&self) -> RunHandle {
        self.handle.clone()
    }

    /// Waits for the run to end.
    pub async fn join(self) -> Result<Option<RunResult>> {
        self.join.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runner`] with flexible configuration.
pub struct RunnerBuilder {
    config: CombatConfig,
    mode: ExecutionMode,
    seed: u64,
    dungeon: Option<DungeonDefinition>,
    dungeon_id: Option<String>,
    party: Option<Vec<MemberSpec>>,
    route: RoutePlan,
    scaling: ScalingParams,
    oracle: Option<Arc<dyn EncounterOracle>>,
    boss_kit: Option<BossKit>,
    hooks: Option<Box<dyn RunHooks>>,
    resolver: Option<Box<dyn PlayerActionResolver>>,
    rewards: Option<Box<dyn RewardGenerator>>,
    event_capacity: usize,
}

impl RunnerBuilder {
    const DEFAULT_EVENT_CAPACITY: usize = 256;

    fn new() -> Self {
        Self {
            config: CombatConfig::default(),
            mode: ExecutionMode::default(),
            seed: 0,
            dungeon: None,
            dungeon_id: None,
            party: None,
            route: RoutePlan::default(),
            scaling: ScalingParams::default(),
            oracle: None,
            boss_kit: None,
            hooks: None,
            resolver: None,
            rewards: None,
            event_capacity: Self::DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Override combat configuration
    pub fn config(mut self, config: CombatConfig) -> Self {
        self.config = config;
        self
    }

    /// Batch (as fast as possible) or real-time pacing. Defaults to batch.
    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Seed for every random roll in the run.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Run this dungeon definition directly.
    pub fn dungeon(mut self, dungeon: DungeonDefinition) -> Self {
        self.dungeon = Some(dungeon);
        self
    }

    /// Run a dungeon looked up through the oracle at build time.
    pub fn dungeon_id(mut self, id: impl Into<String>) -> Self {
        self.dungeon_id = Some(id.into());
        self
    }

    /// Party roster, validated at build time. Required.
    pub fn party(mut self, party: Vec<MemberSpec>) -> Self {
        self.party = Some(party);
        self
    }

    /// Trash pull order. Defaults to every pull in declaration order.
    pub fn route(mut self, route: RoutePlan) -> Self {
        self.route = route;
        self
    }

    /// Enemy health and damage multipliers applied to every spawn.
    pub fn scaling(mut self, scaling: ScalingParams) -> Self {
        self.scaling = scaling;
        self
    }

    /// Source for dungeon ids and boss kits.
    pub fn oracle(mut self, oracle: Arc<dyn EncounterOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Boss kit to use instead of the one the dungeon names.
    pub fn boss_kit(mut self, kit: BossKit) -> Self {
        self.boss_kit = Some(kit);
        self
    }

    /// Host callbacks. Defaults to [`NoopHooks`].
    pub fn hooks(mut self, hooks: impl RunHooks + 'static) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    /// Party behavior. Defaults to [`AutoAttackResolver`].
    pub fn resolver(mut self, resolver: impl PlayerActionResolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Reward generator. Defaults to [`StandardRewards`].
    pub fn rewards(mut self, rewards: impl RewardGenerator + 'static) -> Self {
        self.rewards = Some(Box::new(rewards));
        self
    }

    /// Per-topic broadcast capacity of the event bus.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Validates the inputs and builds the runner.
    pub fn build(self) -> Result<Runner> {
        let dungeon = self.resolve_dungeon()?;
        dungeon.validate()?;

        let party = self.party.ok_or(RuntimeError::MissingParty)?;
        validate_party(&party)?;

        let boss_kit = match (self.boss_kit, &dungeon.boss.boss.kit) {
            (Some(kit), _) => Some(Arc::new(kit)),
            (None, Some(id)) => {
                let kit = self
                    .oracle
                    .as_ref()
                    .and_then(|oracle| oracle.boss_kit(id))
                    .cloned()
                    .ok_or_else(|| CombatError::UnknownBossKit { id: id.clone() })?;
                Some(Arc::new(kit))
            }
            (None, None) => None,
        };

        let route = self.route.resolve(&dungeon).into_iter().map(|(index, _)| index).collect();
        let plan = RunPlan {
            dungeon,
            boss_kit,
            route,
            scaling: self.scaling,
        };

        let ctx = CombatContext::new(self.config.clone(), &party, self.seed)
            .with_time_limit_secs(plan.dungeon.time_limit_secs)
            .with_progress(plan.dungeon.required_forces, plan.total_pulls());

        let control = Arc::new(RunControl::new(&self.config));
        let event_bus = EventBus::with_capacity(self.event_capacity);
        let handle = RunHandle::new(Arc::clone(&control), event_bus.clone());

        tracing::debug!(
            target: "runtime::loop",
            dungeon = %plan.dungeon.id,
            party = party.len(),
            pulls = plan.total_pulls(),
            mode = %self.mode,
            "runner built"
        );

        let run_loop = RunLoop::new(
            ctx,
            plan,
            Pacer::new(self.mode, &self.config),
            control,
            event_bus,
            self.hooks.unwrap_or_else(|| Box::new(NoopHooks)),
            self.resolver.unwrap_or_else(|| Box::new(AutoAttackResolver::new())),
            self.rewards.unwrap_or_else(|| Box::new(StandardRewards)),
        );

        Ok(Runner { handle, run_loop })
    }

    fn resolve_dungeon(&self) -> Result<DungeonDefinition> {
        if let Some(dungeon) = &self.dungeon {
            return Ok(dungeon.clone());
        }
        let id = self.dungeon_id.as_ref().ok_or(RuntimeError::MissingDungeon)?;
        self.oracle
            .as_ref()
            .and_then(|oracle| oracle.dungeon(id))
            .cloned()
            .ok_or_else(|| CombatError::UnknownDungeon { id: id.clone() }.into())
    }
}
