//! Run loop that owns the authoritative [`game_core::CombatContext`].
//!
//! Sequences pulls (recovery, travel, combat), steps the
//! [`game_core::CombatEngine`] once per tick, and publishes what happened to
//! the [`EventBus`] and the host's [`RunHooks`].

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use game_core::{
    AnimatedEnemy, BossKit, CombatContext, CombatEngine, CombatEvent, CombatPhase,
    DungeonDefinition, EncounterInfo, EnemyAi, EnemyId, EnemyTemplate, PlayerActionResolver,
    RecoveryMachine, Reward, RewardGenerator, RunOutcome, RunResult, ScalingParams, Tick,
    TickOutcome, generate_result,
};

use super::pacing::Pacer;
use crate::api::RunControl;
use crate::events::{CombatRecord, Event, EventBus, PullCleared, RunEvent};
use crate::hooks::RunHooks;

/// What the run fights, resolved before the loop starts.
#[derive(Debug, Clone)]
pub(crate) struct RunPlan {
    pub dungeon: DungeonDefinition,
    pub boss_kit: Option<Arc<BossKit>>,
    /// Trash pull indices in the order they are taken.
    pub route: Vec<usize>,
    pub scaling: ScalingParams,
}

/// One pull on the route, boss included.
#[derive(Debug, Clone)]
struct Stage {
    pull_index: usize,
    name: String,
    is_gate: bool,
    is_boss: bool,
    travel_ticks: u64,
}

impl RunPlan {
    /// Trash pulls on the route plus the boss.
    pub(crate) fn total_pulls(&self) -> usize {
        self.route.len() + 1
    }

    fn stages(&self, default_travel_ticks: u64) -> Vec<Stage> {
        let trash = self.route.iter().filter_map(|&index| {
            let pull = self.dungeon.pulls.get(index)?;
            Some(Stage {
                pull_index: index,
                name: pull.name.clone(),
                is_gate: pull.is_gate,
                is_boss: false,
                travel_ticks: pull.travel_ticks.unwrap_or(default_travel_ticks),
            })
        });
        let boss = &self.dungeon.boss;
        let boss = Stage {
            pull_index: self.dungeon.pulls.len(),
            name: boss.boss.stats.name.clone(),
            is_gate: false,
            is_boss: true,
            travel_ticks: boss.travel_ticks.unwrap_or(default_travel_ticks),
        };
        trash.chain(std::iter::once(boss)).collect()
    }

    fn spawn(&self, stage: &Stage, now: Tick) -> Vec<AnimatedEnemy> {
        let from = |offset: usize, templates: &[EnemyTemplate]| -> Vec<AnimatedEnemy> {
            templates
                .iter()
                .enumerate()
                .map(|(i, template)| {
                    let id = EnemyId((offset + i) as u16);
                    AnimatedEnemy::from_template(id, template, &self.scaling, now)
                })
                .collect()
        };

        if !stage.is_boss {
            return self
                .dungeon
                .pulls
                .get(stage.pull_index)
                .map(|pull| from(0, &pull.enemies))
                .unwrap_or_default();
        }

        let boss_pull = &self.dungeon.boss;
        let stats = &boss_pull.boss.stats;
        let boss = AnimatedEnemy::from_template(EnemyId(0), stats, &self.scaling, now)
            .into_boss(self.boss_kit.clone(), now);
        let mut enemies = vec![boss];
        enemies.extend(from(1, &boss_pull.adds));
        enemies
    }
}

/// Result of one loop section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stopped,
    Ended(RunOutcome),
}

impl Flow {
    fn from_outcome(outcome: TickOutcome) -> Option<Self> {
        match outcome {
            TickOutcome::Continue | TickOutcome::EnemiesDefeated => None,
            TickOutcome::Wipe => Some(Flow::Ended(RunOutcome::Wipe)),
            TickOutcome::TimedOut => Some(Flow::Ended(RunOutcome::Timeout)),
        }
    }
}

/// Drives one run from the first travel tick to the result.
pub(crate) struct RunLoop {
    ctx: CombatContext,
    ai: EnemyAi,
    plan: RunPlan,
    pacer: Pacer,
    control: Arc<RunControl>,
    bus: EventBus,
    hooks: Box<dyn RunHooks>,
    resolver: Box<dyn PlayerActionResolver>,
    rewards: Box<dyn RewardGenerator>,
    /// Pull-clear rewards accumulated so far.
    earned: Reward,
}

impl RunLoop {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        ctx: CombatContext,
        plan: RunPlan,
        pacer: Pacer,
        control: Arc<RunControl>,
        bus: EventBus,
        hooks: Box<dyn RunHooks>,
        resolver: Box<dyn PlayerActionResolver>,
        rewards: Box<dyn RewardGenerator>,
    ) -> Self {
        let ai = EnemyAi::new(ctx.config.boss_priority);
        Self {
            ctx,
            ai,
            plan,
            pacer,
            control,
            bus,
            hooks,
            resolver,
            rewards,
            earned: Reward::default(),
        }
    }

    /// Main loop. `None` means the run was stopped from outside.
    pub(crate) async fn drive(mut self) -> Option<RunResult> {
        let stages = self.plan.stages(self.ctx.config.default_travel_ticks);
        info!(
            target: "runtime::loop",
            dungeon = %self.plan.dungeon.id,
            pulls = stages.len(),
            seed = self.ctx.seed,
            mode = %self.pacer.mode(),
            "run started"
        );
        self.publish(RunEvent::Started {
            dungeon: self.plan.dungeon.id.clone(),
            seed: self.ctx.seed,
            pulls: stages.len(),
        });

        match self.play(&stages).await {
            Flow::Stopped => {
                self.stopped();
                None
            }
            Flow::Ended(outcome) => Some(self.finish(outcome).await),
            Flow::Continue => Some(self.finish(RunOutcome::Victory).await),
        }
    }

    async fn play(&mut self, stages: &[Stage]) -> Flow {
        for (n, stage) in stages.iter().enumerate() {
            if n > 0 {
                let flow = self.recover().await;
                if flow != Flow::Continue {
                    return flow;
                }
            }
            let flow = self.travel(stage).await;
            if flow != Flow::Continue {
                return flow;
            }
            let flow = self.fight(stage).await;
            if flow != Flow::Continue {
                return flow;
            }
        }
        Flow::Continue
    }

    /// Cancellation point and suspension at the top of every tick.
    async fn begin_tick(&mut self) -> bool {
        if self.control.is_stopped() {
            return false;
        }
        self.pacer.pace(&self.control, self.ctx.tick).await;
        !self.control.is_stopped()
    }

    fn engine_step(&mut self) -> TickOutcome {
        let outcome = {
            let mut mailbox = self.control.mailbox();
            CombatEngine::new(&mut self.ctx, &self.ai).step(&mut mailbox, self.resolver.as_mut())
        };
        self.control.set_tick(self.ctx.tick);
        trace!(target: "runtime::loop", tick = self.ctx.tick.0, %outcome, "tick");
        outcome
    }

    async fn after_tick(&mut self) {
        let tick = self.ctx.tick;
        for event in self.ctx.drain_events() {
            if let CombatEvent::ScreenShake { intensity } = event {
                self.hooks.on_screen_shake(intensity).await;
            }
            self.bus.publish(Event::Combat(CombatRecord { tick, event }));
        }
        if tick.0 % self.pacer.snapshot_interval() == 0 {
            self.emit_snapshot().await;
        }
    }

    async fn emit_snapshot(&mut self) {
        let state = self.ctx.snapshot();
        self.hooks.on_snapshot(&state).await;
        self.bus.publish(Event::Snapshot(Box::new(state)));
    }

    fn publish(&self, event: RunEvent) {
        self.bus.publish(Event::Run(event));
    }

    fn phase_changed(&self) {
        debug!(
            target: "runtime::loop",
            phase = %self.ctx.phase,
            pull = self.ctx.encounter.pull_index,
            tick = self.ctx.tick.0,
            "phase changed"
        );
        self.publish(RunEvent::PhaseChanged {
            phase: self.ctx.phase,
            pull_index: self.ctx.encounter.pull_index,
            tick: self.ctx.tick,
        });
    }

    async fn travel(&mut self, stage: &Stage) -> Flow {
        self.ctx.begin_travel(stage.pull_index);
        self.phase_changed();
        for _ in 0..stage.travel_ticks {
            if !self.begin_tick().await {
                return Flow::Stopped;
            }
            let outcome = self.engine_step();
            self.after_tick().await;
            if let Some(flow) = Flow::from_outcome(outcome) {
                return flow;
            }
        }
        Flow::Continue
    }

    async fn fight(&mut self, stage: &Stage) -> Flow {
        let now = self.ctx.tick;
        let enemies = self.plan.spawn(stage, now);
        let forces_before = self.ctx.progress.forces_killed;
        info!(
            target: "runtime::loop",
            pull = stage.pull_index,
            name = %stage.name,
            enemies = enemies.len(),
            boss = stage.is_boss,
            tick = now.0,
            "pull started"
        );
        self.publish(RunEvent::PullStarted {
            pull_index: stage.pull_index,
            name: stage.name.clone(),
            is_gate: stage.is_gate,
            is_boss: stage.is_boss,
            enemies: enemies.len(),
            tick: now,
        });
        self.ctx.begin_pull(
            enemies,
            EncounterInfo {
                pull_index: stage.pull_index,
                is_gate: stage.is_gate,
                is_boss: stage.is_boss,
            },
        );
        self.phase_changed();

        loop {
            if !self.begin_tick().await {
                return Flow::Stopped;
            }
            let outcome = self.engine_step();
            self.after_tick().await;
            if outcome == TickOutcome::EnemiesDefeated {
                let forces = self.ctx.progress.forces_killed.saturating_sub(forces_before);
                self.pull_cleared(stage, forces).await;
                return Flow::Continue;
            }
            if let Some(flow) = Flow::from_outcome(outcome) {
                return flow;
            }
        }
    }

    async fn pull_cleared(&mut self, stage: &Stage, forces: u32) {
        self.ctx.progress.pulls_cleared += 1;
        let definition = if stage.is_boss {
            None
        } else {
            self.plan.dungeon.pulls.get(stage.pull_index)
        };
        let reward = self.rewards.pull_cleared(&self.plan.dungeon, definition, forces);
        self.earned += reward;

        let cleared = PullCleared {
            pull_index: stage.pull_index,
            name: stage.name.clone(),
            is_boss: stage.is_boss,
            forces,
            reward,
            tick: self.ctx.tick,
        };
        info!(
            target: "runtime::loop",
            pull = stage.pull_index,
            forces,
            total_forces = self.ctx.progress.forces_killed,
            experience = reward.experience,
            tick = self.ctx.tick.0,
            "pull cleared"
        );
        if reward.experience > 0 {
            self.hooks.on_experience(reward.experience).await;
        }
        self.hooks.on_pull_cleared(&cleared).await;
        self.publish(RunEvent::PullCleared(cleared));
    }

    async fn recover(&mut self) -> Flow {
        self.ctx.begin_recovery();
        self.phase_changed();
        let mut machine = RecoveryMachine::from_config(&self.ctx.config);

        while !machine.is_done() {
            if !self.begin_tick().await {
                let report = machine.finish(&mut self.ctx);
                debug!(target: "runtime::loop", ?report, "recovery interrupted by stop");
                return Flow::Stopped;
            }
            machine.step(&mut self.ctx);
            self.control.set_tick(self.ctx.tick);
            self.after_tick().await;
            if self.ctx.is_timed_out() {
                machine.finish(&mut self.ctx);
                return Flow::Ended(RunOutcome::Timeout);
            }
        }

        let report = machine.finish(&mut self.ctx);
        if report.timed_out {
            warn!(
                target: "runtime::loop",
                ticks = report.ticks,
                "recovery ran out of time, party not fully restored"
            );
        } else {
            info!(
                target: "runtime::loop",
                ticks = report.ticks,
                heals = report.heals_cast,
                revived = report.revived,
                "recovery finished"
            );
        }
        self.publish(RunEvent::RecoveryFinished {
            report,
            tick: self.ctx.tick,
        });
        if report.wiped {
            return Flow::Ended(RunOutcome::Wipe);
        }
        Flow::Continue
    }

    async fn finish(mut self, outcome: RunOutcome) -> RunResult {
        self.ctx.phase = match outcome {
            RunOutcome::Victory => CombatPhase::Victory,
            RunOutcome::Wipe | RunOutcome::Timeout => CombatPhase::Defeat,
        };
        self.phase_changed();

        let result = generate_result(&self.ctx, outcome);
        let completion = self.rewards.run_finished(&self.plan.dungeon, result.reward_scale);
        let result = result.with_rewards(self.earned + completion);
        info!(
            target: "runtime::loop",
            %outcome,
            ticks = result.ticks,
            reward_scale = result.reward_scale,
            experience = result.rewards.experience,
            currency = result.rewards.currency,
            "run finished"
        );

        if completion.experience > 0 {
            self.hooks.on_experience(completion.experience).await;
        }
        if outcome == RunOutcome::Wipe {
            let dead: Vec<String> = self
                .ctx
                .team
                .iter()
                .filter(|m| m.is_dead)
                .map(|m| m.name.clone())
                .collect();
            self.hooks.on_death_penalty(&dead).await;
        }
        self.emit_snapshot().await;
        self.hooks.on_run_finished(&result).await;
        self.publish(RunEvent::Finished(Box::new(result.clone())));
        result
    }

    fn stopped(&self) {
        info!(target: "runtime::loop", tick = self.ctx.tick.0, "run stopped");
        self.publish(RunEvent::Stopped { tick: self.ctx.tick });
    }
}
