//! Tick scheduling and phase pipeline.
//!
//! The [`CombatEngine`] is the authoritative reducer for [`CombatContext`].
//! One call to [`CombatEngine::step`] advances the simulation by one tick and
//! runs the phases in a fixed order:
//!
//! 1. advance the tick, check the hard time limit
//! 2. consume at most one external command per kind
//! 3. buff expiry and regeneration
//! 4. enemy phase (debuffs, casts, behavior trees)
//! 5. player phase against a fixed alive-enemy snapshot
//! 6. death bookkeeping
//!
//! Cooldowns are expiry ticks, so step 1 elapses all of them. The engine
//! never sleeps or yields; suspension is the runtime's concern.
mod commands;

pub use commands::{CommandBatch, CommandKind, CommandMailbox, ExternalCommand, apply_commands};

use crate::ai::EnemyAi;
use crate::player::{PlayerActionResolver, PlayerPhase};
use crate::regen::process_regen;
use crate::state::{ActorRef, CombatContext, CombatEvent, CombatPhase};

/// What a tick means for the loop driving the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TickOutcome {
    Continue,
    /// Every enemy of the current pull is dead.
    EnemiesDefeated,
    /// Every party member is dead. Takes precedence over `EnemiesDefeated`.
    Wipe,
    /// The run's time limit was reached before any phase ran.
    TimedOut,
}

impl TickOutcome {
    /// Whether the current pull is over.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// Combat engine borrowing the run context for a sequence of ticks.
pub struct CombatEngine<'a> {
    ctx: &'a mut CombatContext,
    ai: &'a EnemyAi,
}

impl<'a> CombatEngine<'a> {
    pub fn new(ctx: &'a mut CombatContext, ai: &'a EnemyAi) -> Self {
        Self { ctx, ai }
    }

    /// Read-only view of the context between steps.
    pub fn context(&self) -> &CombatContext {
        self.ctx
    }

    /// Advances one tick, consuming commands from `mailbox`.
    pub fn step(
        &mut self,
        mailbox: &mut CommandMailbox,
        resolver: &mut dyn PlayerActionResolver,
    ) -> TickOutcome {
        self.ctx.tick = self.ctx.tick + 1;
        if self.ctx.is_timed_out() {
            tracing::debug!(target: "combat::engine", tick = self.ctx.tick.0, "time limit reached");
            return TickOutcome::TimedOut;
        }
        let batch = mailbox.take_tick_batch();
        self.run_phases(batch, resolver)
    }

    /// Runs every phase for the current tick without advancing it.
    pub fn run_phases(
        &mut self,
        commands: impl IntoIterator<Item = ExternalCommand>,
        resolver: &mut dyn PlayerActionResolver,
    ) -> TickOutcome {
        apply_commands(self.ctx, commands);
        process_regen(self.ctx);

        if self.ctx.phase == CombatPhase::Combat {
            self.ctx.combat_ticks += 1;
            self.ai.run_phase(self.ctx);

            let targets = self.ctx.alive_enemies();
            if !targets.is_empty() && !self.ctx.all_members_dead() {
                let mut phase = PlayerPhase::new(self.ctx, targets);
                resolver.resolve(&mut phase);
            }
        }

        settle_deaths(self.ctx);
        self.outcome()
    }

    fn outcome(&self) -> TickOutcome {
        if self.ctx.all_members_dead() {
            TickOutcome::Wipe
        } else if self.ctx.phase == CombatPhase::Combat && self.ctx.all_enemies_dead() {
            TickOutcome::EnemiesDefeated
        } else {
            TickOutcome::Continue
        }
    }
}

/// Records deaths that happened this tick: counters, events, casts and effects.
///
/// Health and the dead flag are already consistent; this only runs the
/// one-time bookkeeping for each new death.
pub fn settle_deaths(ctx: &mut CombatContext) {
    let now = ctx.tick;

    let fallen: Vec<_> = ctx
        .team
        .iter()
        .filter(|m| m.is_dead && m.death_tick.is_none())
        .map(|m| m.id)
        .collect();
    for id in fallen {
        let killer = ctx
            .member(id)
            .and_then(|m| m.death_cause.as_ref())
            .map(|cause| cause.killer.clone())
            .or_else(|| ctx.last_damage_to(id).map(|entry| entry.source_name.clone()));
        let Some(member) = ctx.member_mut(id) else {
            continue;
        };
        member.death_tick = Some(now);
        member.counters.deaths += 1;
        member.cast.cancel();
        member.buffs = Default::default();
        let name = member.name.clone();

        ctx.party_debuffs.clear_member(id);
        ctx.party_buffs.heals_over_time.retain(|hot| hot.target != id);
        tracing::info!(
            target: "combat::engine",
            member = %name,
            killer = ?killer,
            tick = now.0,
            "party member died"
        );
        ctx.emit(CombatEvent::MemberDied { member: id, killer });
    }

    let slain: Vec<_> = ctx
        .enemies
        .iter()
        .filter(|e| e.is_dead && e.death_tick.is_none())
        .map(|e| e.id)
        .collect();
    for id in slain {
        let Some(enemy) = ctx.enemy_mut(id) else {
            continue;
        };
        enemy.death_tick = Some(now);
        enemy.cast.cancel();
        let forces = enemy.forces;
        let is_boss = enemy.is_boss();

        ctx.boss_buffs.active.remove(&id);
        ctx.progress.forces_killed = ctx.progress.forces_killed.saturating_add(forces);
        if is_boss {
            ctx.progress.boss_defeated = true;
        }
        let name = ctx.actor_name(ActorRef::Enemy(id));
        ctx.push_log(format!("{name} is defeated"));
        tracing::debug!(
            target: "combat::engine",
            enemy = %name,
            forces,
            tick = now.0,
            "enemy died"
        );
        ctx.emit(CombatEvent::EnemyDied { enemy: id, forces });
    }
}
