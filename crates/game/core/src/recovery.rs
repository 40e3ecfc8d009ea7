//! Between-pull recovery: the party healer tops everyone off and raises the dead.
//!
//! The machine advances one tick per [`RecoveryMachine::step`]:
//!
//! ```text
//! Healing -> MassResurrection (only if someone is dead) -> PostRezHealing -> Done
//! ```
//!
//! The healer has unlimited mana here. [`RecoveryMachine::finish`] must run on
//! every exit; it repairs life flags and, unless the budget ran out, leaves
//! every living member at full health and mana.

use crate::config::CombatConfig;
use crate::regen::process_regen;
use crate::state::{ActorRef, CastAbility, CombatContext, CombatEvent, MemberId, Role};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecoveryStage {
    Healing,
    MassResurrection,
    PostRezHealing,
    Done,
}

/// Summary of one recovery between pulls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecoveryReport {
    /// The tick budget ran out before the party was restored.
    pub timed_out: bool,
    /// Someone was dead and nobody could raise them.
    pub wiped: bool,
    pub ticks: u64,
    pub heals_cast: u32,
    pub revived: u32,
}

#[derive(Clone, Debug)]
pub struct RecoveryMachine {
    stage: RecoveryStage,
    budget_ticks: u64,
    report: RecoveryReport,
}

impl RecoveryMachine {
    pub fn new(budget_ticks: u64) -> Self {
        Self {
            stage: RecoveryStage::Healing,
            budget_ticks,
            report: RecoveryReport::default(),
        }
    }

    pub fn from_config(config: &CombatConfig) -> Self {
        Self::new(config.recovery_budget_ticks)
    }

    pub fn stage(&self) -> RecoveryStage {
        self.stage
    }

    pub fn is_done(&self) -> bool {
        self.stage == RecoveryStage::Done
    }

    /// Advances recovery by one tick and returns the stage reached.
    pub fn step(&mut self, ctx: &mut CombatContext) -> RecoveryStage {
        if self.is_done() {
            return self.stage;
        }
        if self.report.ticks >= self.budget_ticks {
            tracing::warn!(
                target: "combat::recovery",
                ticks = self.report.ticks,
                "recovery budget exhausted"
            );
            self.report.timed_out = true;
            self.stage = RecoveryStage::Done;
            return self.stage;
        }

        ctx.tick = ctx.tick + 1;
        self.report.ticks += 1;
        process_regen(ctx);

        let Some(healer) = living_healer(ctx) else {
            self.without_healer(ctx);
            return self.stage;
        };

        match self.stage {
            RecoveryStage::Healing | RecoveryStage::PostRezHealing => self.heal_step(ctx, healer),
            RecoveryStage::MassResurrection => self.resurrection_step(ctx, healer),
            RecoveryStage::Done => {}
        }
        self.stage
    }

    /// Steps until done or out of budget, then runs the repair pass.
    pub fn run_to_completion(mut self, ctx: &mut CombatContext) -> RecoveryReport {
        while !self.is_done() {
            self.step(ctx);
        }
        self.finish(ctx)
    }

    /// Repair pass; must run on every exit, including an external stop.
    pub fn finish(self, ctx: &mut CombatContext) -> RecoveryReport {
        for member in &mut ctx.team {
            member.cast.cancel();
            member.sync_life();
            if member.is_dead {
                member.death_tick.get_or_insert(ctx.tick);
            } else if !self.report.timed_out {
                member.health.fill();
                member.mana.fill();
            }
        }
        let report = self.report;
        tracing::debug!(target: "combat::recovery", ?report, "recovery finished");
        report
    }

    fn without_healer(&mut self, ctx: &mut CombatContext) {
        if ctx.team.iter().any(|m| m.is_dead) {
            tracing::warn!(target: "combat::recovery", "dead members and no living healer");
            ctx.push_log("Nobody is left to raise the fallen");
            self.report.wiped = true;
        }
        self.stage = RecoveryStage::Done;
    }

    fn heal_step(&mut self, ctx: &mut CombatContext, healer: MemberId) {
        let now = ctx.tick;
        let due = ctx.member_mut(healer).and_then(|m| m.cast.take_due(now));
        if let Some(cast) = due {
            if let Some(target) = cast.target {
                self.land_heal(ctx, healer, target);
            }
            return;
        }
        if ctx.member(healer).is_some_and(|m| m.cast.is_casting()) {
            return;
        }

        match most_injured(ctx) {
            Some(target) => {
                if let Some(member) = ctx.member_mut(healer) {
                    member.cast.begin(
                        CastAbility::RecoveryHeal,
                        now,
                        CombatConfig::RECOVERY_HEAL_CAST_TICKS,
                        Some(target),
                    );
                }
            }
            None if self.stage == RecoveryStage::Healing && ctx.team.iter().any(|m| m.is_dead) => {
                if let Some(member) = ctx.member_mut(healer) {
                    member.cast.begin(
                        CastAbility::MassResurrection,
                        now,
                        CombatConfig::MASS_RESURRECTION_TICKS,
                        None,
                    );
                }
                let name = ctx.actor_name(ActorRef::Member(healer));
                ctx.push_log(format!("{name} begins casting Mass Resurrection"));
                self.stage = RecoveryStage::MassResurrection;
            }
            None => self.stage = RecoveryStage::Done,
        }
    }

    fn land_heal(&mut self, ctx: &mut CombatContext, healer: MemberId, target: MemberId) {
        let crit_chance = ctx.member(healer).map_or(0.0, |m| m.offense.crit_chance);
        let critical = ctx.rng.percent(crit_chance);
        let Some(max) = ctx.member(target).map(|m| m.health.max) else {
            return;
        };
        let mut amount = max * CombatConfig::RECOVERY_HEAL_FRACTION;
        if critical {
            amount *= CombatConfig::RECOVERY_CRIT_MULTIPLIER;
        }
        let healed =
            ctx.heal_member(ActorRef::Member(healer), target, amount, "recovery_heal", critical);
        if let Some(member) = ctx.member_mut(healer) {
            member.counters.heals_cast += 1;
        }
        self.report.heals_cast += 1;
        tracing::trace!(
            target: "combat::recovery",
            %target,
            healed,
            critical,
            "recovery heal landed"
        );
    }

    fn resurrection_step(&mut self, ctx: &mut CombatContext, healer: MemberId) {
        let now = ctx.tick;
        let due = ctx.member_mut(healer).and_then(|m| m.cast.take_due(now));
        if due.is_none() {
            return;
        }

        let dead: Vec<MemberId> = ctx.team.iter().filter(|m| m.is_dead).map(|m| m.id).collect();
        for id in dead {
            let revived = ctx.member_mut(id).is_some_and(|m| {
                m.revive(CombatConfig::MASS_RESURRECTION_HEALTH, CombatConfig::RESURRECT_MANA)
            });
            if revived {
                self.report.revived += 1;
                ctx.party_debuffs.clear_member(id);
                ctx.emit(CombatEvent::MemberRevived { member: id });
            }
        }
        ctx.push_log(format!("Mass Resurrection raises {} members", self.report.revived));
        tracing::info!(
            target: "combat::recovery",
            revived = self.report.revived,
            tick = now.0,
            "mass resurrection"
        );
        self.stage = RecoveryStage::PostRezHealing;
    }
}

impl Default for RecoveryMachine {
    fn default() -> Self {
        Self::new(CombatConfig::DEFAULT_RECOVERY_BUDGET_TICKS)
    }
}

fn living_healer(ctx: &CombatContext) -> Option<MemberId> {
    ctx.team
        .iter()
        .find(|m| m.role == Role::Healer && m.is_alive())
        .map(|m| m.id)
}

/// Living member missing the largest share of health; ties go to the lowest id.
fn most_injured(ctx: &CombatContext) -> Option<MemberId> {
    let mut best: Option<(MemberId, f64)> = None;
    for member in ctx.team.iter().filter(|m| m.is_alive()) {
        let missing = member.missing_health_ratio();
        if missing <= 0.0 {
            continue;
        }
        if best.is_none_or(|(_, current)| missing > current) {
            best = Some((member.id, missing));
        }
    }
    best.map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MemberSpec;

    fn party() -> CombatContext {
        CombatContext::new(
            CombatConfig::default(),
            &[
                MemberSpec::new("tank", Role::Tank).with_health(1_000.0),
                MemberSpec::new("healer", Role::Healer).with_health(500.0),
                MemberSpec::new("rogue", Role::Damage).with_health(600.0),
            ],
            11,
        )
    }

    #[test]
    fn heals_the_most_injured_first() {
        let mut ctx = party();
        ctx.team[0].health.set(900.0);
        ctx.team[2].health.set(300.0);
        assert_eq!(most_injured(&ctx), Some(MemberId(2)));
    }

    #[test]
    fn heal_lands_after_cast_time() {
        let mut ctx = party();
        ctx.team[2].health.set(100.0);
        let mut machine = RecoveryMachine::default();
        for _ in 0..CombatConfig::RECOVERY_HEAL_CAST_TICKS {
            machine.step(&mut ctx);
        }
        assert_eq!(machine.report.heals_cast, 0);
        machine.step(&mut ctx);
        assert_eq!(machine.report.heals_cast, 1);
        assert!(ctx.team[2].health.current >= 100.0 + 600.0 * 0.35);
    }

    #[test]
    fn no_healer_with_dead_member_is_a_wipe() {
        let mut ctx = party();
        ctx.team[1].health.set(0.0);
        ctx.team[1].sync_life();
        ctx.team[2].health.set(0.0);
        ctx.team[2].sync_life();
        let report = RecoveryMachine::default().run_to_completion(&mut ctx);
        assert!(report.wiped);
        assert!(ctx.team[2].is_dead);
    }

    #[test]
    fn budget_exhaustion_skips_top_off() {
        let mut ctx = party();
        ctx.team[0].health.set(10.0);
        let report = RecoveryMachine::new(3).run_to_completion(&mut ctx);
        assert!(report.timed_out);
        assert!(ctx.team[0].health.current < 1_000.0);
    }
}
