//! Enemy decision making and action execution.
//!
//! Each combat tick the enemy phase:
//!
//! 1. ticks party debuffs,
//! 2. snapshots living enemies and the cast reservations,
//! 3. for every enemy in the snapshot, resolves a completed cast and, if the
//!    enemy is idle, evaluates its behavior tree and executes the intent.
//!
//! Decisions are made by [`BehaviorBook`] trees over a [`DecisionContext`];
//! boss kit selection is delegated to an [`AbilityPriority`] policy.
mod abilities;
mod actions;
pub mod behaviors;
pub mod boss;
mod casting;
mod dots;
pub mod targeting;

pub use actions::{aoe_cooldown, attack_interval};
pub use behaviors::{BehaviorBook, DecisionContext, EnemyIntent};
pub use boss::{
    AbilityCandidate, AbilityPriority, DeclaredOrder, SignaturePriority, priority_policy,
    refresh_gates, select_ability,
};
pub use dots::process_debuffs;
pub use targeting::{Reservations, TargetRolls, living_tank};

use crate::config::PriorityPolicyKind;
use crate::state::{CombatContext, EnemyId, MemberId};

/// Behavior trees plus the boss ability policy.
pub struct EnemyAi {
    book: BehaviorBook,
    priority: Box<dyn AbilityPriority>,
}

impl EnemyAi {
    pub fn new(policy: PriorityPolicyKind) -> Self {
        Self::with_priority(priority_policy(policy))
    }

    pub fn with_priority(priority: Box<dyn AbilityPriority>) -> Self {
        Self {
            book: BehaviorBook::new(),
            priority,
        }
    }

    pub fn priority(&self) -> &dyn AbilityPriority {
        self.priority.as_ref()
    }

    /// Runs debuff ticks and every living enemy's turn for the current tick.
    pub fn run_phase(&self, ctx: &mut CombatContext) {
        process_debuffs(ctx);

        let acting = ctx.alive_enemies();
        let mut reservations = Reservations::from_enemies(&ctx.enemies);

        for enemy in acting {
            if ctx.all_members_dead() {
                break;
            }
            self.take_turn(ctx, enemy, &mut reservations);
        }
    }

    fn take_turn(&self, ctx: &mut CombatContext, enemy: EnemyId, reservations: &mut Reservations) {
        let now = ctx.tick;
        // Thorns may have killed this enemy earlier in the phase.
        let Some(actor) = ctx.enemy_mut(enemy).filter(|e| e.is_alive()) else {
            return;
        };
        if let Some(cast) = actor.cast.take_due(now) {
            casting::resolve_cast(ctx, enemy, cast);
        }

        let Some(actor) = ctx.enemy(enemy) else {
            return;
        };
        if actor.is_dead || actor.cast.is_casting() {
            return;
        }
        let behavior = actor.behavior;
        let blackboard = self.blackboard(ctx, enemy, reservations);
        if let Some(intent) = self.book.decide(behavior, blackboard) {
            actions::execute_intent(ctx, enemy, intent, reservations);
        }
    }

    fn blackboard(
        &self,
        ctx: &mut CombatContext,
        enemy: EnemyId,
        reservations: &Reservations,
    ) -> DecisionContext {
        let now = ctx.tick;
        let rolls = TargetRolls::draw(&mut ctx.rng);
        let living = ctx.living_members();
        let tank = living_tank(&ctx.team);
        let cast_candidates = reservations.cast_candidates(&living);
        let unreserved: Vec<MemberId> = living
            .iter()
            .copied()
            .filter(|m| !reservations.is_reserved(*m))
            .collect();

        if let Some(actor) = ctx.enemy_mut(enemy) {
            let ratio = actor.health.ratio();
            if let Some(state) = actor.boss.as_mut() {
                refresh_gates(state, ratio, now);
            }
        }

        let Some(actor) = ctx.enemy(enemy) else {
            return DecisionContext::new(enemy, now, Default::default(), rolls);
        };
        let mut bb = DecisionContext::new(enemy, now, actor.cooldowns, rolls);
        bb.has_cleave = actor.cleave.is_some();
        bb.cast_ticks = actor.cast_ticks;
        bb.tank = tank;
        bb.living = living;
        bb.cast_candidates = cast_candidates;
        bb.unreserved = unreserved;
        bb.last_target = actor.last_target;

        if let Some(state) = &actor.boss {
            bb.has_kit = state.has_kit();
            bb.legacy_pulse_ready = now >= state.legacy_pulse_ready;
            bb.legacy_buster_ready = now >= state.legacy_buster_ready;
            bb.ready_boss_ability =
                select_ability(state, actor.health.ratio(), now, self.priority());
        }
        bb
    }
}

impl Default for EnemyAi {
    fn default() -> Self {
        Self::new(PriorityPolicyKind::default())
    }
}

impl std::fmt::Debug for EnemyAi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnemyAi")
            .field("priority", &self.priority.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombatConfig;
    use crate::env::{EnemyTemplate, MemberSpec, ScalingParams};
    use crate::state::{AnimatedEnemy, EncounterInfo, EnemyBehavior, Role, Tick};

    fn context(enemies: Vec<EnemyTemplate>, party: &[MemberSpec]) -> CombatContext {
        let mut ctx = CombatContext::new(CombatConfig::default(), party, 21);
        let scaling = ScalingParams::default();
        let enemies = enemies
            .iter()
            .enumerate()
            .map(|(i, t)| AnimatedEnemy::from_template(EnemyId(i as u16), t, &scaling, Tick(0)))
            .collect();
        ctx.begin_pull(enemies, EncounterInfo::default());
        ctx
    }

    #[test]
    fn casters_never_stack_new_casts_on_one_target() {
        let casters = vec![
            EnemyTemplate::new("acolyte", EnemyBehavior::Caster).with_ability(2, 20),
            EnemyTemplate::new("acolyte", EnemyBehavior::Caster).with_ability(2, 20),
            EnemyTemplate::new("acolyte", EnemyBehavior::Caster).with_ability(2, 20),
        ];
        let solo = MemberSpec::new("solo", Role::Tank).with_health(10_000.0);
        let mut ctx = context(casters, &[solo]);
        let ai = EnemyAi::default();

        ctx.tick = Tick(1);
        ai.run_phase(&mut ctx);
        let casting: Vec<_> = ctx
            .enemies
            .iter()
            .filter(|e| e.cast.target() == Some(MemberId(0)))
            .collect();
        assert_eq!(casting.len(), 1);
    }

    #[test]
    fn enemy_respects_global_cooldown() {
        let melee = vec![EnemyTemplate::new("grunt", EnemyBehavior::Melee).with_attack_interval(1)];
        let mut ctx = context(melee, &[MemberSpec::new("tank", Role::Tank).with_health(10_000.0)]);
        let ai = EnemyAi::default();
        for t in 0..20 {
            ctx.tick = Tick(t);
            ai.run_phase(&mut ctx);
        }
        // Swings at ticks 0 and 10 only.
        assert_eq!(ctx.team[0].counters.damage_taken, 20.0);
    }
}
