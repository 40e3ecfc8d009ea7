//! Player-side actions for one tick.
//!
//! The host plugs in a [`PlayerActionResolver`] that decides what party
//! members do. It acts through [`PlayerPhase`], which pins the alive-enemy
//! snapshot taken at the start of player resolution and routes every hit
//! through the mitigation pipeline.

use crate::combat::{AttackerModifiers, HitKind, HitOutcome, IncomingHit};
use crate::numeric;
use crate::rng::CombatRng;
use crate::state::{
    ActorRef, AnimatedEnemy, CombatContext, EnemyId, HealOverTime, MemberId, TeamMemberState, Tick,
};

/// Decides party actions once per combat tick.
pub trait PlayerActionResolver: Send {
    fn resolve(&mut self, phase: &mut PlayerPhase<'_>);
}

/// Resolver that does nothing; enemies still act and regen still runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdleResolver;

impl PlayerActionResolver for IdleResolver {
    fn resolve(&mut self, _phase: &mut PlayerPhase<'_>) {}
}

/// A heal that was applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealOutcome {
    pub amount: f64,
    pub critical: bool,
}

/// Mutable view of the context during player resolution.
pub struct PlayerPhase<'a> {
    ctx: &'a mut CombatContext,
    targets: Vec<EnemyId>,
}

impl<'a> PlayerPhase<'a> {
    pub fn new(ctx: &'a mut CombatContext, targets: Vec<EnemyId>) -> Self {
        Self { ctx, targets }
    }

    pub fn tick(&self) -> Tick {
        self.ctx.tick
    }

    /// Enemies alive when player resolution started.
    pub fn targets(&self) -> &[EnemyId] {
        &self.targets
    }

    pub fn team(&self) -> &[TeamMemberState] {
        &self.ctx.team
    }

    pub fn member(&self, id: MemberId) -> Option<&TeamMemberState> {
        self.ctx.member(id)
    }

    pub fn member_mut(&mut self, id: MemberId) -> Option<&mut TeamMemberState> {
        self.ctx.member_mut(id)
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&AnimatedEnemy> {
        self.ctx.enemy(id)
    }

    pub fn rng(&mut self) -> &mut CombatRng {
        &mut self.ctx.rng
    }

    /// Outgoing damage multiplier for `member` (bloodlust and talents).
    pub fn damage_multiplier(&self, member: MemberId) -> f64 {
        let talents = self
            .ctx
            .member(member)
            .map_or(1.0, |m| m.talents.damage_multiplier());
        self.ctx.party_buffs.damage_multiplier() * talents
    }

    pub fn haste_pct(&self) -> f64 {
        self.ctx.party_buffs.haste_pct()
    }

    /// Swing interval after haste, never below one tick.
    pub fn hasted_interval(&self, base_ticks: u64) -> u64 {
        let factor = 1.0 + numeric::non_negative(self.haste_pct()) / 100.0;
        ((base_ticks as f64 / factor).round() as u64).max(1)
    }

    /// Strikes an enemy from the snapshot on behalf of a living member.
    ///
    /// Enemies outside the snapshot, or killed earlier in this phase, are not hit.
    pub fn strike_enemy(
        &mut self,
        attacker: MemberId,
        target: EnemyId,
        hit: IncomingHit,
    ) -> Option<HitOutcome> {
        if !self.targets.contains(&target) {
            tracing::trace!(
                target: "combat::player",
                %attacker,
                %target,
                "target outside snapshot"
            );
            return None;
        }
        if !self.ctx.member(attacker).is_some_and(|m| m.is_alive()) {
            return None;
        }
        let outcome = self.ctx.strike_enemy(ActorRef::Member(attacker), target, hit)?;
        if !outcome.evaded
            && let Some(member) = self.ctx.member_mut(attacker)
        {
            member.counters.hits_landed += 1;
        }
        Some(outcome)
    }

    /// Basic attack using the member's offensive stats, with a crit roll.
    pub fn auto_attack(&mut self, attacker: MemberId, target: EnemyId) -> Option<HitOutcome> {
        let multiplier = self.damage_multiplier(attacker);
        let member = self.ctx.member(attacker)?;
        let offense = member.offense;
        let critical = self.ctx.rng.percent(offense.crit_chance);
        let crit = if critical { offense.crit_multiplier.max(1.0) } else { 1.0 };
        let source = ActorRef::Member(attacker);
        let damage = offense.attack_damage;
        let hit = IncomingHit::new(damage, offense.damage_type, HitKind::Attack, source)
            .with_ability("attack")
            .with_attacker(AttackerModifiers {
                accuracy: offense.accuracy,
                damage_multiplier: multiplier * crit,
            });
        self.strike_enemy(attacker, target, hit)
    }

    /// Heals `target` for `amount`, rolling the healer's crit.
    pub fn heal_member(
        &mut self,
        healer: MemberId,
        target: MemberId,
        amount: f64,
        ability: &str,
    ) -> HealOutcome {
        let (crit_chance, crit_multiplier) = self
            .ctx
            .member(healer)
            .map_or((0.0, 1.0), |m| (m.offense.crit_chance, m.offense.crit_multiplier));
        let critical = self.ctx.rng.percent(crit_chance);
        let amount = if critical {
            amount * crit_multiplier.max(1.0)
        } else {
            amount
        };
        let healed = self
            .ctx
            .heal_member(ActorRef::Member(healer), target, amount, ability, critical);
        if let Some(member) = self.ctx.member_mut(healer) {
            member.counters.heals_cast += 1;
        }
        HealOutcome {
            amount: healed,
            critical,
        }
    }

    /// Places a heal-over-time; an existing one with the same id and target is replaced.
    pub fn apply_hot(&mut self, hot: HealOverTime) {
        let hots = &mut self.ctx.party_buffs.heals_over_time;
        hots.retain(|h| !(h.id == hot.id && h.target == hot.target));
        hots.push(hot);
    }

    /// Spends mana if the member can afford it.
    pub fn spend_mana(&mut self, member: MemberId, cost: f64) -> bool {
        let Some(member) = self.ctx.member_mut(member) else {
            return false;
        };
        let cost = numeric::non_negative(cost);
        if member.mana.current < cost {
            return false;
        }
        member.mana.drain(cost);
        true
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.ctx.push_log(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::DamageType;
    use crate::config::CombatConfig;
    use crate::env::{EnemyTemplate, MemberSpec, ScalingParams};
    use crate::state::{EncounterInfo, EnemyBehavior, Role, Tick};

    fn context() -> CombatContext {
        let mut ctx = CombatContext::new(
            CombatConfig::default(),
            &[MemberSpec::new("rogue", Role::Damage)],
            5,
        );
        let template = EnemyTemplate::new("rat", EnemyBehavior::Melee).with_health(100.0);
        let scaling = ScalingParams::default();
        let rats = (0..2)
            .map(|i| AnimatedEnemy::from_template(EnemyId(i), &template, &scaling, Tick(0)))
            .collect();
        ctx.begin_pull(rats, EncounterInfo::default());
        ctx
    }

    #[test]
    fn strikes_outside_snapshot_are_ignored() {
        let mut ctx = context();
        let mut phase = PlayerPhase::new(&mut ctx, vec![EnemyId(0)]);
        let source = ActorRef::Member(MemberId(0));
        let hit = IncomingHit::new(10.0, DamageType::Physical, HitKind::Spell, source);
        assert!(phase.strike_enemy(MemberId(0), EnemyId(1), hit.clone()).is_none());
        assert!(phase.strike_enemy(MemberId(0), EnemyId(0), hit).is_some());
        assert_eq!(ctx.enemies[0].health.current, 90.0);
        assert_eq!(ctx.team[0].counters.damage_dealt, 10.0);
    }

    #[test]
    fn bloodlust_hastes_swings() {
        let mut ctx = context();
        ctx.party_buffs.bloodlust = Some(crate::state::Bloodlust {
            damage_pct: 30.0,
            haste_pct: 30.0,
            ends_at: Tick(400),
        });
        let phase = PlayerPhase::new(&mut ctx, Vec::new());
        assert_eq!(phase.hasted_interval(13), 10);
        assert!((phase.damage_multiplier(MemberId(0)) - 1.3).abs() < 1e-9);
    }

    #[test]
    fn mana_is_spent_only_when_affordable() {
        let mut ctx = context();
        let mut phase = PlayerPhase::new(&mut ctx, Vec::new());
        assert!(phase.spend_mana(MemberId(0), 30.0));
        assert!(!phase.spend_mana(MemberId(0), 30.0));
    }
}
