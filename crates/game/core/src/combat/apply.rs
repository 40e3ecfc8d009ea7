//! Applies resolved hits and heals to the combat context.
//!
//! This is the only place pools are lowered by combat damage, so it also owns
//! the side effects that hang off a hit: on-evade and on-block talents, energy
//! shield recharge delay, thorns, the damage log and immediate death flags.

use super::damage::IncomingHit;
use super::pipeline::{DefenderProfile, HitOutcome, HitRolls, resolve_hit, thorns_reflection};
use crate::numeric;
use crate::result::DeathCause;
use crate::state::{
    ActorRef, AnimatedEnemy, CombatContext, DamageLogEntry, EnemyId, FloatKind, MemberId,
    TeamMemberState, TimedValue,
};

impl TeamMemberState {
    pub fn defender_profile(&self) -> DefenderProfile<'_> {
        DefenderProfile {
            armor: self.defense.armor + self.buffs.armor_bonus(),
            evasion: self.defense.evasion,
            block_chance: self.block_chance(false),
            spell_block_chance: self.block_chance(true),
            suppression_chance: self.defense.suppression_chance,
            resistances: self.defense.resistances,
            energy_shield: self.energy_shield.current,
            bonus_reduction: self.buffs.damage_reduction_bonus(),
            talents: &self.talents,
        }
    }
}

impl AnimatedEnemy {
    pub fn defender_profile(&self, bonus_reduction: f64) -> DefenderProfile<'_> {
        DefenderProfile {
            armor: self.defense.armor,
            evasion: self.defense.evasion,
            block_chance: self.defense.block_chance,
            spell_block_chance: self.defense.spell_block_chance,
            suppression_chance: self.defense.suppression_chance,
            resistances: self.defense.resistances,
            energy_shield: self.energy_shield.current,
            bonus_reduction,
            talents: &self.talents,
        }
    }
}

fn float_kind(outcome: &HitOutcome) -> FloatKind {
    if outcome.blocked {
        FloatKind::Blocked
    } else if outcome.suppressed {
        FloatKind::Suppressed
    } else if outcome.damage_to_life <= 0.0 && outcome.damage_to_es > 0.0 {
        FloatKind::Shield
    } else {
        FloatKind::Damage
    }
}

impl CombatContext {
    /// Resolves `hit` against a living party member and applies the result.
    ///
    /// Returns `None` when the target does not exist or is already dead.
    pub fn strike_member(&mut self, target: MemberId, hit: IncomingHit) -> Option<HitOutcome> {
        let now = self.tick;
        let rolls = HitRolls::draw(&mut self.rng);
        let source_name = self.actor_name(hit.source);

        let member = self.team.get_mut(target.index())?;
        if member.is_dead {
            return None;
        }
        let outcome = resolve_hit(&hit, &member.defender_profile(), rolls);

        if outcome.evaded {
            let heal_pct = numeric::non_negative(member.talents.heal_on_evade);
            let heal = member.health.max * heal_pct / 100.0;
            let healed = member.health.restore(heal);
            if healed > 0.0 {
                member.counters.record_healing_received(healed);
            }
            self.push_floating(ActorRef::Member(target), 0.0, FloatKind::Evaded);
            tracing::trace!(
                target: "combat::mitigation",
                %target,
                ability = %hit.ability,
                "evaded"
            );
            return Some(outcome);
        }

        member.energy_shield.drain(outcome.damage_to_es);
        member.health.drain(outcome.damage_to_life);
        // Death is settled before any on-block effect can heal.
        member.sync_life();
        if !outcome.blocked && outcome.total > 0.0 {
            member.last_hit_tick = Some(now);
        }
        if outcome.blocked && member.is_alive() {
            let life_on_block_pct = numeric::non_negative(member.talents.life_on_block);
            let life_on_block = outcome.blocked_amount * life_on_block_pct / 100.0;
            let healed = member.health.restore(life_on_block);
            if healed > 0.0 {
                member.counters.record_healing_received(healed);
            }
            if let Some(stack) = member.talents.block_armor_stack {
                let stacks =
                    member.buffs.block_stacks.saturating_add(1).min(stack.max_stacks.max(1));
                member.buffs.block_stacks = stacks;
                member.buffs.armor = Some(TimedValue::new(
                    stack.armor_per_stack * f64::from(stacks),
                    now + stack.duration_ticks,
                ));
            }
        }

        let received = outcome.received();
        member.counters.record_damage_taken(&source_name, received);
        let died = member.is_dead;
        if died {
            member.death_cause = Some(DeathCause::from_hit(
                &member.name,
                hit.source,
                &source_name,
                &hit.ability,
                received,
                now,
            ));
        }
        let thorns = member.talents.thorns;
        let member_name = member.name.clone();

        if received > 0.0 {
            self.damage_log.push(DamageLogEntry {
                tick: now,
                target,
                source: hit.source,
                source_name: source_name.clone(),
                ability: hit.ability.clone(),
                amount: received,
            });
        }
        self.push_floating(ActorRef::Member(target), outcome.total, float_kind(&outcome));

        if let (ActorRef::Enemy(attacker), Some(reflect)) =
            (hit.source, thorns_reflection(received, thorns, &hit))
        {
            self.strike_enemy(ActorRef::Member(target), attacker, reflect);
        }

        if died {
            self.push_log(format!("{member_name} was slain by {source_name} ({})", hit.ability));
        }
        Some(outcome)
    }

    /// Resolves `hit` against a living enemy. Damage is credited to `attacker` when it is a member.
    pub fn strike_enemy(
        &mut self,
        attacker: ActorRef,
        target: EnemyId,
        hit: IncomingHit,
    ) -> Option<HitOutcome> {
        let rolls = HitRolls::draw(&mut self.rng);
        let bonus_reduction = self.boss_buffs.damage_reduction(target);

        let enemy = self.enemies.get_mut(target.index())?;
        if enemy.is_dead {
            return None;
        }
        let outcome = resolve_hit(&hit, &enemy.defender_profile(bonus_reduction), rolls);
        if outcome.evaded {
            self.push_floating(ActorRef::Enemy(target), 0.0, FloatKind::Evaded);
            return Some(outcome);
        }
        // Overkill is not credited.
        let received = enemy.energy_shield.drain(outcome.damage_to_es)
            + enemy.health.drain(outcome.damage_to_life);
        enemy.sync_life();

        if let ActorRef::Member(id) = attacker
            && let Some(member) = self.team.get_mut(id.index())
        {
            member.counters.record_damage_dealt(&hit.ability, received);
        }
        self.push_floating(ActorRef::Enemy(target), outcome.total, float_kind(&outcome));
        Some(outcome)
    }

    /// Heals a living member, returning the amount actually restored.
    pub fn heal_member(
        &mut self,
        healer: ActorRef,
        target: MemberId,
        amount: f64,
        ability: &str,
        critical: bool,
    ) -> f64 {
        let Some(member) = self.team.get_mut(target.index()) else {
            return 0.0;
        };
        if member.is_dead {
            return 0.0;
        }
        let healed = member.health.restore(amount);
        member.counters.record_healing_received(healed);
        if let ActorRef::Member(id) = healer
            && let Some(source) = self.team.get_mut(id.index())
        {
            source.counters.record_healing_done(ability, healed);
        }
        let kind = if critical {
            FloatKind::Critical
        } else {
            FloatKind::Heal
        };
        self.push_floating(ActorRef::Member(target), healed, kind);
        healed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{DamageType, HitKind};
    use crate::config::CombatConfig;
    use crate::env::MemberSpec;
    use crate::state::{Role, Tick};
    use crate::talents::TalentEffect;

    fn context(spec: MemberSpec) -> CombatContext {
        CombatContext::new(CombatConfig::default(), &[spec], 1)
    }

    fn swing(raw: f64) -> IncomingHit {
        IncomingHit::new(raw, DamageType::Physical, HitKind::Attack, ActorRef::Environment)
            .with_ability("swing")
    }

    #[test]
    fn lethal_hit_flags_death_immediately() {
        let mut ctx = context(MemberSpec::new("tank", Role::Tank).with_health(50.0));
        let out = ctx.strike_member(MemberId(0), swing(80.0)).expect("target alive");
        assert_eq!(out.total, 80.0);
        let tank = &ctx.team[0];
        assert_eq!(tank.health.current, 0.0);
        assert!(tank.is_dead);
        assert_eq!(ctx.damage_log.len(), 1);
        assert!(ctx.strike_member(MemberId(0), swing(10.0)).is_none());
    }

    #[test]
    fn block_heals_from_pre_reduction_amount_and_stacks_armor() {
        let mut spec = MemberSpec::new("tank", Role::Tank).with_health(500.0);
        spec.defense.block_chance = 100.0;
        spec.talents = vec![
            TalentEffect::LifeOnBlock(10.0),
            TalentEffect::BlockArmorStack {
                armor_per_stack: 20.0,
                max_stacks: 2,
                duration_ticks: 50,
            },
        ];
        let mut ctx = context(spec);
        ctx.tick = Tick(5);
        let out = ctx.strike_member(MemberId(0), swing(100.0)).expect("hit");
        assert!(out.blocked);
        // 100 blocked to 50, then 10% of the 100 blocked amount healed back.
        assert_eq!(ctx.team[0].health.current, 460.0);
        assert_eq!(ctx.team[0].buffs.block_stacks, 1);
        assert!(ctx.team[0].last_hit_tick.is_none());
    }

    #[test]
    fn lethal_blocked_hit_is_not_undone_by_block_healing() {
        let mut spec = MemberSpec::new("tank", Role::Tank).with_health(100.0);
        spec.defense.block_chance = 100.0;
        spec.talents = vec![
            TalentEffect::LifeOnBlock(500.0),
            TalentEffect::BlockArmorStack {
                armor_per_stack: 20.0,
                max_stacks: 2,
                duration_ticks: 50,
            },
        ];
        let mut ctx = context(spec);
        let out = ctx.strike_member(MemberId(0), swing(400.0)).expect("hit");
        assert!(out.blocked);

        let tank = &ctx.team[0];
        assert!(tank.is_dead);
        assert_eq!(tank.health.current, 0.0);
        assert_eq!(tank.counters.healing_received, 0.0);
        assert_eq!(tank.buffs.block_stacks, 0);
        assert!(ctx.strike_member(MemberId(0), swing(1.0)).is_none());
    }

    #[test]
    fn killing_blow_is_captured_on_the_member() {
        let mut ctx = context(MemberSpec::new("tank", Role::Tank).with_health(50.0));
        ctx.tick = Tick(12);
        ctx.strike_member(MemberId(0), swing(30.0));
        assert!(ctx.team[0].death_cause.is_none());

        ctx.strike_member(MemberId(0), swing(30.0));
        let cause = ctx.team[0].death_cause.as_ref().expect("dead");
        assert_eq!(cause.member, "tank");
        assert_eq!(cause.killer, "environment");
        assert_eq!(cause.ability, "swing");
        assert_eq!(cause.amount, 30.0);
        assert_eq!(cause.tick, Some(Tick(12)));
    }

    #[test]
    fn heal_is_credited_to_healer() {
        let mut ctx = CombatContext::new(
            CombatConfig::default(),
            &[
                MemberSpec::new("tank", Role::Tank).with_health(100.0),
                MemberSpec::new("healer", Role::Healer),
            ],
            1,
        );
        ctx.strike_member(MemberId(0), swing(40.0));
        let healer = ActorRef::Member(MemberId(1));
        let healed = ctx.heal_member(healer, MemberId(0), 100.0, "mend", false);
        assert_eq!(healed, 40.0);
        assert_eq!(ctx.team[1].counters.healing_done, 40.0);
        assert_eq!(ctx.team[1].counters.healing_by_ability["mend"], 40.0);
    }
}
