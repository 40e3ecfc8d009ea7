//! Boss kit ability effects.

use super::actions::enemy_hit;
use super::casting;
use super::targeting::{Reservations, living_tank};
use crate::config::CombatConfig;
use crate::env::{AbilityEffect, AbilityTarget, BossAbility};
use crate::numeric;
use crate::state::{
    ActorRef, CastAbility, CombatContext, CombatEvent, EnemyId, FloatKind, MemberId, TimedDebuff,
    TimedValue,
};

/// Looks up a kit ability on `boss`.
pub(super) fn kit_ability(ctx: &CombatContext, boss: EnemyId, id: &str) -> Option<BossAbility> {
    ctx.enemy(boss)?
        .boss
        .as_ref()?
        .kit
        .as_ref()?
        .ability(id)
        .cloned()
}

/// Starts (or, without a cast time, immediately executes) the kit ability the
/// boss selected this tick. Cooldowns arm at selection.
///
/// Returns `false` when the boss did nothing, either because the ability is
/// missing or because every castable target is already taken this tick.
pub(super) fn use_kit_ability(
    ctx: &mut CombatContext,
    boss: EnemyId,
    id: &str,
    reservations: &mut Reservations,
) -> bool {
    let now = ctx.tick;
    let Some(ability) = kit_ability(ctx, boss, id) else {
        tracing::error!(
            target: "combat::ai",
            %boss,
            ability = id,
            "selected ability missing from kit"
        );
        return false;
    };

    let single_target = matches!(ability.target, AbilityTarget::Tank | AbilityTarget::RandomMember);
    let target = if single_target && ability.cast_ticks > 0 {
        let living = ctx.living_members();
        let candidates = reservations.cast_candidates(&living);
        let Some(target) = pick_target(ctx, ability.target, &candidates) else {
            tracing::trace!(
                target: "combat::ai",
                %boss,
                ability = id,
                "no castable target, waiting"
            );
            return false;
        };
        reservations.reserve(target);
        Some(target)
    } else {
        None
    };

    if let Some(state) = ctx.enemy_mut(boss).and_then(|e| e.boss.as_mut()) {
        state.mark_used(&ability.id, now, ability.cooldown_ticks, ability.once_per_fight);
    }
    tracing::debug!(
        target: "combat::ai",
        %boss,
        ability = %ability.id,
        tick = now.0,
        "boss ability selected"
    );
    ctx.emit(CombatEvent::BossAbility {
        boss,
        ability: ability.id.clone(),
    });

    if ability.cast_ticks > 0 {
        casting::start_cast(
            ctx,
            boss,
            CastAbility::Kit(ability.id.clone()),
            target,
            ability.cast_ticks,
        );
    } else {
        execute(ctx, boss, &ability, None);
    }
    true
}

/// Tank if alive and eligible, otherwise a random eligible member.
fn pick_target(
    ctx: &mut CombatContext,
    target: AbilityTarget,
    candidates: &[MemberId],
) -> Option<MemberId> {
    if target == AbilityTarget::Tank
        && let Some(tank) = living_tank(&ctx.team).filter(|t| candidates.contains(t))
    {
        return Some(tank);
    }
    ctx.rng.pick(candidates).copied()
}

/// Applies a kit ability's effect. `target` is the member chosen at cast start.
pub(super) fn execute(
    ctx: &mut CombatContext,
    boss: EnemyId,
    ability: &BossAbility,
    target: Option<MemberId>,
) {
    let now = ctx.tick;
    let targets: Vec<MemberId> = match ability.target {
        AbilityTarget::Tank | AbilityTarget::RandomMember => {
            let chosen = match target {
                Some(t) => Some(t).filter(|t| ctx.member(*t).is_some_and(|m| m.is_alive())),
                None => {
                    let living = ctx.living_members();
                    pick_target(ctx, ability.target, &living)
                }
            };
            match chosen {
                Some(t) => vec![t],
                None => {
                    tracing::debug!(
                        target: "combat::ai",
                        %boss,
                        ability = %ability.id,
                        "ability fizzled, target gone"
                    );
                    return;
                }
            }
        }
        AbilityTarget::AllMembers => ctx.living_members(),
        AbilityTarget::Caster => Vec::new(),
    };

    match &ability.effect {
        AbilityEffect::Damage {
            multiplier,
            damage_type,
            kind,
        } => {
            if let Some(hit) = enemy_hit(ctx, boss, *multiplier, *damage_type, *kind, &ability.id) {
                for member in targets {
                    ctx.strike_member(member, hit.clone());
                }
            }
        }
        AbilityEffect::Affliction {
            multiplier_per_tick,
            damage_type,
            interval_ticks,
            duration_ticks,
            max_stacks,
        } => {
            let base = ctx.enemy(boss).map_or(0.0, |e| e.damage);
            let per_tick = numeric::guard_damage(
                base * multiplier_per_tick * ctx.boss_buffs.damage_multiplier(boss),
                "affliction",
            );
            let interval = (*interval_ticks).max(1);
            for member in targets {
                ctx.party_debuffs.apply(
                    member,
                    TimedDebuff {
                        id: ability.id.clone(),
                        source: boss,
                        damage_per_tick: per_tick,
                        damage_type: *damage_type,
                        interval_ticks: interval,
                        next_tick_at: now + interval,
                        expires_at: now + *duration_ticks,
                        stacks: 1,
                        max_stacks: *max_stacks,
                    },
                );
            }
        }
        AbilityEffect::Enrage {
            damage_pct,
            duration_ticks,
        } => {
            ctx.boss_buffs.entry(boss).damage =
                Some(TimedValue::new(numeric::non_negative(*damage_pct), now + *duration_ticks));
        }
        AbilityEffect::Barrier {
            reduction_pct,
            duration_ticks,
        } => {
            let reduction =
                numeric::clamp_percent(*reduction_pct, 0.0, CombatConfig::DAMAGE_REDUCTION_CAP);
            ctx.boss_buffs.entry(boss).damage_reduction =
                Some(TimedValue::new(reduction, now + *duration_ticks));
        }
        AbilityEffect::Mend { fraction } => {
            let healed = ctx.enemy_mut(boss).map_or(0.0, |e| {
                let amount = e.health.max * numeric::clamp_unit(*fraction);
                e.health.restore(amount)
            });
            if healed > 0.0 {
                ctx.push_floating(ActorRef::Enemy(boss), healed, FloatKind::Heal);
            }
        }
    }

    if ability.screen_shake {
        ctx.emit(CombatEvent::ScreenShake {
            intensity: CombatConfig::HEAVY_SHAKE,
        });
    }
    let name = ctx.actor_name(ActorRef::Enemy(boss));
    ctx.push_log(format!("{name} uses {}", ability.name));
}
