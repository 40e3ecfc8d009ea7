//! Enemy cast start and resolution.

use super::actions::{attack, enemy_hit};
use super::abilities;
use super::targeting::living_tank;
use crate::combat::{DamageType, HitKind};
use crate::config::CombatConfig;
use crate::state::{
    ActiveCast, ActorRef, CastAbility, CombatContext, CombatEvent, EnemyId, MemberId,
};

/// Starts a cast. Zero-tick casts resolve immediately.
pub(super) fn start_cast(
    ctx: &mut CombatContext,
    enemy: EnemyId,
    ability: CastAbility,
    target: Option<MemberId>,
    ticks: u64,
) {
    let now = ctx.tick;
    if ticks == 0 {
        let cast = ActiveCast {
            ability,
            start_tick: now,
            end_tick: now,
            target,
        };
        resolve_cast(ctx, enemy, cast);
        return;
    }

    let Some(caster) = ctx.enemy_mut(enemy) else {
        return;
    };
    let label = ability.label().to_owned();
    caster.cast.begin(ability, now, ticks, target);
    let name = caster.name.clone();

    tracing::trace!(
        target: "combat::ai",
        %enemy,
        ability = %label,
        ?target,
        end_tick = (now + ticks).0,
        "cast started"
    );
    ctx.push_log(format!("{name} begins casting {label}"));
    ctx.emit(CombatEvent::CastStarted {
        caster: enemy,
        ability: label,
        target,
        end_tick: now + ticks,
    });
}

/// Executes a completed cast. The caster's cast state is already idle.
pub(super) fn resolve_cast(ctx: &mut CombatContext, enemy: EnemyId, cast: ActiveCast) {
    let label = cast.ability.label().to_owned();
    ctx.emit(CombatEvent::CastResolved {
        caster: enemy,
        ability: label.clone(),
    });

    match &cast.ability {
        CastAbility::Bolt => {
            let damage_type = ctx.enemy(enemy).map_or(DamageType::Fire, |e| e.damage_type);
            strike_cast_target(ctx, enemy, cast.target, 1.0, damage_type, HitKind::Spell, &label);
        }
        CastAbility::TankBuster => {
            strike_cast_target(
                ctx,
                enemy,
                cast.target,
                CombatConfig::TANKBUSTER_MULTIPLIER,
                DamageType::Physical,
                HitKind::Attack,
                &label,
            );
        }
        CastAbility::LegacyTankBuster => {
            let landed = strike_cast_target(
                ctx,
                enemy,
                cast.target,
                CombatConfig::TANKBUSTER_MULTIPLIER,
                DamageType::Physical,
                HitKind::Attack,
                &label,
            );
            if landed {
                ctx.emit(CombatEvent::ScreenShake {
                    intensity: CombatConfig::HEAVY_SHAKE,
                });
            }
        }
        CastAbility::Kit(id) => match abilities::kit_ability(ctx, enemy, id) {
            Some(ability) => abilities::execute(ctx, enemy, &ability, cast.target),
            None => {
                tracing::error!(
                    target: "combat::ai",
                    %enemy,
                    ability = %id,
                    "cast resolved for unknown kit ability, falling back to melee"
                );
                let fallback =
                    living_tank(&ctx.team).or_else(|| ctx.living_members().first().copied());
                if let Some(target) = fallback {
                    attack(ctx, enemy, target);
                }
            }
        },
        CastAbility::RecoveryHeal | CastAbility::MassResurrection => {
            tracing::warn!(
                target: "combat::ai",
                %enemy,
                ability = %label,
                "enemy resolved a party-only cast"
            );
        }
    }
}

/// Strikes the cast's target if it is still alive. Returns whether the hit landed.
fn strike_cast_target(
    ctx: &mut CombatContext,
    enemy: EnemyId,
    target: Option<MemberId>,
    multiplier: f64,
    damage_type: DamageType,
    kind: HitKind,
    label: &str,
) -> bool {
    let alive = target.filter(|t| ctx.member(*t).is_some_and(|m| m.is_alive()));
    let Some(target) = alive else {
        tracing::debug!(target: "combat::ai", %enemy, ability = label, "cast fizzled, target gone");
        let name = ctx.actor_name(ActorRef::Enemy(enemy));
        ctx.push_log(format!("{name}'s {label} fizzles"));
        return false;
    };
    let Some(hit) = enemy_hit(ctx, enemy, multiplier, damage_type, kind, label) else {
        return false;
    };
    ctx.strike_member(target, hit).is_some()
}
