//! Executes enemy intents against the combat context.

use super::behaviors::EnemyIntent;
use super::targeting::Reservations;
use super::{abilities, casting};
use crate::combat::{AttackerModifiers, DamageType, HitKind, IncomingHit};
use crate::config::CombatConfig;
use crate::state::{
    ActorRef, AnimatedEnemy, CastAbility, CombatContext, CombatEvent, EnemyId, MemberId,
};

/// Builds a hit from `enemy` scaled by `multiplier` of its base damage.
pub(super) fn enemy_hit(
    ctx: &CombatContext,
    enemy: EnemyId,
    multiplier: f64,
    damage_type: DamageType,
    kind: HitKind,
    ability: &str,
) -> Option<IncomingHit> {
    let source = ctx.enemy(enemy)?;
    let attacker = AttackerModifiers {
        accuracy: source.accuracy,
        damage_multiplier: ctx.boss_buffs.damage_multiplier(enemy),
    };
    Some(
        IncomingHit::new(source.damage * multiplier, damage_type, kind, ActorRef::Enemy(enemy))
            .with_ability(ability)
            .with_attacker(attacker),
    )
}

/// Strikes every living member with a copy of `hit`.
pub(super) fn strike_party(ctx: &mut CombatContext, hit: &IncomingHit) {
    for target in ctx.living_members() {
        ctx.strike_member(target, hit.clone());
    }
}

/// Ticks between basic swings.
pub fn attack_interval(enemy: &AnimatedEnemy) -> u64 {
    let ticks = match &enemy.boss {
        Some(boss) => match &boss.kit {
            Some(kit) if kit.melee_interval_ticks > 0 => kit.melee_interval_ticks,
            Some(_) => enemy.attack_interval_ticks,
            None => CombatConfig::LEGACY_MELEE_TICKS,
        },
        None => enemy.attack_interval_ticks,
    };
    ticks.max(1)
}

/// Area ability cooldown, shortened on gate and boss pulls.
pub fn aoe_cooldown(ctx: &CombatContext, base_ticks: u64) -> u64 {
    if ctx.encounter.is_gate || ctx.encounter.is_boss {
        (base_ticks as f64 * CombatConfig::GATE_AOE_COOLDOWN_FACTOR).round() as u64
    } else {
        base_ticks
    }
}

pub(super) fn execute_intent(
    ctx: &mut CombatContext,
    enemy: EnemyId,
    intent: EnemyIntent,
    reservations: &mut Reservations,
) {
    let now = ctx.tick;
    tracing::trace!(target: "combat::ai", %enemy, ?intent, tick = now.0, "enemy acts");

    let acted = match intent {
        EnemyIntent::Attack { target } => {
            attack(ctx, enemy, target);
            true
        }
        EnemyIntent::Cleave => {
            cleave(ctx, enemy);
            true
        }
        EnemyIntent::PartyHit => {
            party_hit(ctx, enemy);
            true
        }
        EnemyIntent::LegacyPulse => {
            legacy_pulse(ctx, enemy);
            true
        }
        EnemyIntent::StartCast {
            ability,
            target,
            ticks,
        } => {
            if let Some(target) = target {
                reservations.reserve(target);
            }
            arm_cast_cooldown(ctx, enemy, &ability);
            casting::start_cast(ctx, enemy, ability, target, ticks);
            true
        }
        EnemyIntent::BossAbility { id } => {
            abilities::use_kit_ability(ctx, enemy, &id, reservations)
        }
    };

    // An intent that did nothing leaves the enemy free to act next tick.
    if acted && let Some(actor) = ctx.enemy_mut(enemy) {
        actor.cooldowns.global = now + CombatConfig::ENEMY_GCD_TICKS;
    }
}

pub(super) fn attack(ctx: &mut CombatContext, enemy: EnemyId, target: MemberId) {
    let now = ctx.tick;
    let Some(actor) = ctx.enemy(enemy) else {
        return;
    };
    let damage_type = actor.damage_type;
    let interval = attack_interval(actor);
    if let Some(hit) = enemy_hit(ctx, enemy, 1.0, damage_type, HitKind::Attack, "attack") {
        ctx.strike_member(target, hit);
    }
    if let Some(actor) = ctx.enemy_mut(enemy) {
        actor.cooldowns.attack = now + interval;
        actor.last_target = Some(target);
    }
}

fn cleave(ctx: &mut CombatContext, enemy: EnemyId) {
    let now = ctx.tick;
    let Some(actor) = ctx.enemy(enemy) else {
        return;
    };
    let Some(profile) = actor.cleave else {
        return;
    };
    let damage_type = actor.damage_type;
    let hit = enemy_hit(ctx, enemy, profile.factor, damage_type, HitKind::Attack, "cleave");
    if let Some(hit) = hit {
        strike_party(ctx, &hit);
    }
    if let Some(actor) = ctx.enemy_mut(enemy) {
        actor.cooldowns.cleave = now + profile.cooldown_ticks.max(1);
    }
}

fn party_hit(ctx: &mut CombatContext, enemy: EnemyId) {
    let now = ctx.tick;
    let Some(actor) = ctx.enemy(enemy) else {
        return;
    };
    let damage_type = actor.damage_type;
    let cooldown = aoe_cooldown(ctx, actor.ability_cooldown_ticks).max(1);
    if let Some(hit) = enemy_hit(
        ctx,
        enemy,
        CombatConfig::AOE_DAMAGE_FACTOR,
        damage_type,
        HitKind::Spell,
        "shockwave",
    ) {
        strike_party(ctx, &hit);
    }
    if let Some(actor) = ctx.enemy_mut(enemy) {
        actor.cooldowns.ability = now + cooldown;
    }
}

fn legacy_pulse(ctx: &mut CombatContext, enemy: EnemyId) {
    let now = ctx.tick;
    if let Some(hit) = enemy_hit(
        ctx,
        enemy,
        CombatConfig::LEGACY_PULSE_FACTOR,
        DamageType::Fire,
        HitKind::Spell,
        "searing_pulse",
    ) {
        strike_party(ctx, &hit);
    }
    if let Some(boss) = ctx.enemy_mut(enemy).and_then(|e| e.boss.as_mut()) {
        boss.legacy_pulse_ready = now + CombatConfig::LEGACY_PULSE_TICKS;
    }
    ctx.emit(CombatEvent::ScreenShake {
        intensity: CombatConfig::LIGHT_SHAKE,
    });
}

fn arm_cast_cooldown(ctx: &mut CombatContext, enemy: EnemyId, ability: &CastAbility) {
    let now = ctx.tick;
    let Some(actor) = ctx.enemy_mut(enemy) else {
        return;
    };
    match ability {
        CastAbility::Bolt | CastAbility::TankBuster => {
            actor.cooldowns.ability = now + actor.ability_cooldown_ticks;
        }
        CastAbility::LegacyTankBuster => {
            if let Some(boss) = actor.boss.as_mut() {
                boss.legacy_buster_ready = now + CombatConfig::LEGACY_BUSTER_COOLDOWN_TICKS;
            }
        }
        // Kit cooldowns are armed when the ability is selected.
        CastAbility::Kit(_) | CastAbility::RecoveryHeal | CastAbility::MassResurrection => {}
    }
}
