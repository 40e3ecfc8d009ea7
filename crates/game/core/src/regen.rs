//! Per-tick buff expiry and resource regeneration for the party.

use crate::config::CombatConfig;
use crate::numeric;
use crate::state::{ActorRef, CombatContext, CombatEvent, TeamMemberState, Tick};

/// Regeneration amount per tick for a pool that restores `pct_per_sec` of `max` each second.
#[inline]
pub fn per_tick(max: f64, pct_per_sec: f64) -> f64 {
    numeric::non_negative(max * (pct_per_sec / 100.0) * CombatConfig::TICK_SECONDS)
}

pub fn mana_regen_per_tick(member: &TeamMemberState) -> f64 {
    let mut amount = per_tick(member.mana.max, member.mana_regen_pct);
    if member.level < CombatConfig::LOW_LEVEL_THRESHOLD {
        amount *= CombatConfig::LOW_LEVEL_MANA_MULTIPLIER;
    }
    numeric::non_negative(amount * member.talents.mana_regen_multiplier())
}

/// Energy shield gained this tick from recharge (delayed) and regeneration (always on).
pub fn energy_shield_per_tick(member: &TeamMemberState, now: Tick) -> f64 {
    let max = member.energy_shield.max;
    if max <= 0.0 {
        return 0.0;
    }
    let recharge_open = member
        .last_hit_tick
        .is_none_or(|hit| now.since(hit) >= member.es_recharge_delay_ticks());
    let recharge = if recharge_open {
        let rate = CombatConfig::ES_DEFAULT_RECHARGE_RATE + member.talents.es_recharge_rate;
        per_tick(max, rate)
    } else {
        0.0
    };
    recharge + per_tick(max, member.talents.es_regeneration)
}

/// Runs buff expiry, regeneration and heal-over-time resolution for one tick.
pub fn process_regen(ctx: &mut CombatContext) {
    let now = ctx.tick;
    ctx.party_buffs.expire(now);
    ctx.boss_buffs.expire(now);

    if ctx.config.auto_resurrect {
        auto_resurrect(ctx);
    }

    for member in ctx.team.iter_mut().filter(|m| m.is_alive()) {
        member.buffs.expire(now);

        let health = per_tick(member.health.max, member.health_regen_pct);
        member.health.restore(health);

        let mana = mana_regen_per_tick(member);
        member.mana.restore(mana);

        if !member.energy_shield.is_full() {
            let es = energy_shield_per_tick(member, now);
            member.energy_shield.restore(es);
        }
        member.sync_life();
    }

    process_heals_over_time(ctx);
}

fn auto_resurrect(ctx: &mut CombatContext) {
    let mut revived = Vec::new();
    for member in ctx.team.iter_mut().filter(|m| m.is_dead) {
        if member.revive(
            CombatConfig::AUTO_RESURRECT_HEALTH,
            CombatConfig::AUTO_RESURRECT_MANA,
        ) {
            revived.push((member.id, member.name.clone()));
        }
    }
    for (id, name) in revived {
        ctx.party_debuffs.clear_member(id);
        ctx.emit(CombatEvent::MemberRevived { member: id });
        ctx.push_log(format!("{name} is revived"));
        tracing::debug!(target: "combat::regen", member = %id, "auto-resurrected");
    }
}

fn process_heals_over_time(ctx: &mut CombatContext) {
    let now = ctx.tick;
    let mut hots = std::mem::take(&mut ctx.party_buffs.heals_over_time);
    for hot in hots.iter_mut() {
        if now < hot.next_tick_at || now >= hot.expires_at {
            continue;
        }
        let critical = ctx.rng.percent(hot.crit_chance);
        let amount = if critical {
            hot.amount_per_tick * hot.crit_multiplier
        } else {
            hot.amount_per_tick
        };
        ctx.heal_member(ActorRef::Member(hot.healer), hot.target, amount, &hot.id, critical);
        hot.next_tick_at = hot.next_tick_at + hot.interval_ticks.max(1);
    }
    hots.retain(|hot| {
        now < hot.expires_at && ctx.member(hot.target).is_some_and(|m| m.is_alive())
    });
    // Heals applied during resolution may have queued new HoTs.
    hots.append(&mut ctx.party_buffs.heals_over_time);
    ctx.party_buffs.heals_over_time = hots;
}
