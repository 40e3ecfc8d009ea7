//! Damage-over-time debuffs on party members.

use crate::combat::{DamageType, HitKind, IncomingHit};
use crate::state::{ActorRef, CombatContext, EnemyId, MemberId};

struct DueTick {
    member: MemberId,
    source: EnemyId,
    id: String,
    raw: f64,
    damage_type: DamageType,
}

/// Ticks every due debuff through the mitigation pipeline and drops expired ones.
///
/// Debuffs keep ticking after their source dies; they are independent of the
/// owning ability's cast and cooldown cycle.
pub fn process_debuffs(ctx: &mut CombatContext) {
    let now = ctx.tick;
    let mut due = Vec::new();

    for (member, slot) in ctx.party_debuffs.active.iter_mut() {
        for debuff in slot.iter_mut() {
            if now >= debuff.expires_at || now < debuff.next_tick_at {
                continue;
            }
            due.push(DueTick {
                member: *member,
                source: debuff.source,
                id: debuff.id.clone(),
                raw: debuff.damage_per_tick * f64::from(debuff.stacks.max(1)),
                damage_type: debuff.damage_type,
            });
            debuff.next_tick_at = debuff.next_tick_at + debuff.interval_ticks.max(1);
        }
        slot.retain(|d| now < d.expires_at);
    }
    ctx.party_debuffs.active.retain(|_, slot| !slot.is_empty());

    for tick in due {
        let hit = IncomingHit::new(
            tick.raw,
            tick.damage_type,
            HitKind::DamageOverTime,
            ActorRef::Enemy(tick.source),
        )
        .with_ability(tick.id);
        ctx.strike_member(tick.member, hit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombatConfig;
    use crate::env::MemberSpec;
    use crate::state::{Role, Tick, TimedDebuff};

    #[test]
    fn stacked_debuff_ticks_on_interval_until_expiry() {
        let mut ctx = CombatContext::new(
            CombatConfig::default(),
            &[MemberSpec::new("tank", Role::Tank).with_health(1_000.0)],
            9,
        );
        let debuff = TimedDebuff {
            id: "rot".into(),
            source: EnemyId(0),
            damage_per_tick: 10.0,
            damage_type: DamageType::Chaos,
            interval_ticks: 10,
            next_tick_at: Tick(10),
            expires_at: Tick(30),
            stacks: 1,
            max_stacks: 5,
        };
        ctx.party_debuffs.apply(MemberId(0), debuff.clone());
        ctx.party_debuffs.apply(MemberId(0), debuff);

        for t in 1..=40 {
            ctx.tick = Tick(t);
            process_debuffs(&mut ctx);
        }
        // Ticks at 10 and 20 for two stacks of 10 each.
        assert_eq!(ctx.team[0].health.current, 960.0);
        assert!(ctx.party_debuffs.is_empty());
    }
}
