//! Timed effects that live outside the main cast cycle.
//!
//! Every effect carries tick-stamped expiry; expiry is evaluated with
//! `now >= expires_at` everywhere.

use std::collections::BTreeMap;

use arrayvec::ArrayVec;

use super::common::{EnemyId, MemberId, Tick, TimedValue};
use crate::combat::DamageType;

/// Debuffs tracked per party member.
pub const MAX_DEBUFFS_PER_MEMBER: usize = 8;

/// Damage-over-time debuff placed on a party member by an enemy ability.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimedDebuff {
    pub id: String,
    pub source: EnemyId,
    pub damage_per_tick: f64,
    pub damage_type: DamageType,
    pub interval_ticks: u64,
    pub next_tick_at: Tick,
    pub expires_at: Tick,
    pub stacks: u8,
    pub max_stacks: u8,
}

/// Active debuffs keyed by the afflicted member.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartyDebuffState {
    pub active: BTreeMap<MemberId, ArrayVec<TimedDebuff, MAX_DEBUFFS_PER_MEMBER>>,
}

impl PartyDebuffState {
    /// Applies a debuff, stacking and refreshing an existing one from the same source.
    ///
    /// When the member already carries the maximum number of distinct debuffs
    /// the one closest to expiring is replaced.
    pub fn apply(&mut self, member: MemberId, debuff: TimedDebuff) {
        let slot = self.active.entry(member).or_default();
        if let Some(existing) = slot
            .iter_mut()
            .find(|d| d.id == debuff.id && d.source == debuff.source)
        {
            existing.stacks = existing.stacks.saturating_add(1).min(existing.max_stacks.max(1));
            existing.expires_at = debuff.expires_at;
            existing.damage_per_tick = debuff.damage_per_tick;
            return;
        }
        if slot.is_full()
            && let Some((oldest, _)) = slot
                .iter()
                .enumerate()
                .min_by_key(|(_, d)| d.expires_at)
        {
            slot.remove(oldest);
        }
        slot.push(debuff);
    }

    pub fn clear_member(&mut self, member: MemberId) {
        self.active.remove(&member);
    }

    pub fn stacks_on(&self, member: MemberId, id: &str) -> u8 {
        self.active
            .get(&member)
            .and_then(|slot| slot.iter().find(|d| d.id == id))
            .map_or(0, |d| d.stacks)
    }

    pub fn is_empty(&self) -> bool {
        self.active.values().all(|slot| slot.is_empty())
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}

/// Heal-over-time effect on one party member.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealOverTime {
    pub id: String,
    pub healer: MemberId,
    pub target: MemberId,
    pub amount_per_tick: f64,
    pub interval_ticks: u64,
    pub next_tick_at: Tick,
    pub expires_at: Tick,
    pub crit_chance: f64,
    pub crit_multiplier: f64,
}

/// Bloodlust window.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bloodlust {
    pub damage_pct: f64,
    pub haste_pct: f64,
    pub ends_at: Tick,
}

/// Party-wide buffs.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartyBuffState {
    pub bloodlust: Option<Bloodlust>,
    /// Bloodlust cannot be reapplied before this tick.
    pub sated_until: Option<Tick>,
    pub heals_over_time: Vec<HealOverTime>,
}

impl PartyBuffState {
    pub fn is_sated(&self, now: Tick) -> bool {
        self.sated_until.is_some_and(|until| now < until)
    }

    pub fn damage_multiplier(&self) -> f64 {
        self.bloodlust
            .map_or(1.0, |b| 1.0 + b.damage_pct / 100.0)
    }

    pub fn haste_pct(&self) -> f64 {
        self.bloodlust.map_or(0.0, |b| b.haste_pct)
    }

    pub fn expire(&mut self, now: Tick) {
        if self.bloodlust.is_some_and(|b| now >= b.ends_at) {
            self.bloodlust = None;
            tracing::debug!(target: "combat::buffs", tick = now.0, "bloodlust faded");
        }
        if self.sated_until.is_some_and(|until| now >= until) {
            self.sated_until = None;
        }
        self.heals_over_time.retain(|hot| now < hot.expires_at);
    }
}

/// Timed self-buffs on one enemy.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyBuffs {
    /// Increased damage, percent.
    pub damage: Option<TimedValue>,
    /// Damage reduction, percent.
    pub damage_reduction: Option<TimedValue>,
}

/// Boss/enemy buffs keyed by enemy.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BossBuffState {
    pub active: BTreeMap<EnemyId, EnemyBuffs>,
}

impl BossBuffState {
    pub fn get(&self, enemy: EnemyId) -> EnemyBuffs {
        self.active.get(&enemy).copied().unwrap_or_default()
    }

    pub fn entry(&mut self, enemy: EnemyId) -> &mut EnemyBuffs {
        self.active.entry(enemy).or_default()
    }

    pub fn damage_multiplier(&self, enemy: EnemyId) -> f64 {
        self.get(enemy)
            .damage
            .map_or(1.0, |buff| 1.0 + buff.value / 100.0)
    }

    pub fn damage_reduction(&self, enemy: EnemyId) -> f64 {
        self.get(enemy).damage_reduction.map_or(0.0, |buff| buff.value)
    }

    pub fn expire(&mut self, now: Tick) {
        for buffs in self.active.values_mut() {
            if buffs.damage.is_some_and(|b| b.is_expired(now)) {
                buffs.damage = None;
            }
            if buffs.damage_reduction.is_some_and(|b| b.is_expired(now)) {
                buffs.damage_reduction = None;
            }
        }
        self.active
            .retain(|_, b| b.damage.is_some() || b.damage_reduction.is_some());
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bleed(expires_at: u64) -> TimedDebuff {
        TimedDebuff {
            id: "bleed".into(),
            source: EnemyId(0),
            damage_per_tick: 5.0,
            damage_type: DamageType::Physical,
            interval_ticks: 10,
            next_tick_at: Tick(10),
            expires_at: Tick(expires_at),
            stacks: 1,
            max_stacks: 3,
        }
    }

    #[test]
    fn reapplying_debuff_stacks_and_refreshes() {
        let mut debuffs = PartyDebuffState::default();
        for expiry in [50, 60, 70, 80] {
            debuffs.apply(MemberId(0), bleed(expiry));
        }
        assert_eq!(debuffs.stacks_on(MemberId(0), "bleed"), 3);
        let slot = &debuffs.active[&MemberId(0)];
        assert_eq!(slot.len(), 1);
        assert_eq!(slot[0].expires_at, Tick(80));
    }

    #[test]
    fn bloodlust_expires_but_sated_persists() {
        let mut buffs = PartyBuffState {
            bloodlust: Some(Bloodlust {
                damage_pct: 30.0,
                haste_pct: 30.0,
                ends_at: Tick(400),
            }),
            sated_until: Some(Tick(6_000)),
            heals_over_time: Vec::new(),
        };
        assert!((buffs.damage_multiplier() - 1.3).abs() < 1e-9);
        buffs.expire(Tick(400));
        assert!(buffs.bloodlust.is_none());
        assert!(buffs.is_sated(Tick(400)));
        assert!(!buffs.is_sated(Tick(6_000)));
    }
}
