//! Default party behavior for unattended runs.

use game_core::{EnemyId, MemberId, PlayerActionResolver, PlayerPhase, Role};

/// Every living member acts on its own swing timer.
///
/// Healers spend the swing on the most injured member below the heal
/// threshold when they can afford it, and attack otherwise. Everyone else
/// attacks the first enemy of the tick's snapshot that is still standing.
/// Bloodlust shortens swing timers through haste and raises attack damage.
#[derive(Debug, Clone, Copy)]
pub struct AutoAttackResolver {
    /// Members at or above this health fraction are not healed.
    heal_threshold: f64,
}

impl AutoAttackResolver {
    pub const DEFAULT_HEAL_THRESHOLD: f64 = 0.8;

    /// Resolver healing anyone under [`Self::DEFAULT_HEAL_THRESHOLD`].
    pub fn new() -> Self {
        Self {
            heal_threshold: Self::DEFAULT_HEAL_THRESHOLD,
        }
    }

    /// Overrides the heal threshold, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn with_heal_threshold(mut self, threshold: f64) -> Self {
        self.heal_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    fn heal_target(&self, phase: &PlayerPhase<'_>) -> Option<MemberId> {
        let floor = 1.0 - self.heal_threshold;
        phase
            .team()
            .iter()
            .filter(|m| m.is_alive() && m.missing_health_ratio() > floor)
            .max_by(|a, b| a.missing_health_ratio().total_cmp(&b.missing_health_ratio()))
            .map(|m| m.id)
    }

    fn attack_target(phase: &PlayerPhase<'_>) -> Option<EnemyId> {
        phase
            .targets()
            .iter()
            .copied()
            .find(|&id| phase.enemy(id).is_some_and(|e| e.is_alive()))
    }

    /// Tries to heal; returns whether the swing was used.
    fn try_heal(&self, phase: &mut PlayerPhase<'_>, healer: MemberId) -> bool {
        let Some(offense) = phase.member(healer).map(|m| m.offense) else {
            return false;
        };
        if offense.heal_power <= 0.0 {
            return false;
        }
        let Some(target) = self.heal_target(phase) else {
            return false;
        };
        if !phase.spend_mana(healer, offense.heal_mana_cost) {
            tracing::trace!(target: "combat::player", %healer, "out of mana, attacking instead");
            return false;
        }
        let outcome = phase.heal_member(healer, target, offense.heal_power, "heal");
        tracing::trace!(
            target: "combat::player",
            %healer,
            %target,
            amount = outcome.amount,
            critical = outcome.critical,
            "heal"
        );
        true
    }
}

impl Default for AutoAttackResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerActionResolver for AutoAttackResolver {
    fn resolve(&mut self, phase: &mut PlayerPhase<'_>) {
        let now = phase.tick();
        let ready: Vec<(MemberId, Role, u64)> = phase
            .team()
            .iter()
            .filter(|m| m.is_alive() && m.next_action_tick <= now)
            .map(|m| (m.id, m.role, m.offense.attack_interval_ticks))
            .collect();

        for (id, role, interval) in ready {
            let acted = if role == Role::Healer && self.try_heal(phase, id) {
                true
            } else if let Some(target) = Self::attack_target(phase) {
                phase.auto_attack(id, target).is_some()
            } else {
                false
            };
            if acted {
                let next = now + phase.hasted_interval(interval);
                if let Some(member) = phase.member_mut(id) {
                    member.next_action_tick = next;
                }
            }
        }
    }
}
