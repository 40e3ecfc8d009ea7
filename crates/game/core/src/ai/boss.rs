//! Boss kit ability selection.
//!
//! Which ready ability a boss uses is decided by an [`AbilityPriority`]
//! policy. Candidates are filtered first (cooldown, once-per-fight, health
//! gate), then ordered by the policy; the first one wins.

use std::cmp::Ordering;

use crate::config::PriorityPolicyKind;
use crate::env::BossAbility;
use crate::state::{BossAbilityState, Tick};

/// A ready kit ability plus the bookkeeping policies order by.
#[derive(Clone, Copy, Debug)]
pub struct AbilityCandidate<'a> {
    pub ability: &'a BossAbility,
    /// Health-gated ability not used since its gate opened.
    pub fresh_gate: bool,
    pub last_used: Option<Tick>,
}

/// Orders ready boss abilities. `Ordering::Less` means `a` is used before `b`.
pub trait AbilityPriority: Send + Sync {
    fn compare(&self, a: &AbilityCandidate<'_>, b: &AbilityCandidate<'_>) -> Ordering;

    fn name(&self) -> &'static str;
}

/// Fresh phase gates, then signature abilities, then declared priority,
/// then whichever ability has waited longest, then id.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignaturePriority;

impl AbilityPriority for SignaturePriority {
    fn compare(&self, a: &AbilityCandidate<'_>, b: &AbilityCandidate<'_>) -> Ordering {
        b.fresh_gate
            .cmp(&a.fresh_gate)
            .then_with(|| b.ability.signature.cmp(&a.ability.signature))
            .then_with(|| b.ability.priority.cmp(&a.ability.priority))
            .then_with(|| longest_waiting(a.last_used, b.last_used))
            .then_with(|| a.ability.id.cmp(&b.ability.id))
    }

    fn name(&self) -> &'static str {
        "signature"
    }
}

/// Declared priority (highest first), then id.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeclaredOrder;

impl AbilityPriority for DeclaredOrder {
    fn compare(&self, a: &AbilityCandidate<'_>, b: &AbilityCandidate<'_>) -> Ordering {
        b.ability
            .priority
            .cmp(&a.ability.priority)
            .then_with(|| a.ability.id.cmp(&b.ability.id))
    }

    fn name(&self) -> &'static str {
        "declared"
    }
}

/// Never-used abilities first, then the oldest use.
fn longest_waiting(a: Option<Tick>, b: Option<Tick>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.cmp(&y),
    }
}

pub fn priority_policy(kind: PriorityPolicyKind) -> Box<dyn AbilityPriority> {
    match kind {
        PriorityPolicyKind::Signature => Box::new(SignaturePriority),
        PriorityPolicyKind::Declared => Box::new(DeclaredOrder),
    }
}

/// Records the tick each health gate was first seen open.
pub fn refresh_gates(state: &mut BossAbilityState, health_ratio: f64, now: Tick) {
    let Some(kit) = state.kit.clone() else {
        return;
    };
    for ability in kit.abilities.iter().filter(|a| a.health_gate.is_some()) {
        if ability.gate_open(health_ratio) && !state.gate_opened.contains_key(&ability.id) {
            tracing::debug!(
                target: "combat::ai",
                ability = %ability.id,
                health_ratio,
                "boss phase gate opened"
            );
            state.gate_opened.insert(ability.id.clone(), now);
        }
    }
}

/// Picks the kit ability to use at `now`, if any is ready.
pub fn select_ability(
    state: &BossAbilityState,
    health_ratio: f64,
    now: Tick,
    policy: &dyn AbilityPriority,
) -> Option<String> {
    let kit = state.kit.as_ref()?;
    kit.abilities
        .iter()
        .filter(|a| !state.used_once.contains(&a.id))
        .filter(|a| state.is_ready(&a.id, now))
        .filter(|a| a.gate_open(health_ratio))
        .map(|ability| {
            let last_used = state.last_used.get(&ability.id).copied();
            let fresh_gate = state
                .gate_opened
                .get(&ability.id)
                .is_some_and(|opened| last_used.is_none_or(|used| used < *opened));
            AbilityCandidate {
                ability,
                fresh_gate,
                last_used,
            }
        })
        .min_by(|a, b| policy.compare(a, b))
        .map(|c| c.ability.id.clone())
}
