//! Enemy target selection and cast-target reservations.

use std::collections::BTreeSet;

use crate::rng::CombatRng;
use crate::state::{AnimatedEnemy, MemberId, Role, TeamMemberState};

/// Members that are already the target of a cast.
///
/// Built from every casting enemy before any new cast starts in a tick. New
/// casts avoid reserved members; once everyone is reserved a cast may fall
/// back to any living member that no cast *started this tick* already picked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reservations {
    reserved: BTreeSet<MemberId>,
    started_this_tick: BTreeSet<MemberId>,
}

impl Reservations {
    pub fn from_enemies(enemies: &[AnimatedEnemy]) -> Self {
        let reserved = enemies
            .iter()
            .filter(|e| e.is_alive())
            .filter_map(|e| e.cast.target())
            .collect();
        Self {
            reserved,
            started_this_tick: BTreeSet::new(),
        }
    }

    pub fn is_reserved(&self, member: MemberId) -> bool {
        self.reserved.contains(&member)
    }

    pub fn started_this_tick(&self, member: MemberId) -> bool {
        self.started_this_tick.contains(&member)
    }

    pub fn reserve(&mut self, member: MemberId) {
        self.reserved.insert(member);
        self.started_this_tick.insert(member);
    }

    /// Living members a new cast may pick, preferring unreserved ones.
    pub fn cast_candidates(&self, living: &[MemberId]) -> Vec<MemberId> {
        let free: Vec<MemberId> = living
            .iter()
            .copied()
            .filter(|m| !self.is_reserved(*m))
            .collect();
        if !free.is_empty() {
            return free;
        }
        living
            .iter()
            .copied()
            .filter(|m| !self.started_this_tick(*m))
            .collect()
    }
}

/// First living tank, if any.
pub fn living_tank(team: &[TeamMemberState]) -> Option<MemberId> {
    team.iter()
        .find(|m| m.is_alive() && m.role == Role::Tank)
        .map(|m| m.id)
}

/// Picks the tank with probability `tank_weight`, otherwise a random non-tank
/// from `candidates`. Falls back to whatever is available.
pub fn weighted_tank_pick(
    candidates: &[MemberId],
    tank: Option<MemberId>,
    tank_weight: f64,
    roll: f64,
    pick_roll: u32,
) -> Option<MemberId> {
    let tank = tank.filter(|t| candidates.contains(t));
    let others: Vec<MemberId> = candidates
        .iter()
        .copied()
        .filter(|m| Some(*m) != tank)
        .collect();
    match tank {
        Some(t) if roll < tank_weight || others.is_empty() => Some(t),
        _ if others.is_empty() => None,
        _ => others.get(pick_roll as usize % others.len()).copied(),
    }
}

/// Picks a random candidate, avoiding `previous` unless it is the only choice.
pub fn pick_avoiding(
    candidates: &[MemberId],
    previous: Option<MemberId>,
    pick_roll: u32,
) -> Option<MemberId> {
    let fresh: Vec<MemberId> = candidates
        .iter()
        .copied()
        .filter(|m| Some(*m) != previous)
        .collect();
    let pool = if fresh.is_empty() { candidates } else { &fresh };
    if pool.is_empty() {
        return None;
    }
    pool.get(pick_roll as usize % pool.len()).copied()
}

/// Pre-drawn randomness for one enemy decision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetRolls {
    pub weight: f64,
    pub pick: u32,
}

impl TargetRolls {
    pub fn draw(rng: &mut CombatRng) -> Self {
        Self {
            weight: rng.unit(),
            pick: rng.next_u32(),
        }
    }
}
