//! Terminal run result built from the final combat context.

use std::collections::BTreeMap;

use crate::env::Reward;
use crate::numeric;
use crate::state::{ActorRef, CombatContext, MemberId, RunProgress, Role, TeamMemberState, Tick};

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RunOutcome {
    Victory,
    Wipe,
    Timeout,
}

impl RunOutcome {
    pub fn fail_reason(self) -> Option<FailReason> {
        match self {
            Self::Victory => None,
            Self::Wipe => Some(FailReason::Wipe),
            Self::Timeout => Some(FailReason::Timeout),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FailReason {
    Wipe,
    Timeout,
}

/// The hit that killed a member.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeathCause {
    /// Name of the member that died.
    pub member: String,
    pub killer: String,
    pub ability: String,
    pub amount: f64,
    pub tick: Option<Tick>,
}

impl DeathCause {
    const UNKNOWN: &'static str = "unknown";
    const ENVIRONMENT: &'static str = "environment";

    /// Describes a killing blow dealt by `source`.
    pub fn from_hit(
        member: &str,
        source: ActorRef,
        source_name: &str,
        ability: &str,
        amount: f64,
        tick: Tick,
    ) -> Self {
        let killer = match source {
            ActorRef::Environment => Self::ENVIRONMENT,
            _ => source_name,
        };
        Self {
            member: member.to_owned(),
            killer: killer.to_owned(),
            ability: ability.to_owned(),
            amount,
            tick: Some(tick),
        }
    }

    fn unknown(member: &str) -> Self {
        Self {
            member: member.to_owned(),
            killer: String::from(Self::UNKNOWN),
            ability: String::from(Self::UNKNOWN),
            amount: 0.0,
            tick: None,
        }
    }
}

/// Per-member stat rollup.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemberSummary {
    pub id: MemberId,
    pub name: String,
    pub role: Role,
    pub damage_dealt: f64,
    pub healing_done: f64,
    pub damage_taken: f64,
    pub healing_received: f64,
    /// Damage per second of combat time.
    pub dps: f64,
    /// Healing per second of combat time.
    pub hps: f64,
    pub hits_landed: u32,
    pub heals_cast: u32,
    pub deaths: u32,
    pub alive: bool,
    pub damage_by_ability: BTreeMap<String, f64>,
    pub healing_by_ability: BTreeMap<String, f64>,
    pub damage_taken_by_source: BTreeMap<String, f64>,
}

impl MemberSummary {
    fn from_member(member: &TeamMemberState, combat_secs: f64) -> Self {
        let counters = &member.counters;
        let per_second = |total: f64| {
            if combat_secs > 0.0 {
                numeric::finite_or(total / combat_secs, 0.0)
            } else {
                0.0
            }
        };
        Self {
            id: member.id,
            name: member.name.clone(),
            role: member.role,
            damage_dealt: counters.damage_dealt,
            healing_done: counters.healing_done,
            damage_taken: counters.damage_taken,
            healing_received: counters.healing_received,
            dps: per_second(counters.damage_dealt),
            hps: per_second(counters.healing_done),
            hits_landed: counters.hits_landed,
            heals_cast: counters.heals_cast,
            deaths: counters.deaths,
            alive: member.is_alive(),
            damage_by_ability: counters.damage_by_ability.clone(),
            healing_by_ability: counters.healing_by_ability.clone(),
            damage_taken_by_source: counters.damage_taken_by_source.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunResult {
    pub success: bool,
    pub fail_reason: Option<FailReason>,
    pub seed: u64,
    pub ticks: u64,
    pub elapsed_secs: f64,
    pub combat_secs: f64,
    pub time_limit_secs: f64,
    pub time_remaining_secs: f64,
    pub progress: RunProgress,
    /// Multiplier applied to completion rewards.
    pub reward_scale: f64,
    pub rewards: Reward,
    pub members: Vec<MemberSummary>,
    /// Keyed by member id; filled only for wipes.
    pub death_causes: BTreeMap<MemberId, DeathCause>,
}

impl RunResult {
    #[must_use]
    pub fn with_rewards(mut self, rewards: Reward) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn total_damage(&self) -> f64 {
        self.members.iter().map(|m| m.damage_dealt).sum()
    }

    pub fn total_healing(&self) -> f64 {
        self.members.iter().map(|m| m.healing_done).sum()
    }
}

/// Completion reward multiplier.
///
/// Success pays the share of the time limit left; failure pays half of the
/// progress fraction.
pub fn reward_scale(ctx: &CombatContext, outcome: RunOutcome) -> f64 {
    match outcome {
        RunOutcome::Victory => {
            if ctx.time_limit_ticks == 0 {
                return 1.0;
            }
            let remaining = ctx.time_limit_ticks.saturating_sub(ctx.tick.0) as f64;
            numeric::clamp_unit(remaining / ctx.time_limit_ticks as f64)
        }
        RunOutcome::Wipe | RunOutcome::Timeout => ctx.progress.fraction() * 0.5,
    }
}

/// Collects the cause of death for every dead member.
///
/// The blow captured at death wins. Members without one fall back to the
/// newest damage-log entry against them, then to an unknown cause.
pub fn death_causes(ctx: &CombatContext) -> BTreeMap<MemberId, DeathCause> {
    ctx.team
        .iter()
        .filter(|m| m.is_dead)
        .map(|member| {
            let cause = member.death_cause.clone().unwrap_or_else(|| {
                ctx.last_damage_to(member.id).map_or_else(
                    || DeathCause::unknown(&member.name),
                    |entry| {
                        DeathCause::from_hit(
                            &member.name,
                            entry.source,
                            &entry.source_name,
                            &entry.ability,
                            entry.amount,
                            entry.tick,
                        )
                    },
                )
            });
            (member.id, cause)
        })
        .collect()
}

/// Builds the result record. Pure; rewards are attached by the caller.
pub fn generate_result(ctx: &CombatContext, outcome: RunOutcome) -> RunResult {
    let combat_secs = Tick(ctx.combat_ticks).as_secs();
    let members = ctx
        .team
        .iter()
        .map(|member| MemberSummary::from_member(member, combat_secs))
        .collect();
    let death_causes = if outcome == RunOutcome::Wipe {
        death_causes(ctx)
    } else {
        BTreeMap::new()
    };

    RunResult {
        success: outcome == RunOutcome::Victory,
        fail_reason: outcome.fail_reason(),
        seed: ctx.seed,
        ticks: ctx.tick.0,
        elapsed_secs: ctx.elapsed_secs(),
        combat_secs,
        time_limit_secs: Tick(ctx.time_limit_ticks).as_secs(),
        time_remaining_secs: ctx.time_remaining_secs(),
        progress: ctx.progress,
        reward_scale: reward_scale(ctx, outcome),
        rewards: Reward::default(),
        members,
        death_causes,
    }
}
