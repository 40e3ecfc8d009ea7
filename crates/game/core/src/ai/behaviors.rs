//! Behavior trees for each enemy behavior kind.
//!
//! Trees are evaluated against an owned [`DecisionContext`] (the blackboard)
//! built from the combat context for one enemy. Leaf action nodes only record
//! an [`EnemyIntent`]; the AI phase executes it afterwards, so tree evaluation
//! never mutates simulation state.

use behavior_tree::{Behavior, Status, condition, inverter, selector, sequence};

use super::targeting::{TargetRolls, pick_avoiding, weighted_tank_pick};
use crate::config::CombatConfig;
use crate::state::{BehaviorCooldowns, CastAbility, EnemyBehavior, EnemyId, MemberId, Tick};

/// What an enemy decided to do this tick.
#[derive(Clone, Debug, PartialEq)]
pub enum EnemyIntent {
    Attack { target: MemberId },
    Cleave,
    PartyHit,
    LegacyPulse,
    StartCast {
        ability: CastAbility,
        target: Option<MemberId>,
        ticks: u64,
    },
    BossAbility { id: String },
}

/// Blackboard for one enemy decision.
#[derive(Clone, Debug)]
pub struct DecisionContext {
    pub enemy: EnemyId,
    pub now: Tick,
    pub cooldowns: BehaviorCooldowns,
    pub has_cleave: bool,
    pub cast_ticks: u64,
    pub tank: Option<MemberId>,
    pub living: Vec<MemberId>,
    /// Living members a new cast may target this tick.
    pub cast_candidates: Vec<MemberId>,
    /// Living members no cast is aimed at.
    pub unreserved: Vec<MemberId>,
    pub last_target: Option<MemberId>,
    pub rolls: TargetRolls,
    pub has_kit: bool,
    pub ready_boss_ability: Option<String>,
    pub legacy_pulse_ready: bool,
    pub legacy_buster_ready: bool,
    intent: Option<EnemyIntent>,
}

impl DecisionContext {
    pub fn new(
        enemy: EnemyId,
        now: Tick,
        cooldowns: BehaviorCooldowns,
        rolls: TargetRolls,
    ) -> Self {
        Self {
            enemy,
            now,
            cooldowns,
            has_cleave: false,
            cast_ticks: 0,
            tank: None,
            living: Vec::new(),
            cast_candidates: Vec::new(),
            unreserved: Vec::new(),
            last_target: None,
            rolls,
            has_kit: false,
            ready_boss_ability: None,
            legacy_pulse_ready: false,
            legacy_buster_ready: false,
            intent: None,
        }
    }

    fn set_intent(&mut self, intent: EnemyIntent) -> Status {
        if let Some(existing) = &self.intent {
            tracing::warn!(
                target: "combat::ai",
                enemy = %self.enemy,
                ?existing,
                ?intent,
                "second intent in one evaluation ignored"
            );
            return Status::Success;
        }
        self.intent = Some(intent);
        Status::Success
    }

    pub fn take_intent(self) -> Option<EnemyIntent> {
        self.intent
    }

    fn tank_or_random(&self) -> Option<MemberId> {
        self.tank.or_else(|| pick_avoiding(&self.living, None, self.rolls.pick))
    }
}

type Tree = Box<dyn Behavior<DecisionContext>>;

fn node<B: Behavior<DecisionContext> + 'static>(behavior: B) -> Tree {
    Box::new(behavior)
}

fn global_ready() -> Tree {
    condition(|ctx: &DecisionContext| ctx.cooldowns.global_ready(ctx.now))
}

fn attack_ready() -> Tree {
    condition(|ctx: &DecisionContext| ctx.cooldowns.attack_ready(ctx.now))
}

fn ability_ready() -> Tree {
    condition(|ctx: &DecisionContext| ctx.cooldowns.ability_ready(ctx.now))
}

fn cleave_ready() -> Tree {
    condition(|ctx: &DecisionContext| ctx.has_cleave && ctx.cooldowns.cleave_ready(ctx.now))
}

fn has_kit() -> Tree {
    condition(|ctx: &DecisionContext| ctx.has_kit)
}

fn legacy_pulse_ready() -> Tree {
    condition(|ctx: &DecisionContext| ctx.legacy_pulse_ready)
}

fn legacy_buster_ready() -> Tree {
    condition(|ctx: &DecisionContext| ctx.legacy_buster_ready)
}

/// Tank is alive and may be the target of a new cast this tick.
fn tank_available() -> Tree {
    condition(|ctx: &DecisionContext| ctx.tank.is_some_and(|t| ctx.cast_candidates.contains(&t)))
}

/// Swings at the tank, or a random living member without one.
pub struct AttackTank;

impl Behavior<DecisionContext> for AttackTank {
    fn tick(&self, ctx: &mut DecisionContext) -> Status {
        match ctx.tank_or_random() {
            Some(target) => ctx.set_intent(EnemyIntent::Attack { target }),
            None => Status::Failure,
        }
    }
}

/// Ranged shot: weighted toward the tank, never the same target twice in a row
/// unless it is the only one left.
pub struct ArcherShot;

impl Behavior<DecisionContext> for ArcherShot {
    fn tick(&self, ctx: &mut DecisionContext) -> Status {
        let fresh: Vec<MemberId> = ctx
            .living
            .iter()
            .copied()
            .filter(|m| Some(*m) != ctx.last_target)
            .collect();
        let pool = if fresh.is_empty() { &ctx.living } else { &fresh };
        match weighted_tank_pick(
            pool,
            ctx.tank,
            CombatConfig::ARCHER_TANK_WEIGHT,
            ctx.rolls.weight,
            ctx.rolls.pick,
        ) {
            Some(target) => ctx.set_intent(EnemyIntent::Attack { target }),
            None => Status::Failure,
        }
    }
}

/// Melee swing at a living, unreserved member other than the tank.
/// Falls back to the tank when nobody else qualifies.
pub struct MeleeOther;

impl Behavior<DecisionContext> for MeleeOther {
    fn tick(&self, ctx: &mut DecisionContext) -> Status {
        let others: Vec<MemberId> = ctx
            .unreserved
            .iter()
            .copied()
            .filter(|m| Some(*m) != ctx.tank)
            .collect();
        let target = pick_avoiding(&others, None, ctx.rolls.pick).or(ctx.tank);
        match target {
            Some(target) => ctx.set_intent(EnemyIntent::Attack { target }),
            None => Status::Failure,
        }
    }
}

pub struct Cleave;

impl Behavior<DecisionContext> for Cleave {
    fn tick(&self, ctx: &mut DecisionContext) -> Status {
        if ctx.living.is_empty() {
            return Status::Failure;
        }
        ctx.set_intent(EnemyIntent::Cleave)
    }
}

pub struct PartyHit;

impl Behavior<DecisionContext> for PartyHit {
    fn tick(&self, ctx: &mut DecisionContext) -> Status {
        if ctx.living.is_empty() {
            return Status::Failure;
        }
        ctx.set_intent(EnemyIntent::PartyHit)
    }
}

pub struct LegacyPulse;

impl Behavior<DecisionContext> for LegacyPulse {
    fn tick(&self, ctx: &mut DecisionContext) -> Status {
        if ctx.living.is_empty() {
            return Status::Failure;
        }
        ctx.set_intent(EnemyIntent::LegacyPulse)
    }
}

/// Starts a cast on a cast candidate, weighted toward the tank.
pub struct CastWeighted {
    pub ability: CastAbility,
    pub tank_weight: f64,
}

impl Behavior<DecisionContext> for CastWeighted {
    fn tick(&self, ctx: &mut DecisionContext) -> Status {
        let target = weighted_tank_pick(
            &ctx.cast_candidates,
            ctx.tank,
            self.tank_weight,
            ctx.rolls.weight,
            ctx.rolls.pick,
        );
        match target {
            Some(target) => {
                let ticks = ctx.cast_ticks;
                ctx.set_intent(EnemyIntent::StartCast {
                    ability: self.ability.clone(),
                    target: Some(target),
                    ticks,
                })
            }
            None => Status::Failure,
        }
    }
}

/// Starts a cast on the tank. `ticks` overrides the enemy's own cast time.
pub struct CastOnTank {
    pub ability: CastAbility,
    pub ticks: Option<u64>,
}

impl Behavior<DecisionContext> for CastOnTank {
    fn tick(&self, ctx: &mut DecisionContext) -> Status {
        let Some(tank) = ctx.tank else {
            return Status::Failure;
        };
        let ticks = self.ticks.unwrap_or(ctx.cast_ticks);
        ctx.set_intent(EnemyIntent::StartCast {
            ability: self.ability.clone(),
            target: Some(tank),
            ticks,
        })
    }
}

/// Uses the kit ability the priority policy selected, if any.
pub struct UseBossAbility;

impl Behavior<DecisionContext> for UseBossAbility {
    fn tick(&self, ctx: &mut DecisionContext) -> Status {
        match ctx.ready_boss_ability.clone() {
            Some(id) => ctx.set_intent(EnemyIntent::BossAbility { id }),
            None => Status::Failure,
        }
    }
}

pub fn melee_tree() -> Tree {
    sequence(vec![
        global_ready(),
        selector(vec![
            sequence(vec![cleave_ready(), node(Cleave)]),
            sequence(vec![attack_ready(), node(AttackTank)]),
        ]),
    ])
}

pub fn archer_tree() -> Tree {
    sequence(vec![global_ready(), attack_ready(), node(ArcherShot)])
}

pub fn caster_tree() -> Tree {
    sequence(vec![
        global_ready(),
        ability_ready(),
        node(CastWeighted {
            ability: CastAbility::Bolt,
            tank_weight: CombatConfig::CASTER_TANK_WEIGHT,
        }),
    ])
}

pub fn aoe_tree() -> Tree {
    sequence(vec![
        global_ready(),
        selector(vec![
            sequence(vec![ability_ready(), node(PartyHit)]),
            sequence(vec![attack_ready(), node(AttackTank)]),
        ]),
    ])
}

pub fn tankbuster_tree() -> Tree {
    sequence(vec![
        global_ready(),
        selector(vec![
            sequence(vec![
                ability_ready(),
                tank_available(),
                node(CastOnTank {
                    ability: CastAbility::TankBuster,
                    ticks: None,
                }),
            ]),
            sequence(vec![attack_ready(), node(MeleeOther)]),
        ]),
    ])
}

pub fn boss_tree() -> Tree {
    sequence(vec![
        global_ready(),
        selector(vec![
            sequence(vec![
                has_kit(),
                selector(vec![
                    node(UseBossAbility),
                    sequence(vec![attack_ready(), node(AttackTank)]),
                ]),
            ]),
            sequence(vec![
                inverter(has_kit()),
                selector(vec![
                    sequence(vec![legacy_pulse_ready(), node(LegacyPulse)]),
                    sequence(vec![
                        legacy_buster_ready(),
                        tank_available(),
                        node(CastOnTank {
                            ability: CastAbility::LegacyTankBuster,
                            ticks: Some(CombatConfig::LEGACY_BUSTER_CAST_TICKS),
                        }),
                    ]),
                    sequence(vec![attack_ready(), node(AttackTank)]),
                ]),
            ]),
        ]),
    ])
}

/// One compiled tree per behavior kind.
pub struct BehaviorBook {
    melee: Tree,
    archer: Tree,
    caster: Tree,
    aoe: Tree,
    tankbuster: Tree,
    boss: Tree,
}

impl BehaviorBook {
    pub fn new() -> Self {
        Self {
            melee: melee_tree(),
            archer: archer_tree(),
            caster: caster_tree(),
            aoe: aoe_tree(),
            tankbuster: tankbuster_tree(),
            boss: boss_tree(),
        }
    }

    pub fn tree(&self, behavior: EnemyBehavior) -> &dyn Behavior<DecisionContext> {
        match behavior {
            EnemyBehavior::Melee => self.melee.as_ref(),
            EnemyBehavior::Archer => self.archer.as_ref(),
            EnemyBehavior::Caster => self.caster.as_ref(),
            EnemyBehavior::Aoe => self.aoe.as_ref(),
            EnemyBehavior::Tankbuster => self.tankbuster.as_ref(),
            EnemyBehavior::Boss => self.boss.as_ref(),
        }
    }

    /// Evaluates the tree for `behavior` and returns the chosen intent.
    pub fn decide(&self, behavior: EnemyBehavior, mut ctx: DecisionContext) -> Option<EnemyIntent> {
        self.tree(behavior).tick(&mut ctx);
        ctx.take_intent()
    }
}

impl Default for BehaviorBook {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BehaviorBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorBook").finish_non_exhaustive()
    }
}
