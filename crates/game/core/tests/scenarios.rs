//! End-to-end combat scenarios driven through the tick engine.

use game_core::state::DefensiveStats;
use game_core::{
    ActorRef, AnimatedEnemy, CombatConfig, CombatContext, CombatEngine, CombatEvent, CommandMailbox,
    DamageType, EnemyAi, EnemyBehavior, EnemyId, EnemyTemplate, EncounterInfo, FailReason, HitKind,
    IdleResolver, IncomingHit, MemberId, MemberSpec, Role, RunOutcome, ScalingParams, Tick,
    TickOutcome, generate_result,
};

fn spawn(templates: &[EnemyTemplate]) -> Vec<AnimatedEnemy> {
    let scaling = ScalingParams::default();
    templates
        .iter()
        .enumerate()
        .map(|(i, t)| AnimatedEnemy::from_template(EnemyId(i as u16), t, &scaling, Tick::ZERO))
        .collect()
}

/// Runs up to `ticks` engine steps and returns the last outcome.
fn run(ctx: &mut CombatContext, ticks: u64) -> TickOutcome {
    let ai = EnemyAi::default();
    let mut mailbox = CommandMailbox::default();
    let mut engine = CombatEngine::new(ctx, &ai);
    let mut outcome = TickOutcome::Continue;
    for _ in 0..ticks {
        outcome = engine.step(&mut mailbox, &mut IdleResolver);
        if outcome.is_terminal() {
            break;
        }
    }
    outcome
}

#[test]
fn scenario_a_unmitigated_melee_hits_for_exact_damage() {
    let mut ctx = CombatContext::new(
        CombatConfig::default(),
        &[MemberSpec::new("tank", Role::Tank).with_health(1_000.0)],
        1,
    );
    let template = EnemyTemplate::new("brute", EnemyBehavior::Melee)
        .with_damage(30.0)
        .with_health(10_000.0);
    ctx.begin_pull(spawn(&[template]), EncounterInfo::default());

    assert_eq!(run(&mut ctx, 100), TickOutcome::Continue);

    let hits: Vec<_> = ctx.damage_log.iter().collect();
    // Ready at once, then every 20 ticks: 1, 21, 41, 61, 81.
    assert_eq!(hits.len(), 5);
    assert!(hits.iter().all(|entry| entry.amount == 30.0));
    assert_eq!(ctx.team[0].health.current, 850.0);
}

#[test]
fn scenario_b_full_block_reduces_but_never_negates() {
    let defense = DefensiveStats {
        block_chance: 100.0,
        ..DefensiveStats::default()
    };
    let mut ctx = CombatContext::new(
        CombatConfig::default(),
        &[MemberSpec::new("tank", Role::Tank).with_health(1_000.0).with_defense(defense)],
        2,
    );
    let brute = EnemyTemplate::new("brute", EnemyBehavior::Melee);
    ctx.begin_pull(spawn(&[brute]), EncounterInfo::default());

    for _ in 0..20 {
        let source = ActorRef::Enemy(EnemyId(0));
        let hit = IncomingHit::new(40.0, DamageType::Physical, HitKind::Attack, source);
        let outcome = ctx.strike_member(MemberId(0), hit).expect("tank is alive");
        assert!(outcome.blocked);
        assert_eq!(outcome.total, 20.0);
    }
    assert_eq!(ctx.team[0].health.current, 600.0);
}

#[test]
fn scenario_c_energy_shield_recharges_after_delay() {
    let mut ctx = CombatContext::new(
        CombatConfig::default(),
        &[MemberSpec::new("mage", Role::Damage)
            .with_health(1_000.0)
            .with_energy_shield(500.0)],
        3,
    );
    let hit_tick = Tick(5);
    ctx.tick = hit_tick;
    let hit = IncomingHit::new(100.0, DamageType::Physical, HitKind::Attack, ActorRef::Environment);
    ctx.strike_member(MemberId(0), hit).expect("mage is alive");
    assert_eq!(ctx.team[0].energy_shield.current, 400.0);

    for _ in 1..=19 {
        ctx.tick = ctx.tick + 1;
        game_core::regen::process_regen(&mut ctx);
        assert_eq!(ctx.team[0].energy_shield.current, 400.0, "tick {}", ctx.tick.0);
    }

    ctx.tick = ctx.tick + 1;
    game_core::regen::process_regen(&mut ctx);
    let per_tick = 500.0 * 0.33 * 0.1;
    assert!((ctx.team[0].energy_shield.current - (400.0 + per_tick)).abs() < 1e-9);

    for _ in 0..10 {
        ctx.tick = ctx.tick + 1;
        game_core::regen::process_regen(&mut ctx);
    }
    assert_eq!(ctx.team[0].energy_shield.current, 500.0);
}

#[test]
fn scenario_d_wipe_reports_death_causes() {
    let mut ctx = CombatContext::new(
        CombatConfig::default(),
        &[
            MemberSpec::new("tank", Role::Tank).with_health(100.0),
            MemberSpec::new("priest", Role::Healer).with_health(80.0),
        ],
        4,
    );
    let template = EnemyTemplate::new("ogre", EnemyBehavior::Melee)
        .with_damage(60.0)
        .with_health(10_000.0)
        .with_attack_interval(1);
    let mut ogres = spawn(&[template.clone(), template]);
    ogres[1].name = String::from("ogre lord");
    ctx.begin_pull(ogres, EncounterInfo::default());

    assert_eq!(run(&mut ctx, 500), TickOutcome::Wipe);
    assert!(ctx.all_members_dead());

    let result = generate_result(&ctx, RunOutcome::Wipe);
    assert!(!result.success);
    assert_eq!(result.fail_reason, Some(FailReason::Wipe));
    assert_eq!(result.death_causes.len(), 2);
    for cause in result.death_causes.values() {
        assert!(cause.killer.starts_with("ogre"));
        assert_eq!(cause.ability, "attack");
    }
    assert_eq!(result.death_causes[&MemberId(0)].member, "tank");
    assert_eq!(result.death_causes[&MemberId(1)].member, "priest");
}

#[test]
fn wipe_reports_every_member_sharing_a_name() {
    let mut ctx = CombatContext::new(
        CombatConfig::default(),
        &[
            MemberSpec::new("rogue", Role::Damage).with_health(100.0),
            MemberSpec::new("rogue", Role::Damage).with_health(100.0),
            MemberSpec::new("rogue", Role::Damage).with_health(100.0),
        ],
        9,
    );
    let template = EnemyTemplate::new("ogre", EnemyBehavior::Melee)
        .with_damage(60.0)
        .with_health(10_000.0)
        .with_attack_interval(1);
    ctx.begin_pull(spawn(&[template.clone(), template]), EncounterInfo::default());

    assert_eq!(run(&mut ctx, 500), TickOutcome::Wipe);

    let result = generate_result(&ctx, RunOutcome::Wipe);
    assert_eq!(result.death_causes.len(), 3);
    for (id, cause) in &result.death_causes {
        assert_eq!(cause.member, "rogue");
        assert_eq!(cause.killer, "ogre");
        assert!(cause.tick.is_some(), "{id} has no death tick");
    }
}

#[test]
fn early_death_survives_damage_log_eviction() {
    let mut ctx = CombatContext::new(
        CombatConfig::default(),
        &[
            MemberSpec::new("tank", Role::Tank).with_health(50.0),
            MemberSpec::new("priest", Role::Healer).with_health(1_000_000.0),
        ],
        6,
    );
    let ogre = EnemyTemplate::new("ogre", EnemyBehavior::Melee).with_health(10_000.0);
    ctx.begin_pull(spawn(&[ogre]), EncounterInfo::default());

    let ogre_id = ActorRef::Enemy(EnemyId(0));
    let crush = IncomingHit::new(500.0, DamageType::Physical, HitKind::Attack, ogre_id)
        .with_ability("crush");
    ctx.strike_member(MemberId(0), crush);
    assert!(ctx.team[0].is_dead);

    let scratch =
        IncomingHit::new(1.0, DamageType::Physical, HitKind::Attack, ActorRef::Environment)
            .with_ability("scratch");
    for _ in 0..CombatConfig::DEFAULT_DAMAGE_LOG_CAPACITY + 10 {
        ctx.tick = ctx.tick + 1;
        ctx.strike_member(MemberId(1), scratch.clone());
    }
    assert!(ctx.last_damage_to(MemberId(0)).is_none());

    let collapse =
        IncomingHit::new(2_000_000.0, DamageType::Physical, HitKind::Attack, ActorRef::Environment)
            .with_ability("collapse");
    ctx.strike_member(MemberId(1), collapse);
    assert!(ctx.all_members_dead());
    let result = generate_result(&ctx, RunOutcome::Wipe);

    let tank = &result.death_causes[&MemberId(0)];
    assert_eq!(tank.killer, "ogre");
    assert_eq!(tank.ability, "crush");
    assert_eq!(tank.amount, 500.0);
    assert_eq!(tank.tick, Some(Tick::ZERO));
    assert_eq!(result.death_causes[&MemberId(1)].ability, "collapse");
}

#[test]
fn scenario_e_legacy_tank_buster_only_hits_the_tank() {
    let party: Vec<_> = [("tank", Role::Tank), ("priest", Role::Healer), ("rogue", Role::Damage)]
        .into_iter()
        .map(|(name, role)| MemberSpec::new(name, role).with_health(100_000.0))
        .collect();
    let mut ctx = CombatContext::new(CombatConfig::default(), &party, 5);
    let boss = AnimatedEnemy::from_template(
        EnemyId(0),
        &EnemyTemplate::new("warlord", EnemyBehavior::Boss)
            .with_damage(100.0)
            .with_health(1_000_000.0),
        &ScalingParams::default(),
        Tick::ZERO,
    )
    .into_boss(None, Tick::ZERO);
    ctx.begin_pull(
        vec![boss],
        EncounterInfo {
            pull_index: 0,
            is_gate: false,
            is_boss: true,
        },
    );

    assert_eq!(run(&mut ctx, 250), TickOutcome::Continue);

    let resolved = ctx
        .drain_events()
        .into_iter()
        .filter(|e| {
            matches!(e, CombatEvent::CastResolved { ability, .. } if ability == "crushing_blow")
        })
        .count();
    assert!(resolved >= 1);

    let busters: Vec<_> = ctx
        .damage_log
        .iter()
        .filter(|entry| entry.ability == "crushing_blow")
        .collect();
    assert_eq!(busters.len(), resolved);
    assert!(busters.iter().all(|entry| entry.target == MemberId(0)));
    assert!(busters.iter().all(|entry| entry.amount == 300.0));
}

#[test]
fn pools_stay_in_bounds_and_death_flags_match_health() {
    let party: Vec<_> = [("tank", Role::Tank), ("priest", Role::Healer), ("hunter", Role::Damage)]
        .into_iter()
        .map(|(name, role)| {
            MemberSpec::new(name, role)
                .with_health(400.0)
                .with_energy_shield(50.0)
        })
        .collect();
    let mut ctx = CombatContext::new(CombatConfig::default(), &party, 6);
    let templates = [
        EnemyTemplate::new("grunt", EnemyBehavior::Melee).with_damage(15.0),
        EnemyTemplate::new("archer", EnemyBehavior::Archer).with_damage(12.0),
        EnemyTemplate::new("adept", EnemyBehavior::Caster).with_damage(25.0),
        EnemyTemplate::new("shaman", EnemyBehavior::Aoe).with_damage(10.0),
        EnemyTemplate::new("crusher", EnemyBehavior::Tankbuster).with_damage(20.0),
    ];
    ctx.begin_pull(spawn(&templates), EncounterInfo::default());

    let ai = EnemyAi::default();
    let mut mailbox = CommandMailbox::default();
    let mut engine = CombatEngine::new(&mut ctx, &ai);
    for _ in 0..600 {
        let outcome = engine.step(&mut mailbox, &mut IdleResolver);
        for member in &engine.context().team {
            assert!(member.health.current >= 0.0 && member.health.current <= member.health.max);
            assert!(member.energy_shield.current >= 0.0);
            assert!(member.energy_shield.current <= member.energy_shield.max);
            assert_eq!(member.is_dead, member.health.current == 0.0);
        }
        if outcome.is_terminal() {
            assert_eq!(outcome, TickOutcome::Wipe);
            break;
        }
    }
}
