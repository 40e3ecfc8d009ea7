//! Result generation from a finished fight.

use game_core::{
    AnimatedEnemy, CombatConfig, CombatContext, CombatEngine, CommandMailbox, EnemyAi,
    EnemyBehavior, EnemyId, EnemyTemplate, EncounterInfo, MemberSpec, PlayerActionResolver,
    PlayerPhase, Role, RunOutcome, ScalingParams, Tick, TickOutcome, generate_result,
};

/// Every living member swings at the first snapshot target each tick.
struct Swing;

impl PlayerActionResolver for Swing {
    fn resolve(&mut self, phase: &mut PlayerPhase<'_>) {
        let Some(&target) = phase.targets().first() else {
            return;
        };
        let attackers: Vec<_> =
            phase.team().iter().filter(|m| m.is_alive()).map(|m| m.id).collect();
        for attacker in attackers {
            phase.auto_attack(attacker, target);
        }
    }
}

#[test]
fn victory_rolls_up_member_stats() {
    let mut ctx = CombatContext::new(
        CombatConfig::default(),
        &[
            MemberSpec::new("tank", Role::Tank).with_health(1_000.0),
            MemberSpec::new("hunter", Role::Damage).with_health(500.0),
        ],
        8,
    )
    .with_time_limit_secs(60.0)
    .with_progress(2, 1);
    let template = EnemyTemplate::new("rat", EnemyBehavior::Melee).with_health(200.0);
    let scaling = ScalingParams::default();
    let rats = (0..2)
        .map(|i| AnimatedEnemy::from_template(EnemyId(i), &template, &scaling, Tick::ZERO))
        .collect();
    ctx.begin_pull(rats, EncounterInfo::default());

    let ai = EnemyAi::default();
    let mut mailbox = CommandMailbox::default();
    let mut resolver = Swing;
    let mut engine = CombatEngine::new(&mut ctx, &ai);
    let mut outcome = TickOutcome::Continue;
    for _ in 0..500 {
        outcome = engine.step(&mut mailbox, &mut resolver);
        if outcome.is_terminal() {
            break;
        }
    }
    assert_eq!(outcome, TickOutcome::EnemiesDefeated);
    assert_eq!(ctx.progress.forces_killed, 2);

    let result = generate_result(&ctx, RunOutcome::Victory);
    assert!(result.success);
    assert!(result.reward_scale > 0.5 && result.reward_scale <= 1.0);
    assert!(result.death_causes.is_empty());
    assert!((result.total_damage() - 400.0).abs() < 1e-9);
    for member in &result.members {
        assert!(member.damage_by_ability.contains_key("attack"));
        assert!(member.dps > 0.0);
    }
    let tank = &result.members[0];
    assert!(tank.damage_taken_by_source.contains_key("rat"));
}
