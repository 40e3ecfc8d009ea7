//! Recovery between pulls.

use game_core::{
    CombatConfig, CombatContext, CombatEvent, MemberId, MemberSpec, RecoveryMachine, RecoveryStage,
    Role,
};

fn party() -> CombatContext {
    let mut ctx = CombatContext::new(
        CombatConfig::default(),
        &[
            MemberSpec::new("tank", Role::Tank).with_health(1_000.0),
            MemberSpec::new("priest", Role::Healer).with_health(500.0),
            MemberSpec::new("rogue", Role::Damage).with_health(600.0),
        ],
        21,
    );
    ctx.begin_recovery();
    ctx
}

fn kill(ctx: &mut CombatContext, member: usize) {
    ctx.team[member].health.set(0.0);
    ctx.team[member].sync_life();
}

#[test]
fn recovery_revives_and_tops_off_everyone() {
    let mut ctx = party();
    ctx.team[0].health.set(500.0);
    ctx.team[0].mana.set(0.0);
    kill(&mut ctx, 2);

    let mut machine = RecoveryMachine::from_config(&ctx.config);
    let mut stages = vec![machine.stage()];
    while !machine.is_done() {
        let stage = machine.step(&mut ctx);
        if stages.last() != Some(&stage) {
            stages.push(stage);
        }
    }
    let report = machine.finish(&mut ctx);

    assert_eq!(
        stages,
        [
            RecoveryStage::Healing,
            RecoveryStage::MassResurrection,
            RecoveryStage::PostRezHealing,
            RecoveryStage::Done,
        ]
    );
    assert!(!report.timed_out);
    assert!(!report.wiped);
    assert_eq!(report.revived, 1);
    assert!(report.heals_cast >= 2);
    for member in &ctx.team {
        assert!(member.is_alive());
        assert_eq!(member.health.current, member.health.max);
        assert_eq!(member.mana.current, member.mana.max);
    }
    assert!(
        ctx.drain_events()
            .contains(&CombatEvent::MemberRevived { member: MemberId(2) })
    );
}

#[test]
fn healthy_party_finishes_immediately() {
    let mut ctx = party();
    let report = RecoveryMachine::default().run_to_completion(&mut ctx);
    assert_eq!(report.ticks, 1);
    assert_eq!(report.heals_cast, 0);
}

#[test]
fn dead_healer_means_wipe() {
    let mut ctx = party();
    kill(&mut ctx, 1);
    let report = RecoveryMachine::default().run_to_completion(&mut ctx);
    assert!(report.wiped);
    assert!(ctx.team[1].is_dead);
    assert_eq!(ctx.team[1].health.current, 0.0);
}

#[test]
fn stop_mid_recovery_still_repairs() {
    let mut ctx = party();
    ctx.team[0].health.set(100.0);
    let mut machine = RecoveryMachine::default();
    for _ in 0..5 {
        machine.step(&mut ctx);
    }
    assert!(!machine.is_done());
    let report = machine.finish(&mut ctx);
    assert!(!report.timed_out);
    assert_eq!(ctx.team[0].health.current, 1_000.0);
    assert!(ctx.team.iter().all(|m| !m.cast.is_casting()));
}

#[test]
fn exhausted_budget_reports_timeout() {
    let mut ctx = party();
    ctx.team[0].health.set(1.0);
    ctx.team[2].health.set(1.0);
    let report = RecoveryMachine::new(20).run_to_completion(&mut ctx);
    assert!(report.timed_out);
    assert_eq!(report.ticks, 20);
    assert!(ctx.team[2].health.current < ctx.team[2].health.max);
}
