//! Async run loop: pull sequencing, control handle and hooks.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast::error::TryRecvError;

use game_core::{
    BossPull, BossTemplate, CombatEvent, CombatState, CommandKind, DungeonDefinition, EnemyBehavior,
    EnemyTemplate, FailReason, IdleResolver, MemberId, MemberSpec, PullDefinition, RewardTable,
    Role, RunResult,
};
use runtime::{Event, ExecutionMode, PullCleared, RunEvent, RunHooks, Runner, RuntimeError, Topic};

fn pull(name: &str, health: f64) -> PullDefinition {
    PullDefinition {
        name: name.into(),
        enemies: vec![EnemyTemplate::new("rat", EnemyBehavior::Melee)
            .with_health(health)
            .with_damage(1.0)],
        ..PullDefinition::default()
    }
}

fn dungeon() -> DungeonDefinition {
    DungeonDefinition {
        id: "rat_cellar".into(),
        name: "Rat Cellar".into(),
        level: 1,
        time_limit_secs: 600.0,
        required_forces: 2,
        pulls: vec![pull("first", 50.0), pull("second", 50.0)],
        boss: BossPull {
            boss: BossTemplate {
                stats: EnemyTemplate::new("rat king", EnemyBehavior::Boss)
                    .with_health(200.0)
                    .with_damage(1.0),
                kit: None,
            },
            ..BossPull::default()
        },
        rewards: RewardTable {
            experience_per_force: 10,
            currency_per_pull: 5,
            completion_experience: 100,
            completion_currency: 50,
        },
    }
}

fn party() -> Vec<MemberSpec> {
    let mut tank = MemberSpec::new("tank", Role::Tank).with_health(1_000.0);
    tank.offense.attack_damage = 50.0;
    let mut priest = MemberSpec::new("priest", Role::Healer).with_health(600.0);
    priest.offense.heal_power = 40.0;
    vec![tank, priest]
}

#[derive(Debug, Default)]
struct Recorded {
    experience: u64,
    pulls: Vec<usize>,
    dead: Vec<String>,
    snapshots: usize,
    finished: bool,
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Recorded>>);

#[async_trait]
impl RunHooks for Recorder {
    async fn on_experience(&mut self, amount: u64) {
        self.0.lock().unwrap().experience += amount;
    }

    async fn on_death_penalty(&mut self, dead: &[String]) {
        self.0.lock().unwrap().dead = dead.to_vec();
    }

    async fn on_pull_cleared(&mut self, pull: &PullCleared) {
        self.0.lock().unwrap().pulls.push(pull.pull_index);
    }

    async fn on_snapshot(&mut self, _state: &CombatState) {
        self.0.lock().unwrap().snapshots += 1;
    }

    async fn on_run_finished(&mut self, _result: &RunResult) {
        self.0.lock().unwrap().finished = true;
    }
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => return events,
        }
    }
}

#[tokio::test]
async fn batch_run_clears_every_pull_and_pays_rewards() {
    let recorder = Recorder::default();
    let runner = Runner::builder()
        .dungeon(dungeon())
        .party(party())
        .seed(3)
        .hooks(recorder.clone())
        .build()
        .unwrap();

    let result = runner.run().await.expect("run was not stopped");

    assert!(result.success);
    assert_eq!(result.fail_reason, None);
    assert_eq!(result.progress.pulls_cleared, 3);
    assert_eq!(result.progress.total_pulls, 3);
    assert!(result.progress.boss_defeated);
    assert!(result.reward_scale > 0.5);
    assert!(result.rewards.experience >= 20 + 50);
    assert_eq!(result.rewards.currency, 3 * 5 + (50.0 * result.reward_scale).round() as u64);

    let recorded = recorder.0.lock().unwrap();
    assert_eq!(recorded.pulls, [0, 1, 2]);
    assert_eq!(recorded.experience, result.rewards.experience);
    assert!(recorded.snapshots > 0);
    assert!(recorded.finished);
    assert!(recorded.dead.is_empty());
}

#[tokio::test]
async fn run_events_follow_pull_order() {
    let runner = Runner::builder()
        .dungeon(dungeon())
        .party(party())
        .event_capacity(1_024)
        .build()
        .unwrap();
    let mut rx = runner.handle().subscribe(Topic::Run);

    runner.run().await.expect("run was not stopped");
    let events = drain(&mut rx);

    assert!(matches!(
        events.first(),
        Some(Event::Run(RunEvent::Started { pulls: 3, .. }))
    ));
    assert!(matches!(
        events.last(),
        Some(Event::Run(RunEvent::Finished(result))) if result.success
    ));
    let cleared: Vec<usize> = events
        .iter()
        .filter_map(|event| match event {
            Event::Run(RunEvent::PullCleared(pull)) => Some(pull.pull_index),
            _ => None,
        })
        .collect();
    assert_eq!(cleared, [0, 1, 2]);
    let recoveries = events
        .iter()
        .filter(|event| matches!(event, Event::Run(RunEvent::RecoveryFinished { .. })))
        .count();
    assert_eq!(recoveries, 2);
}

#[tokio::test]
async fn time_limit_ends_run_with_timeout() {
    let mut dungeon = dungeon();
    dungeon.time_limit_secs = 5.0;
    dungeon.pulls = vec![PullDefinition {
        name: "wall".into(),
        enemies: vec![EnemyTemplate::new("golem", EnemyBehavior::Melee)
            .with_health(1_000_000.0)
            .with_damage(0.0)],
        ..PullDefinition::default()
    }];
    let runner = Runner::builder()
        .dungeon(dungeon)
        .party(party())
        .resolver(IdleResolver)
        .build()
        .unwrap();

    let result = runner.run().await.expect("run was not stopped");

    assert!(!result.success);
    assert_eq!(result.fail_reason, Some(FailReason::Timeout));
    assert_eq!(result.ticks, 50);
    assert_eq!(result.reward_scale, 0.0);
    assert!(result.death_causes.is_empty());
}

#[tokio::test]
async fn wipe_applies_death_penalty() {
    let mut dungeon = dungeon();
    dungeon.pulls = vec![PullDefinition {
        name: "ambush".into(),
        enemies: vec![EnemyTemplate::new("ogre", EnemyBehavior::Melee)
            .with_health(10_000.0)
            .with_damage(500.0)],
        ..PullDefinition::default()
    }];
    let recorder = Recorder::default();
    let runner = Runner::builder()
        .dungeon(dungeon)
        .party(vec![MemberSpec::new("tank", Role::Tank).with_health(100.0)])
        .hooks(recorder.clone())
        .build()
        .unwrap();

    let result = runner.run().await.expect("run was not stopped");

    assert_eq!(result.fail_reason, Some(FailReason::Wipe));
    assert_eq!(result.death_causes[&MemberId(0)].killer, "ogre");
    assert_eq!(recorder.0.lock().unwrap().dead, ["tank"]);
}

#[tokio::test]
async fn stop_returns_no_result() {
    let runner = Runner::builder()
        .dungeon(dungeon())
        .party(party())
        .mode(ExecutionMode::RealTime)
        .build()
        .unwrap();
    let mut rx = runner.handle().subscribe(Topic::Run);
    let task = runner.spawn();

    tokio::time::sleep(Duration::from_millis(350)).await;
    task.handle().stop();
    let outcome = tokio::time::timeout(Duration::from_secs(2), task.join())
        .await
        .expect("run stops promptly")
        .unwrap();

    assert!(outcome.is_none());
    assert!(
        drain(&mut rx)
            .iter()
            .any(|event| matches!(event, Event::Run(RunEvent::Stopped { .. })))
    );
}

#[tokio::test]
async fn pause_holds_the_realtime_clock() {
    let runner = Runner::builder()
        .dungeon(dungeon())
        .party(party())
        .mode(ExecutionMode::RealTime)
        .build()
        .unwrap();
    let handle = runner.handle();
    let mut snapshots = handle.subscribe(Topic::Snapshot);
    handle.set_paused(true);
    let task = runner.spawn();

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(matches!(snapshots.try_recv(), Err(TryRecvError::Empty)));

    handle.set_paused(false);
    let event = tokio::time::timeout(Duration::from_secs(2), snapshots.recv())
        .await
        .expect("snapshot after resume")
        .unwrap();
    assert!(matches!(event, Event::Snapshot(state) if state.tick.0 >= 1));

    handle.stop();
    assert!(task.join().await.unwrap().is_none());
}

#[tokio::test]
async fn batch_runs_ignore_pause() {
    let runner = Runner::builder().dungeon(dungeon()).party(party()).build().unwrap();
    runner.handle().set_paused(true);
    assert!(runner.run().await.is_some());
}

#[tokio::test]
async fn full_mailbox_rejects_and_commands_are_consumed() {
    let runner = Runner::builder()
        .dungeon(dungeon())
        .party(party())
        .event_capacity(4_096)
        .build()
        .unwrap();
    let handle = runner.handle();
    let mut combat = handle.subscribe(Topic::Combat);

    handle.request_bloodlust().unwrap();
    handle.request_bloodlust().unwrap();
    assert!(matches!(
        handle.request_bloodlust(),
        Err(RuntimeError::MailboxFull {
            kind: CommandKind::Bloodlust,
            ..
        })
    ));

    runner.run().await.expect("run was not stopped");

    assert_eq!(handle.pending(CommandKind::Bloodlust), 0);
    let started = drain(&mut combat)
        .iter()
        .filter(|event| {
            matches!(event, Event::Combat(record) if record.event == CombatEvent::BloodlustStarted)
        })
        .count();
    assert_eq!(started, 1);
}
