//! Runs built from the shipped content files.

use std::path::PathBuf;
use std::sync::Arc;

use game_content::ContentFactory;
use game_core::{CombatError, EncounterOracle, RoutePlan};
use runtime::{Runner, RuntimeError};

fn factory() -> ContentFactory {
    ContentFactory::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../game/content/data"))
}

#[tokio::test]
async fn sample_dungeon_runs_to_a_result() {
    let factory = factory();
    let oracle = factory.build_oracle().unwrap();
    let runner = Runner::builder()
        .config(factory.load_config().unwrap())
        .party(factory.load_party("default").unwrap())
        .oracle(Arc::new(oracle))
        .dungeon_id("sunken_crypt")
        .seed(42)
        .build()
        .unwrap();

    let result = runner.run().await.expect("run was not stopped");

    assert_eq!(result.seed, 42);
    assert_eq!(result.progress.total_pulls, 4);
    assert_eq!(result.members.len(), 4);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["seed"], 42);
}

#[tokio::test]
async fn same_seed_replays_identically() {
    let factory = factory();
    let run = |seed| {
        let oracle = factory.build_oracle().unwrap();
        Runner::builder()
            .party(factory.load_party("default").unwrap())
            .oracle(Arc::new(oracle))
            .dungeon_id("ashen_vault")
            .seed(seed)
            .build()
            .unwrap()
            .run()
    };

    let first = run(9).await.unwrap();
    let second = run(9).await.unwrap();
    assert_eq!(first, second);
}

#[test]
fn unknown_dungeon_is_rejected() {
    let factory = factory();
    let err = Runner::builder()
        .party(factory.load_party("default").unwrap())
        .oracle(Arc::new(factory.build_oracle().unwrap()))
        .dungeon_id("nowhere")
        .build()
        .err()
        .unwrap();
    assert!(matches!(
        err,
        RuntimeError::Combat(CombatError::UnknownDungeon { id }) if id == "nowhere"
    ));
}

#[test]
fn builder_requires_dungeon_and_party() {
    let factory = factory();
    let err = Runner::builder()
        .party(factory.load_party("default").unwrap())
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, RuntimeError::MissingDungeon));

    let oracle = factory.build_oracle().unwrap();
    let err = Runner::builder()
        .oracle(Arc::new(oracle))
        .dungeon_id("ashen_vault")
        .route(RoutePlan { pulls: vec![0] })
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, RuntimeError::MissingParty));
}

#[test]
fn named_kit_must_be_resolvable() {
    let factory = factory();
    let oracle = factory.build_oracle().unwrap();
    let dungeon = oracle.dungeon("sunken_crypt").cloned().unwrap();
    let err = Runner::builder()
        .party(factory.load_party("default").unwrap())
        .dungeon(dungeon)
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, RuntimeError::Combat(CombatError::UnknownBossKit { .. })));
}
