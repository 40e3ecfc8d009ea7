//! Loader tests against temporary files and the shipped sample data.

use std::fs;
use std::path::Path;

use game_content::{ContentFactory, DungeonLoader, PartyLoader};
use game_core::env::AbilityEffect;
use game_core::{EncounterOracle, Role};

fn sample_data() -> ContentFactory {
    ContentFactory::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
}

#[test]
fn shipped_content_builds_an_oracle() {
    let factory = sample_data();
    let oracle = factory.build_oracle().expect("sample content is valid");
    assert_eq!(oracle.dungeon_ids(), vec!["ashen_vault", "sunken_crypt"]);

    let crypt = oracle.dungeon("sunken_crypt").unwrap();
    assert_eq!(crypt.pulls.len(), 3);
    assert!(crypt.pulls[2].is_gate);
    let kit = oracle.boss_kit("drowned_priest").unwrap();
    assert!(matches!(
        kit.ability("drowned_fury").map(|a| &a.effect),
        Some(AbilityEffect::Enrage { .. })
    ));

    let party = factory.load_party("default").unwrap();
    assert_eq!(party.len(), 4);
    assert_eq!(party.iter().filter(|m| m.role == Role::Healer).count(), 1);

    let config = factory.load_config().unwrap();
    assert_eq!(config.recovery_budget_ticks, 600);
}

#[test]
fn oversized_roster_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crowd.ron");
    let member = r#"(name: "extra", role: damage)"#;
    let roster = format!("(members: [{}])", vec![member; 6].join(", "));
    fs::write(&path, roster).unwrap();

    let err = PartyLoader::load(&path).unwrap_err();
    assert!(err.to_string().contains("exceeds the maximum"));
}

#[test]
fn invalid_dungeon_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ron");
    fs::write(&path, r#"(dungeons: [(id: "pit", pulls: [(name: "empty")])])"#).unwrap();

    let err = DungeonLoader::load(&path).unwrap_err();
    assert!(err.to_string().contains("pit"));
}

#[test]
fn malformed_ron_reports_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.ron");
    fs::write(&path, "(dungeons: [").unwrap();

    let err = DungeonLoader::load(&path).unwrap_err();
    assert!(err.to_string().contains("garbage.ron"));
}

#[test]
fn unknown_kit_reference_fails_oracle_build() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("dungeons")).unwrap();
    fs::write(
        dir.path().join("dungeons").join("tomb.ron"),
        r#"(dungeons: [(id: "tomb", boss: (boss: (kit: Some("ghost"))))])"#,
    )
    .unwrap();

    let err = ContentFactory::new(dir.path()).build_oracle().unwrap_err();
    assert!(err.to_string().contains("ghost"));
}
