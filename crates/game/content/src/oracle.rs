//! In-memory encounter oracle over loaded content.

use std::collections::BTreeMap;

use game_core::{BossKit, CombatError, DungeonDefinition, EncounterOracle};

/// Encounter oracle backed by fixed maps of dungeons and boss kits.
#[derive(Clone, Debug, Default)]
pub struct StaticEncounterOracle {
    dungeons: BTreeMap<String, DungeonDefinition>,
    kits: BTreeMap<String, BossKit>,
}

impl StaticEncounterOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an oracle after validating every dungeon and its kit reference.
    pub fn from_parts(
        dungeons: impl IntoIterator<Item = DungeonDefinition>,
        kits: impl IntoIterator<Item = BossKit>,
    ) -> Result<Self, CombatError> {
        let mut oracle = Self::new();
        for kit in kits {
            oracle = oracle.with_kit(kit);
        }
        for dungeon in dungeons {
            dungeon.validate()?;
            if let Some(kit) = &dungeon.boss.boss.kit
                && !oracle.kits.contains_key(kit)
            {
                return Err(CombatError::UnknownBossKit { id: kit.clone() });
            }
            oracle = oracle.with_dungeon(dungeon);
        }
        Ok(oracle)
    }

    #[must_use]
    pub fn with_dungeon(mut self, dungeon: DungeonDefinition) -> Self {
        if self.dungeons.contains_key(&dungeon.id) {
            tracing::warn!(
                target: "content",
                id = %dungeon.id,
                "duplicate dungeon id, later definition wins"
            );
        }
        self.dungeons.insert(dungeon.id.clone(), dungeon);
        self
    }

    #[must_use]
    pub fn with_kit(mut self, kit: BossKit) -> Self {
        if self.kits.contains_key(&kit.id) {
            tracing::warn!(
                target: "content",
                id = %kit.id,
                "duplicate boss kit id, later definition wins"
            );
        }
        self.kits.insert(kit.id.clone(), kit);
        self
    }
}

impl EncounterOracle for StaticEncounterOracle {
    fn dungeon(&self, id: &str) -> Option<&DungeonDefinition> {
        self.dungeons.get(id)
    }

    fn boss_kit(&self, id: &str) -> Option<&BossKit> {
        self.kits.get(id)
    }

    fn dungeon_ids(&self) -> Vec<String> {
        self.dungeons.keys().cloned().collect()
    }
}
