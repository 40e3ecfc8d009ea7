//! Dungeon catalog loader.

use std::path::Path;

use game_core::DungeonDefinition;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Dungeon catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DungeonCatalog {
    pub dungeons: Vec<DungeonDefinition>,
}

/// Loader for dungeon definitions from RON files.
pub struct DungeonLoader;

impl DungeonLoader {
    /// Load a dungeon catalog from a RON file. Every dungeon is validated.
    pub fn load(path: &Path) -> LoadResult<Vec<DungeonDefinition>> {
        let content = read_file(path)?;
        let catalog: DungeonCatalog = ron::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse dungeon catalog RON {}: {}", path.display(), e)
        })?;

        for dungeon in &catalog.dungeons {
            dungeon.validate()?;
        }
        Ok(catalog.dungeons)
    }

    /// Load every `*.ron` catalog in a directory, in file-name order.
    pub fn load_dir(dir: &Path) -> LoadResult<Vec<DungeonDefinition>> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "ron"))
            .collect();
        paths.sort();

        let mut dungeons = Vec::new();
        for path in paths {
            dungeons.extend(Self::load(&path)?);
        }
        Ok(dungeons)
    }
}
