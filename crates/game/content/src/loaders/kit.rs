//! Boss kit loader.

use std::path::Path;

use game_core::BossKit;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Boss kit catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitCatalog {
    pub kits: Vec<BossKit>,
}

/// Loader for boss ability kits from RON files.
pub struct KitLoader;

impl KitLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<BossKit>> {
        let content = read_file(path)?;
        let catalog: KitCatalog = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse boss kit RON: {}", e))?;

        for kit in &catalog.kits {
            if kit.abilities.is_empty() {
                anyhow::bail!("boss kit '{}' has no abilities", kit.id);
            }
        }
        Ok(catalog.kits)
    }
}
