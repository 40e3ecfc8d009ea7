//! Content factory for building oracles from data files.

use std::path::{Path, PathBuf};

use game_core::{BossKit, CombatConfig, DungeonDefinition, MemberSpec};

use crate::StaticEncounterOracle;
use crate::loaders::{ConfigLoader, DungeonLoader, KitLoader, LoadResult, PartyLoader};

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml        (optional)
/// ├── kits.ron
/// ├── dungeons/
/// │   └── sunken_crypt.ron
/// └── parties/
///     └── default.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load combat configuration from `config.toml`, or defaults when absent.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(
                target: "content",
                path = %path.display(),
                "no config file, using defaults"
            );
            return Ok(CombatConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load boss kits from `kits.ron`, or none when absent.
    pub fn load_kits(&self) -> LoadResult<Vec<BossKit>> {
        let path = self.data_dir.join("kits.ron");
        if !path.exists() {
            return Ok(Vec::new());
        }
        KitLoader::load(&path)
    }

    /// Load every dungeon catalog under `dungeons/`.
    pub fn load_dungeons(&self) -> LoadResult<Vec<DungeonDefinition>> {
        DungeonLoader::load_dir(&self.data_dir.join("dungeons"))
    }

    /// Load a roster from `parties/{name}.ron`.
    pub fn load_party(&self, name: &str) -> LoadResult<Vec<MemberSpec>> {
        let path = self.data_dir.join("parties").join(format!("{}.ron", name));
        PartyLoader::load(&path)
    }

    /// Loads dungeons and kits into an encounter oracle.
    pub fn build_oracle(&self) -> LoadResult<StaticEncounterOracle> {
        let kits = self.load_kits()?;
        let dungeons = self.load_dungeons()?;
        let oracle = StaticEncounterOracle::from_parts(dungeons, kits)?;
        Ok(oracle)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ContentFactory::new(dir.path()).load_config().unwrap();
        assert_eq!(config, CombatConfig::default());
    }
}
