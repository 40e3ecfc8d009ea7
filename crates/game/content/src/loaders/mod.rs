//! Content loaders for reading game data from files.
//!
//! Dungeons, boss kits and party rosters are RON; combat configuration is TOML.

pub mod config;
pub mod dungeon;
pub mod factory;
pub mod kit;
pub mod party;

pub use config::ConfigLoader;
pub use dungeon::{DungeonCatalog, DungeonLoader};
pub use factory::ContentFactory;
pub use kit::{KitCatalog, KitLoader};
pub use party::{PartyLoader, PartyRoster};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
