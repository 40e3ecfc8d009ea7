//! Combat configuration loader.

use std::path::Path;

use game_core::CombatConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for combat configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys keep their defaults, so a partial file is valid.
    pub fn load(path: &Path) -> LoadResult<CombatConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<CombatConfig> {
        let config: CombatConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{OverflowPolicy, PriorityPolicyKind};

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ConfigLoader::parse(
            r#"
            batch_snapshot_interval = 25
            mailbox_overflow = "drop_oldest"
            boss_priority = "declared"
            "#,
        )
        .unwrap();
        assert_eq!(config.batch_snapshot_interval, 25);
        assert_eq!(config.mailbox_overflow, OverflowPolicy::DropOldest);
        assert_eq!(config.boss_priority, PriorityPolicyKind::Declared);
        assert_eq!(config.mailbox_capacity, CombatConfig::DEFAULT_MAILBOX_CAPACITY);
    }
}
