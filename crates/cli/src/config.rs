//! Driver configuration read from the process environment.
use std::env;
use std::path::PathBuf;

use runtime::ExecutionMode;

/// Everything the driver needs to start one run.
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub mode: ExecutionMode,
    pub seed: u64,
    pub dungeon: String,
    pub party: String,
    pub content_dir: PathBuf,
    /// File logging is off unless this is set.
    pub log_dir: Option<PathBuf>,
    pub pretty: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Batch,
            seed: 0,
            dungeon: "sunken_crypt".to_string(),
            party: "default".to_string(),
            content_dir: default_content_dir(),
            log_dir: None,
            pretty: true,
        }
    }
}

impl CliConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `DUNGEON_MODE` - `batch` or `realtime` (default: batch)
    /// - `DUNGEON_SEED` - Seed for every roll in the run (default: 0)
    /// - `DUNGEON_ID` - Dungeon to run (default: sunken_crypt)
    /// - `DUNGEON_PARTY` - Roster file under `parties/` (default: default)
    /// - `DUNGEON_CONTENT_DIR` - Content data directory (default: located next to the build)
    /// - `DUNGEON_LOG_DIR` - Enables file logging; empty means the platform cache dir
    /// - `DUNGEON_COMPACT` - Print the result as single-line JSON
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(mode) = read_var::<ExecutionMode>(&lookup, "DUNGEON_MODE") {
            config.mode = mode;
        }

        if let Some(seed) = read_var::<u64>(&lookup, "DUNGEON_SEED") {
            config.seed = seed;
        }

        if let Some(id) = lookup("DUNGEON_ID").filter(|id| !id.is_empty()) {
            config.dungeon = id;
        }

        if let Some(party) = lookup("DUNGEON_PARTY").filter(|party| !party.is_empty()) {
            config.party = party;
        }

        if let Some(dir) = lookup("DUNGEON_CONTENT_DIR").filter(|dir| !dir.is_empty()) {
            config.content_dir = PathBuf::from(dir);
        }

        config.log_dir = lookup("DUNGEON_LOG_DIR").map(|dir| {
            if dir.is_empty() {
                default_log_dir()
            } else {
                PathBuf::from(dir)
            }
        });

        // A bare `DUNGEON_COMPACT=` counts as enabled.
        if let Some(compact) = read_var::<bool>(&lookup, "DUNGEON_COMPACT") {
            config.pretty = !compact;
        } else if lookup("DUNGEON_COMPACT").is_some() {
            config.pretty = false;
        }

        config
    }
}

fn read_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    lookup(key)?.trim().parse().ok()
}

/// Platform cache directory for log files.
///
/// - macOS: `~/Library/Caches/dungeon/logs`
/// - Linux: `~/.cache/dungeon/logs` (or `$XDG_CACHE_HOME/dungeon/logs`)
/// - Windows: `%LOCALAPPDATA%\dungeon\logs`
pub fn default_log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "dungeon")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/dungeon"))
        .join("logs")
}

/// Finds the shipped content data.
///
/// Tries relative to the executable first (`target/<profile>/` inside the
/// workspace), then the current directory.
fn default_content_dir() -> PathBuf {
    const RELATIVE: &str = "crates/game/content/data";

    let beside_exe = env::current_exe().ok().and_then(|exe| {
        exe.parent()
            .and_then(|p| p.parent())
            .and_then(|p| p.parent())
            .map(|root| root.join(RELATIVE))
    });

    match beside_exe {
        Some(dir) if dir.exists() => dir,
        _ => env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(RELATIVE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = CliConfig::from_lookup(lookup(&[]));
        assert_eq!(config.mode, ExecutionMode::Batch);
        assert_eq!(config.seed, 0);
        assert_eq!(config.dungeon, "sunken_crypt");
        assert_eq!(config.party, "default");
        assert!(config.log_dir.is_none());
        assert!(config.pretty);
    }

    #[test]
    fn reads_run_selection() {
        let config = CliConfig::from_lookup(lookup(&[
            ("DUNGEON_MODE", "realtime"),
            ("DUNGEON_SEED", " 1234 "),
            ("DUNGEON_ID", "ashen_vault"),
            ("DUNGEON_PARTY", "trio"),
            ("DUNGEON_CONTENT_DIR", "/srv/content"),
        ]));
        assert_eq!(config.mode, ExecutionMode::RealTime);
        assert_eq!(config.seed, 1234);
        assert_eq!(config.dungeon, "ashen_vault");
        assert_eq!(config.party, "trio");
        assert_eq!(config.content_dir, PathBuf::from("/srv/content"));
    }

    #[test]
    fn malformed_values_keep_defaults() {
        let config = CliConfig::from_lookup(lookup(&[
            ("DUNGEON_MODE", "turbo"),
            ("DUNGEON_SEED", "-5"),
            ("DUNGEON_ID", ""),
        ]));
        assert_eq!(config.mode, ExecutionMode::Batch);
        assert_eq!(config.seed, 0);
        assert_eq!(config.dungeon, "sunken_crypt");
    }

    #[test]
    fn empty_log_dir_uses_platform_cache() {
        let config = CliConfig::from_lookup(lookup(&[("DUNGEON_LOG_DIR", "")]));
        assert_eq!(config.log_dir, Some(default_log_dir()));

        let config = CliConfig::from_lookup(lookup(&[("DUNGEON_LOG_DIR", "/var/log/dungeon")]));
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/dungeon")));
    }

    #[test]
    fn compact_output_flag() {
        assert!(!CliConfig::from_lookup(lookup(&[("DUNGEON_COMPACT", "")])).pretty);
        assert!(!CliConfig::from_lookup(lookup(&[("DUNGEON_COMPACT", "true")])).pretty);
        assert!(CliConfig::from_lookup(lookup(&[("DUNGEON_COMPACT", "false")])).pretty);
    }
}
