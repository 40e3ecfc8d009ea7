//! Suspension strategy between ticks.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use game_core::{CombatConfig, Tick};

use crate::api::RunControl;

/// How the loop suspends between ticks. State transitions are identical in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Sleeps one tick duration per tick and honors pause.
    RealTime,
    /// Runs flat out, yielding to the scheduler periodically. Pause is ignored.
    #[default]
    Batch,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExecutionMode::RealTime => "realtime",
            ExecutionMode::Batch => "batch",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "realtime" | "real_time" | "real-time" => Ok(Self::RealTime),
            "batch" | "simulation" => Ok(Self::Batch),
            other => Err(format!("unknown execution mode '{other}' (expected batch or realtime)")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Pacer {
    mode: ExecutionMode,
    snapshot_interval: u64,
    yield_interval: u64,
}

impl Pacer {
    const PAUSE_POLL: Duration = Duration::from_millis(CombatConfig::TICK_MILLIS / 2);

    pub(crate) fn new(mode: ExecutionMode, config: &CombatConfig) -> Self {
        let snapshot_interval = match mode {
            ExecutionMode::RealTime => config.realtime_snapshot_interval,
            ExecutionMode::Batch => config.batch_snapshot_interval,
        };
        Self {
            mode,
            snapshot_interval: snapshot_interval.max(1),
            yield_interval: config.batch_yield_interval.max(1),
        }
    }

    pub(crate) fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Ticks between UI snapshots.
    pub(crate) fn snapshot_interval(&self) -> u64 {
        self.snapshot_interval
    }

    /// Suspends before the tick after `last`. Returns early when a stop arrives while paused.
    pub(crate) async fn pace(&self, control: &RunControl, last: Tick) {
        match self.mode {
            ExecutionMode::RealTime => {
                tokio::time::sleep(Duration::from_millis(CombatConfig::TICK_MILLIS)).await;
                while control.is_paused() && !control.is_stopped() {
                    tokio::time::sleep(Self::PAUSE_POLL).await;
                }
            }
            ExecutionMode::Batch => {
                if last.0 > 0 && last.0 % self.yield_interval == 0 {
                    tokio::task::yield_now().await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_parse_from_env_spellings() {
        assert_eq!("batch".parse::<ExecutionMode>(), Ok(ExecutionMode::Batch));
        assert_eq!("RealTime".parse::<ExecutionMode>(), Ok(ExecutionMode::RealTime));
        assert_eq!("real-time".parse::<ExecutionMode>(), Ok(ExecutionMode::RealTime));
        assert!("turbo".parse::<ExecutionMode>().is_err());
    }

    #[test]
    fn snapshot_interval_follows_mode() {
        let config = CombatConfig::default();
        assert_eq!(Pacer::new(ExecutionMode::RealTime, &config).snapshot_interval(), 2);
        assert_eq!(Pacer::new(ExecutionMode::Batch, &config).snapshot_interval(), 50);
    }
}
