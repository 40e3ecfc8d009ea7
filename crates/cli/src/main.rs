//! Headless dungeon run driver.
mod commands;
mod config;

use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use async_trait::async_trait;
use game_content::ContentFactory;
use game_core::RunResult;
use runtime::{ExecutionMode, PullCleared, RunHooks, Runner};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::CliConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = CliConfig::from_env();
    let _guard = setup_logging(config.log_dir.as_deref())?;

    match run(&config).await? {
        Some(result) => print_result(&result, config.pretty),
        None => {
            tracing::warn!("run stopped before it finished");
            Ok(())
        }
    }
}

async fn run(config: &CliConfig) -> Result<Option<RunResult>> {
    let factory = ContentFactory::new(&config.content_dir);
    let combat_config = factory
        .load_config()
        .with_context(|| format!("loading config from {}", config.content_dir.display()))?;
    let oracle = factory
        .build_oracle()
        .with_context(|| format!("loading content from {}", config.content_dir.display()))?;
    let party = factory
        .load_party(&config.party)
        .with_context(|| format!("loading party '{}'", config.party))?;

    let runner = Runner::builder()
        .config(combat_config)
        .mode(config.mode)
        .seed(config.seed)
        .oracle(Arc::new(oracle))
        .dungeon_id(config.dungeon.as_str())
        .party(party)
        .hooks(LogHooks)
        .build()
        .with_context(|| format!("preparing dungeon '{}'", config.dungeon))?;

    tracing::info!(
        dungeon = %config.dungeon,
        party = %config.party,
        seed = config.seed,
        mode = %config.mode,
        "starting run"
    );

    let task = runner.spawn();
    let handle = task.handle();

    if config.mode == ExecutionMode::RealTime {
        commands::spawn_reader(handle.clone());
    }

    let join = task.join();
    tokio::pin!(join);

    tokio::select! {
        outcome = &mut join => return Ok(outcome?),
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for ctrl-c")?;
            tracing::info!("interrupt received, stopping run");
            handle.stop();
        }
    }

    Ok(join.await?)
}

fn print_result(result: &RunResult, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");

    tracing::info!(
        success = result.success,
        fail_reason = ?result.fail_reason,
        ticks = result.ticks,
        experience = result.rewards.experience,
        currency = result.rewards.currency,
        "run finished"
    );
    Ok(())
}

/// Reports run progress through the log.
struct LogHooks;

#[async_trait]
impl RunHooks for LogHooks {
    async fn on_pull_cleared(&mut self, pull: &PullCleared) {
        tracing::info!(
            pull = pull.pull_index,
            name = %pull.name,
            boss = pull.is_boss,
            forces = pull.forces,
            tick = pull.tick.0,
            "pull cleared"
        );
    }

    async fn on_death_penalty(&mut self, dead: &[String]) {
        tracing::warn!(members = ?dead, "party wiped");
    }
}

/// Logs to stderr, and to a per-session file when a directory is given.
///
/// The returned guard flushes the file writer on drop.
fn setup_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let Some(log_dir) = log_dir else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
        return Ok(None);
    };

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    let session_log_dir = log_dir.join(format!("session_{timestamp}"));
    std::fs::create_dir_all(&session_log_dir)
        .with_context(|| format!("creating log directory {}", session_log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "dungeon-sim.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    tracing::info!("Log file: {}/dungeon-sim.log", session_log_dir.display());

    Ok(Some(guard))
}
