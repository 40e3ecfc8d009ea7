//! Line-based run control on stdin.
//!
//! Recognized lines: `pause`, `resume`, `bloodlust`, `rez [member]`, `stop`.
use std::io::BufRead;
use std::thread;

use anyhow::{Result, bail};
use game_core::{ExternalCommand, MemberId};
use runtime::RunHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    Stop,
    Send(ExternalCommand),
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "pause" | "p" => Self::Pause,
            "resume" | "r" => Self::Resume,
            "stop" | "quit" | "q" => Self::Stop,
            "bloodlust" | "bl" => Self::Send(ExternalCommand::Bloodlust),
            "rez" | "resurrect" => {
                let member = match words.next() {
                    Some(raw) => Some(MemberId(raw.parse()?)),
                    None => None,
                };
                Self::Send(ExternalCommand::Resurrect { member })
            }
            other => bail!("unknown command '{other}'"),
        };

        if words.next().is_some() {
            bail!("too many arguments for '{verb}'");
        }
        Ok(Some(command))
    }

    fn apply(self, handle: &RunHandle) -> Result<()> {
        match self {
            Self::Pause => handle.set_paused(true),
            Self::Resume => handle.set_paused(false),
            Self::Stop => handle.stop(),
            Self::Send(command) => handle.send(command)?,
        }
        Ok(())
    }
}

/// Reads commands from stdin on a detached thread until EOF or until the run is stopped.
pub fn spawn_reader(handle: RunHandle) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if handle.is_stopped() {
                break;
            }
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    tracing::warn!("stdin closed: {err}");
                    break;
                }
            };

            match Command::parse(&line) {
                Ok(Some(command)) => match command.apply(&handle) {
                    Ok(()) => tracing::info!(?command, "command accepted"),
                    Err(err) => tracing::warn!(?command, "command rejected: {err}"),
                },
                Ok(None) => {}
                Err(err) => tracing::warn!("{err:#}"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_control_verbs() {
        assert_eq!(Command::parse("pause").unwrap(), Some(Command::Pause));
        assert_eq!(Command::parse("  R ").unwrap(), Some(Command::Resume));
        assert_eq!(Command::parse("quit").unwrap(), Some(Command::Stop));
        assert_eq!(Command::parse("").unwrap(), None);
    }

    #[test]
    fn parses_external_commands() {
        assert_eq!(
            Command::parse("bl").unwrap(),
            Some(Command::Send(ExternalCommand::Bloodlust))
        );
        assert_eq!(
            Command::parse("rez").unwrap(),
            Some(Command::Send(ExternalCommand::Resurrect { member: None }))
        );
        assert_eq!(
            Command::parse("rez 2").unwrap(),
            Some(Command::Send(ExternalCommand::Resurrect {
                member: Some(MemberId(2))
            }))
        );
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(Command::parse("dance").is_err());
        assert!(Command::parse("rez tank").is_err());
        assert!(Command::parse("pause now").is_err());
    }
}
