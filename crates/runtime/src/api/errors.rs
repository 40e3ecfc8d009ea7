//! Unified error types surfaced by the runtime API.
//!
//! Failures only occur while assembling a run or when feeding it commands.
//! Once a run is going, wipes and timeouts are results, not errors.
use thiserror::Error;

use game_core::{CombatError, CommandKind, ErrorSeverity, GameError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors from building a run or talking to one in flight.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runner requires a dungeon before building")]
    MissingDungeon,

    #[error("runner requires a party before building")]
    MissingParty,

    #[error("{kind} mailbox is full ({capacity} pending)")]
    MailboxFull { kind: CommandKind, capacity: usize },

    #[error(transparent)]
    Combat(CombatError),

    #[error("run task join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

impl RuntimeError {
    /// Classifies the error; combat errors keep their own severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingDungeon | Self::MissingParty => ErrorSeverity::Validation,
            Self::MailboxFull { .. } => ErrorSeverity::Recoverable,
            Self::Combat(err) => err.severity(),
            Self::WorkerJoin(_) => ErrorSeverity::Internal,
        }
    }
}

impl From<CombatError> for RuntimeError {
    fn from(err: CombatError) -> Self {
        match err {
            CombatError::MailboxFull { kind, capacity, .. } => Self::MailboxFull { kind, capacity },
            other => Self::Combat(other),
        }
    }
}
