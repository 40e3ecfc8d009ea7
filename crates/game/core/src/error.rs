//! Common error infrastructure for game-core.
//!
//! Nothing inside a running simulation returns an error: degenerate numbers
//! are scrubbed and missing lookups fall back to default behavior with a log
//! line. Errors exist for the edges of a run, validating input before it
//! starts and rejecting external commands the run cannot accept.
//!
//! # Design Principles
//!
//! - **Severity Classification**: Errors are categorized for recovery strategies
//! - **Rich Context**: Errors may carry the actor and tick they relate to

use crate::engine::CommandKind;
use crate::state::{ActorRef, Tick};

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: Temporary conditions that may succeed on retry
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
/// - **Fatal**: Unrecoverable errors; the run cannot start or continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry later.
    ///
    /// Examples: command mailbox full
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: empty party, unknown dungeon id
    Validation,

    /// Internal error - unexpected state inconsistency.
    Internal,

    /// Fatal error - cannot continue.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Contextual information attached to errors for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    pub actor: Option<ActorRef>,
    /// Simulation tick at the time of error.
    pub tick: Tick,
    pub message: Option<&'static str>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(tick: Tick) -> Self {
        Self {
            actor: None,
            tick,
            message: None,
        }
    }

    #[must_use]
    pub const fn with_actor(mut self, actor: ActorRef) -> Self {
        self.actor = Some(actor);
        self
    }

    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new(Tick::ZERO)
    }
}

/// Common trait for all game-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Static identifier for this error variant, for metrics and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors raised while assembling a run or feeding it commands.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CombatError {
    #[error("party is empty")]
    EmptyParty,

    #[error("party of {size} exceeds the maximum of {max} members")]
    PartyTooLarge { size: usize, max: usize },

    #[error("unknown dungeon '{id}'")]
    UnknownDungeon { id: String },

    #[error("boss kit '{id}' is not registered")]
    UnknownBossKit { id: String },

    #[error("dungeon '{id}' is invalid: {reason}")]
    InvalidDungeon { id: String, reason: &'static str },

    #[error("{kind} mailbox is full ({capacity} pending)")]
    MailboxFull {
        kind: CommandKind,
        capacity: usize,
        context: ErrorContext,
    },
}

impl GameError for CombatError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MailboxFull { .. } => ErrorSeverity::Recoverable,
            Self::EmptyParty
            | Self::PartyTooLarge { .. }
            | Self::UnknownDungeon { .. }
            | Self::UnknownBossKit { .. }
            | Self::InvalidDungeon { .. } => ErrorSeverity::Validation,
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::MailboxFull { context, .. } => Some(context),
            _ => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyParty => "EMPTY_PARTY",
            Self::PartyTooLarge { .. } => "PARTY_TOO_LARGE",
            Self::UnknownDungeon { .. } => "UNKNOWN_DUNGEON",
            Self::UnknownBossKit { .. } => "UNKNOWN_BOSS_KIT",
            Self::InvalidDungeon { .. } => "INVALID_DUNGEON",
            Self::MailboxFull { .. } => "MAILBOX_FULL",
        }
    }
}
