//! External commands (resurrect, bloodlust) delivered into a running simulation.
//!
//! Commands are queued per kind in a bounded FIFO and consumed at most one per
//! kind per tick, at the start of the tick before regeneration.

use std::collections::VecDeque;

use arrayvec::ArrayVec;

use crate::config::{CombatConfig, OverflowPolicy};
use crate::error::{CombatError, ErrorContext};
use crate::state::{Bloodlust, CombatContext, CombatEvent, MemberId, Tick};

/// Queue a command waits in. Each kind has its own bounded queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CommandKind {
    Resurrect,
    Bloodlust,
}

impl CommandKind {
    /// Number of kinds, and so the most commands one tick can consume.
    pub const COUNT: usize = 2;
}

/// A request from outside the simulation, applied at the start of a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExternalCommand {
    /// Revive one dead member, or every dead member when `member` is `None`.
    Resurrect { member: Option<MemberId> },
    /// Start a party-wide haste unless the party is still sated.
    Bloodlust,
}

impl ExternalCommand {
    /// The queue this command is routed to.
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Resurrect { .. } => CommandKind::Resurrect,
            Self::Bloodlust => CommandKind::Bloodlust,
        }
    }
}

/// Commands consumed in one tick, at most one per kind.
pub type CommandBatch = ArrayVec<ExternalCommand, { CommandKind::COUNT }>;

/// Bounded per-kind command queues.
#[derive(Clone, Debug)]
pub struct CommandMailbox {
    capacity: usize,
    policy: OverflowPolicy,
    resurrect: VecDeque<ExternalCommand>,
    bloodlust: VecDeque<ExternalCommand>,
}

impl CommandMailbox {
    /// Creates empty queues holding at most `capacity` commands each.
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            policy,
            resurrect: VecDeque::with_capacity(capacity),
            bloodlust: VecDeque::with_capacity(capacity),
        }
    }

    /// Mailbox sized and configured from the combat config.
    pub fn from_config(config: &CombatConfig) -> Self {
        Self::new(config.mailbox_capacity, config.mailbox_overflow)
    }

    fn queue_mut(&mut self, kind: CommandKind) -> &mut VecDeque<ExternalCommand> {
        match kind {
            CommandKind::Resurrect => &mut self.resurrect,
            CommandKind::Bloodlust => &mut self.bloodlust,
        }
    }

    /// Queues a command. `now` is only used for error context.
    pub fn push(&mut self, command: ExternalCommand, now: Tick) -> Result<(), CombatError> {
        let kind = command.kind();
        let capacity = self.capacity;
        let policy = self.policy;
        let queue = self.queue_mut(kind);
        if queue.len() >= capacity {
            match policy {
                OverflowPolicy::RejectNewest => {
                    return Err(CombatError::MailboxFull {
                        kind,
                        capacity,
                        context: ErrorContext::new(now).with_message("newest command rejected"),
                    });
                }
                OverflowPolicy::DropOldest => {
                    let dropped = queue.pop_front();
                    tracing::debug!(
                        target: "combat::commands",
                        %kind,
                        ?dropped,
                        "mailbox full, dropped oldest"
                    );
                }
            }
        }
        queue.push_back(command);
        Ok(())
    }

    /// Takes at most one command of each kind.
    pub fn take_tick_batch(&mut self) -> CommandBatch {
        let mut batch = CommandBatch::new();
        for queue in [&mut self.resurrect, &mut self.bloodlust] {
            if let Some(command) = queue.pop_front() {
                batch.push(command);
            }
        }
        batch
    }

    /// Commands of `kind` still waiting to be consumed.
    pub fn pending(&self, kind: CommandKind) -> usize {
        match kind {
            CommandKind::Resurrect => self.resurrect.len(),
            CommandKind::Bloodlust => self.bloodlust.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.resurrect.is_empty() && self.bloodlust.is_empty()
    }
}

impl Default for CommandMailbox {
    fn default() -> Self {
        Self::from_config(&CombatConfig::default())
    }
}

/// Applies a tick's commands to the context.
pub fn apply_commands(
    ctx: &mut CombatContext,
    commands: impl IntoIterator<Item = ExternalCommand>,
) {
    for command in commands {
        tracing::debug!(
            target: "combat::commands",
            ?command,
            tick = ctx.tick.0,
            "command consumed"
        );
        match command {
            ExternalCommand::Resurrect { member } => resurrect(ctx, member),
            ExternalCommand::Bloodlust => bloodlust(ctx),
        }
    }
}

fn resurrect(ctx: &mut CombatContext, member: Option<MemberId>) {
    let targets: Vec<MemberId> = match member {
        Some(id) => vec![id],
        None => ctx.team.iter().filter(|m| m.is_dead).map(|m| m.id).collect(),
    };
    for id in targets {
        let Some(target) = ctx.member_mut(id) else {
            tracing::warn!(
                target: "combat::commands",
                member = %id,
                "resurrect for unknown member ignored"
            );
            continue;
        };
        if !target.revive(CombatConfig::RESURRECT_HEALTH, CombatConfig::RESURRECT_MANA) {
            continue;
        }
        let name = target.name.clone();
        ctx.party_debuffs.clear_member(id);
        ctx.emit(CombatEvent::MemberRevived { member: id });
        ctx.push_log(format!("{name} is resurrected"));
    }
}

fn bloodlust(ctx: &mut CombatContext) {
    let now = ctx.tick;
    if ctx.party_buffs.bloodlust.is_some() || ctx.party_buffs.is_sated(now) {
        tracing::debug!(
            target: "combat::commands",
            tick = now.0,
            "bloodlust ignored, party is sated"
        );
        ctx.push_log("The party is still sated");
        return;
    }
    ctx.party_buffs.bloodlust = Some(Bloodlust {
        damage_pct: CombatConfig::BLOODLUST_DAMAGE_PCT,
        haste_pct: CombatConfig::BLOODLUST_HASTE_PCT,
        ends_at: now + CombatConfig::BLOODLUST_TICKS,
    });
    ctx.party_buffs.sated_until = Some(now + CombatConfig::SATED_TICKS);
    ctx.emit(CombatEvent::BloodlustStarted);
    ctx.push_log("Bloodlust!");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MemberSpec;
    use crate::state::Role;

    #[test]
    fn reject_newest_reports_full_mailbox() {
        let mut mailbox = CommandMailbox::new(2, OverflowPolicy::RejectNewest);
        assert!(mailbox.push(ExternalCommand::Bloodlust, Tick(1)).is_ok());
        assert!(mailbox.push(ExternalCommand::Bloodlust, Tick(1)).is_ok());
        let err = mailbox.push(ExternalCommand::Bloodlust, Tick(1)).unwrap_err();
        assert!(matches!(err, CombatError::MailboxFull { kind: CommandKind::Bloodlust, .. }));
        // Other kinds have their own queue.
        assert!(mailbox.push(ExternalCommand::Resurrect { member: None }, Tick(1)).is_ok());
    }

    #[test]
    fn drop_oldest_keeps_latest_commands() {
        let mut mailbox = CommandMailbox::new(1, OverflowPolicy::DropOldest);
        mailbox
            .push(ExternalCommand::Resurrect { member: Some(MemberId(0)) }, Tick(0))
            .unwrap();
        mailbox
            .push(ExternalCommand::Resurrect { member: Some(MemberId(1)) }, Tick(0))
            .unwrap();
        let batch = mailbox.take_tick_batch();
        assert_eq!(batch.as_slice(), &[ExternalCommand::Resurrect { member: Some(MemberId(1)) }]);
        assert!(mailbox.is_empty());
    }

    #[test]
    fn one_command_per_kind_per_tick() {
        let mut mailbox = CommandMailbox::new(2, OverflowPolicy::RejectNewest);
        mailbox.push(ExternalCommand::Bloodlust, Tick(0)).unwrap();
        mailbox.push(ExternalCommand::Bloodlust, Tick(0)).unwrap();
        mailbox.push(ExternalCommand::Resurrect { member: None }, Tick(0)).unwrap();
        assert_eq!(mailbox.take_tick_batch().len(), 2);
        assert_eq!(mailbox.take_tick_batch().as_slice(), &[ExternalCommand::Bloodlust]);
        assert!(mailbox.take_tick_batch().is_empty());
    }

    #[test]
    fn bloodlust_then_sated() {
        let mut ctx = CombatContext::new(
            CombatConfig::default(),
            &[MemberSpec::new("tank", Role::Tank)],
            0,
        );
        apply_commands(&mut ctx, [ExternalCommand::Bloodlust]);
        assert!(ctx.party_buffs.bloodlust.is_some());
        ctx.party_buffs.bloodlust = None;
        ctx.tick = Tick(500);
        apply_commands(&mut ctx, [ExternalCommand::Bloodlust]);
        assert!(ctx.party_buffs.bloodlust.is_none());
    }

    #[test]
    fn resurrect_revives_dead_members_at_half() {
        let mut ctx = CombatContext::new(
            CombatConfig::default(),
            &[
                MemberSpec::new("tank", Role::Tank).with_health(200.0),
                MemberSpec::new("healer", Role::Healer).with_health(100.0),
            ],
            0,
        );
        for member in &mut ctx.team {
            member.health.drain(1_000.0);
            member.sync_life();
        }
        apply_commands(&mut ctx, [ExternalCommand::Resurrect { member: None }]);
        assert_eq!(ctx.team[0].health.current, 100.0);
        assert_eq!(ctx.team[1].health.current, 50.0);
        assert!(ctx.team.iter().all(|m| m.is_alive()));
    }
}
