//! Cloneable façade for steering a run from outside the loop.
//!
//! [`RunHandle`] shares cooperative flags and the command mailbox with the
//! loop. The loop checks the flags at the top of every tick and consumes at
//! most one command per kind per tick.
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;

use game_core::{CombatConfig, CommandKind, CommandMailbox, ExternalCommand, MemberId, Tick};

use super::errors::Result;
use crate::events::{Event, EventBus, Topic};

/// State shared between the loop and every handle clone.
#[derive(Debug)]
pub(crate) struct RunControl {
    stop: AtomicBool,
    paused: AtomicBool,
    /// Last tick the loop started, used to stamp command errors.
    tick: AtomicU64,
    mailbox: Mutex<CommandMailbox>,
}

impl RunControl {
    pub(crate) fn new(config: &CombatConfig) -> Self {
        Self {
            stop: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            tick: AtomicU64::new(0),
            mailbox: Mutex::new(CommandMailbox::from_config(config)),
        }
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub(crate) fn set_tick(&self, tick: Tick) {
        self.tick.store(tick.0, Ordering::Release);
    }

    /// Locks the mailbox. A poisoned lock still holds valid queues.
    pub(crate) fn mailbox(&self) -> MutexGuard<'_, CommandMailbox> {
        self.mailbox.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Client-facing handle to a run.
#[derive(Clone)]
pub struct RunHandle {
    control: Arc<RunControl>,
    event_bus: EventBus,
}

impl RunHandle {
    pub(crate) fn new(control: Arc<RunControl>, event_bus: EventBus) -> Self {
        Self { control, event_bus }
    }

    /// Requests a cooperative stop. The run returns `None` at the next tick boundary.
    pub fn stop(&self) {
        tracing::debug!(target: "runtime::loop", "stop requested");
        self.control.stop.store(true, Ordering::Release);
    }

    /// Whether a stop was requested, by this handle or any clone.
    pub fn is_stopped(&self) -> bool {
        self.control.is_stopped()
    }

    /// Pauses or resumes a real-time run. Batch runs ignore the flag.
    pub fn set_paused(&self, paused: bool) {
        tracing::debug!(target: "runtime::loop", paused, "pause toggled");
        self.control.paused.store(paused, Ordering::Release);
    }

    pub fn is_paused(&self) -> bool {
        self.control.is_paused()
    }

    /// Queues a resurrect. `None` revives every dead member.
    pub fn request_resurrect(&self, member: Option<MemberId>) -> Result<()> {
        self.send(ExternalCommand::Resurrect { member })
    }

    /// Queues a bloodlust. The engine ignores it while the party is sated.
    pub fn request_bloodlust(&self) -> Result<()> {
        self.send(ExternalCommand::Bloodlust)
    }

    /// Queues a command, failing with `MailboxFull` when the policy rejects it.
    pub fn send(&self, command: ExternalCommand) -> Result<()> {
        let now = Tick(self.control.tick.load(Ordering::Acquire));
        self.control.mailbox().push(command, now)?;
        Ok(())
    }

    /// Commands of `kind` still waiting to be consumed.
    pub fn pending(&self, kind: CommandKind) -> usize {
        self.control.mailbox().pending(kind)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Snapshot` - throttled [`game_core::CombatState`] views for a UI
    /// - `Topic::Combat` - deaths, casts, screen shakes
    /// - `Topic::Run` - pulls, recoveries and the final result
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RuntimeError;

    fn handle() -> RunHandle {
        let config = CombatConfig::default();
        RunHandle::new(Arc::new(RunControl::new(&config)), EventBus::new())
    }

    #[test]
    fn flags_are_shared_between_clones() {
        let handle = handle();
        let other = handle.clone();
        other.set_paused(true);
        assert!(handle.is_paused());
        other.stop();
        assert!(handle.is_stopped());
    }

    #[test]
    fn third_request_is_rejected() {
        let handle = handle();
        handle.request_bloodlust().unwrap();
        handle.request_bloodlust().unwrap();
        let err = handle.request_bloodlust().unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::MailboxFull {
                kind: CommandKind::Bloodlust,
                capacity: 2
            }
        ));
        assert_eq!(handle.pending(CommandKind::Bloodlust), 2);
        assert_eq!(handle.pending(CommandKind::Resurrect), 0);
    }
}
