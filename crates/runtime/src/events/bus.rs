//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::broadcast;

use game_core::CombatState;

use super::types::{CombatRecord, RunEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Throttled UI snapshots
    Snapshot,
    /// Deaths, casts, shakes and other per-tick combat events
    Combat,
    /// Pull, recovery and run lifecycle
    Run,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize)]
pub enum Event {
    Snapshot(Box<CombatState>),
    Combat(CombatRecord),
    Run(RunEvent),
}

impl Event {
    /// The topic this event is published on.
    pub fn topic(&self) -> Topic {
        match self {
            Event::Snapshot(_) => Topic::Snapshot,
            Event::Combat(_) => Topic::Combat,
            Event::Run(_) => Topic::Run,
        }
    }
}

/// Topic-based event bus
///
/// Publishing never blocks the loop. Slow subscribers lag and skip events.
#[derive(Clone)]
pub struct EventBus {
    snapshot: broadcast::Sender<Event>,
    combat: broadcast::Sender<Event>,
    run: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            snapshot: broadcast::channel(capacity).0,
            combat: broadcast::channel(capacity).0,
            run: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Snapshot => &self.snapshot,
            Topic::Combat => &self.combat,
            Topic::Run => &self.run,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "runtime::events", ?topic, "no subscribers");
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::Tick;

    #[test]
    fn events_reach_only_their_topic() {
        let bus = EventBus::with_capacity(4);
        let mut run = bus.subscribe(Topic::Run);
        let mut combat = bus.subscribe(Topic::Combat);

        bus.publish(Event::Run(RunEvent::Stopped { tick: Tick(3) }));

        assert!(matches!(
            run.try_recv(),
            Ok(Event::Run(RunEvent::Stopped { tick: Tick(3) }))
        ));
        assert!(combat.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(Event::Run(RunEvent::Stopped { tick: Tick(0) }));
        assert_eq!(bus.subscribe_multiple(&[Topic::Snapshot, Topic::Run]).len(), 2);
    }
}
