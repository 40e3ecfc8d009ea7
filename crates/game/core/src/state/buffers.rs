//! Bounded presentation buffers and the damage log used for death attribution.

use std::collections::VecDeque;

use super::common::{ActorRef, MemberId, Tick};

/// FIFO buffer that drops its oldest entry when full.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundedBuffer<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: T) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Removes and returns every buffered entry, oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        self.entries.drain(..).collect()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FloatKind {
    Damage,
    Critical,
    Heal,
    Blocked,
    Suppressed,
    Evaded,
    Shield,
}

/// One floating combat number for the UI.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloatingNumber {
    pub tick: Tick,
    pub target: ActorRef,
    pub amount: f64,
    pub kind: FloatKind,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    pub tick: Tick,
    pub message: String,
}

/// Damage taken by a party member, kept for death attribution.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageLogEntry {
    pub tick: Tick,
    pub target: MemberId,
    pub source: ActorRef,
    pub source_name: String,
    pub ability: String,
    pub amount: f64,
}
