//! Minimal behavior trees for tick-driven combat AI.
//!
//! A tree is evaluated once per simulation tick for each actor and always
//! finishes within that evaluation:
//!
//! - **No Running state**: long actions (casts, channels) are tracked in the
//!   simulation state, not inside the tree. The tree only decides what to
//!   start this tick.
//! - **Blackboard context**: nodes read and write a caller-defined context
//!   type `C`, usually an owned per-actor snapshot plus an output slot.
//! - **Zero dependencies**.
//!
//! # Architecture
//!
//! - [`Behavior`]: trait implemented by every node
//! - [`Status`]: `Success` or `Failure`
//! - Composites: [`Sequence`], [`Selector`]
//! - Decorator: [`Inverter`]
//! - Leaf: [`Condition`] (closure predicate)
//! - Builders: [`sequence`], [`selector`], [`inverter`], [`condition`]

pub mod behavior;
pub mod builder;
pub mod composite;
pub mod decorator;
pub mod leaf;
pub mod status;

pub use behavior::Behavior;
pub use builder::{condition, inverter, selector, sequence};
pub use composite::{Selector, Sequence};
pub use decorator::Inverter;
pub use leaf::Condition;
pub use status::Status;
