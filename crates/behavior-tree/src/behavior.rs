//! The node trait.

use crate::Status;

/// A node evaluated against a blackboard of type `C`.
///
/// Nodes are shared between actors of the same kind, so they hold no per-actor
/// state; anything that must survive between ticks lives in the simulation.
pub trait Behavior<C>: Send + Sync {
    fn tick(&self, ctx: &mut C) -> Status;
}

impl<C> Behavior<C> for Box<dyn Behavior<C>> {
    #[inline]
    fn tick(&self, ctx: &mut C) -> Status {
        (**self).tick(ctx)
    }
}
