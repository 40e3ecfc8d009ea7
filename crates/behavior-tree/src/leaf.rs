//! Leaf nodes.

use crate::{Behavior, Status};

/// Succeeds when its predicate holds for the blackboard.
///
/// Conditions only read the context; use a dedicated node type for leaves
/// that record a decision.
pub struct Condition<C, F>
where
    F: Fn(&C) -> bool + Send + Sync,
{
    predicate: F,
    _context: std::marker::PhantomData<fn(&C)>,
}

impl<C, F> Condition<C, F>
where
    F: Fn(&C) -> bool + Send + Sync,
{
    pub fn new(predicate: F) -> Self {
        Self {
            predicate,
            _context: std::marker::PhantomData,
        }
    }
}

impl<C, F> Behavior<C> for Condition<C, F>
where
    F: Fn(&C) -> bool + Send + Sync,
{
    #[inline]
    fn tick(&self, ctx: &mut C) -> Status {
        Status::from_bool((self.predicate)(ctx))
    }
}
