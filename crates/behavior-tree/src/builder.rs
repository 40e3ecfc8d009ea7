//! Shorthand constructors that box nodes for tree literals.

use crate::{Behavior, Condition, Inverter, Selector, Sequence};

#[inline]
pub fn sequence<C: 'static>(children: Vec<Box<dyn Behavior<C>>>) -> Box<dyn Behavior<C>> {
    Box::new(Sequence::new(children))
}

#[inline]
pub fn selector<C: 'static>(children: Vec<Box<dyn Behavior<C>>>) -> Box<dyn Behavior<C>> {
    Box::new(Selector::new(children))
}

#[inline]
pub fn inverter<C: 'static>(child: Box<dyn Behavior<C>>) -> Box<dyn Behavior<C>> {
    Box::new(Inverter::new(child))
}

/// Boxes a closure predicate as a [`Condition`] node.
#[inline]
pub fn condition<C, F>(predicate: F) -> Box<dyn Behavior<C>>
where
    C: 'static,
    F: Fn(&C) -> bool + Send + Sync + 'static,
{
    Box::new(Condition::new(predicate))
}
