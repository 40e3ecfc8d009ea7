//! Composite nodes: [`Sequence`] (all must pass) and [`Selector`] (first to pass).

use crate::{Behavior, Status};

/// Evaluates children left to right and stops at the first `Failure`.
///
/// Typical use is "guard, guard, act": cooldown and target checks followed by
/// the action leaf that commits to an intent.
pub struct Sequence<C> {
    children: Vec<Box<dyn Behavior<C>>>,
}

impl<C> Sequence<C> {
    /// # Panics
    ///
    /// Panics if `children` is empty; trees are built once at startup, so an
    /// empty composite is a construction bug.
    pub fn new(children: Vec<Box<dyn Behavior<C>>>) -> Self {
        assert!(!children.is_empty(), "Sequence must have at least one child");
        Self { children }
    }
}

impl<C> Behavior<C> for Sequence<C> {
    fn tick(&self, ctx: &mut C) -> Status {
        for child in &self.children {
            if child.tick(ctx).is_failure() {
                return Status::Failure;
            }
        }
        Status::Success
    }
}

/// Evaluates children left to right and stops at the first `Success`.
///
/// Children are listed in priority order; later ones are fallbacks.
pub struct Selector<C> {
    children: Vec<Box<dyn Behavior<C>>>,
}

impl<C> Selector<C> {
    /// # Panics
    ///
    /// Panics if `children` is empty.
    pub fn new(children: Vec<Box<dyn Behavior<C>>>) -> Self {
        assert!(!children.is_empty(), "Selector must have at least one child");
        Self { children }
    }
}

impl<C> Behavior<C> for Selector<C> {
    fn tick(&self, ctx: &mut C) -> Status {
        for child in &self.children {
            if child.tick(ctx).is_success() {
                return Status::Success;
            }
        }
        Status::Failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Swings {
        landed: u32,
        ready: bool,
    }

    struct Ready;
    impl Behavior<Swings> for Ready {
        fn tick(&self, ctx: &mut Swings) -> Status {
            Status::from_bool(ctx.ready)
        }
    }

    struct Swing;
    impl Behavior<Swings> for Swing {
        fn tick(&self, ctx: &mut Swings) -> Status {
            ctx.landed += 1;
            Status::Success
        }
    }

    struct Never;
    impl Behavior<Swings> for Never {
        fn tick(&self, _ctx: &mut Swings) -> Status {
            Status::Failure
        }
    }

    #[test]
    fn sequence_stops_at_failed_guard() {
        let tree = Sequence::new(vec![Box::new(Ready), Box::new(Swing)]);
        let mut ctx = Swings::default();
        assert_eq!(tree.tick(&mut ctx), Status::Failure);
        assert_eq!(ctx.landed, 0);

        ctx.ready = true;
        assert_eq!(tree.tick(&mut ctx), Status::Success);
        assert_eq!(ctx.landed, 1);
    }

    #[test]
    fn selector_takes_first_success_only() {
        let tree = Selector::new(vec![Box::new(Never), Box::new(Swing), Box::new(Swing)]);
        let mut ctx = Swings::default();
        assert_eq!(tree.tick(&mut ctx), Status::Success);
        assert_eq!(ctx.landed, 1);
    }

    #[test]
    fn selector_fails_when_every_child_fails() {
        let tree = Selector::new(vec![Box::new(Never), Box::new(Ready)]);
        let mut ctx = Swings::default();
        assert_eq!(tree.tick(&mut ctx), Status::Failure);
    }
}
