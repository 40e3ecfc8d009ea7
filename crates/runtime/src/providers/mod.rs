//! Player-action resolvers shipped with the runtime.

mod auto_attack;

pub use auto_attack::AutoAttackResolver;
