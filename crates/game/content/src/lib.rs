//! Data-driven content definitions and loaders.
//!
//! This crate provides loaders for RON/TOML data files:
//! - Dungeon layouts with their pulls and boss (data-driven via RON)
//! - Boss ability kits (data-driven via RON)
//! - Party rosters with pre-aggregated stats (data-driven via RON)
//! - Combat configuration (data-driven via TOML)
//!
//! Content is served to the simulation through [`StaticEncounterOracle`] and
//! never appears in combat state.

pub mod oracle;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use oracle::StaticEncounterOracle;

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, DungeonCatalog, DungeonLoader, KitCatalog, KitLoader, PartyLoader,
    PartyRoster,
};
