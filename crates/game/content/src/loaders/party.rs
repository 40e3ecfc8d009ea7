//! Party roster loader.

use std::path::Path;

use game_core::MemberSpec;
use game_core::env::validate_party;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Party roster structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyRoster {
    pub members: Vec<MemberSpec>,
}

/// Loader for party rosters from RON files.
pub struct PartyLoader;

impl PartyLoader {
    /// Load a roster and check its size.
    pub fn load(path: &Path) -> LoadResult<Vec<MemberSpec>> {
        let content = read_file(path)?;
        let roster: PartyRoster = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse party roster RON: {}", e))?;

        validate_party(&roster.members)?;
        Ok(roster.members)
    }
}
