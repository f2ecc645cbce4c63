//! Profile catalog loader.

use std::path::Path;

use crate::loaders::{LoadResult, read_file};
use crate::profiles::CombatProfiles;

/// Loader for named projectile, beam, stun and weakness profiles.
///
/// RON format: a `CombatProfiles` struct whose maps are keyed by profile
/// name; every map may be omitted.
pub struct ProfileLoader;

impl ProfileLoader {
    pub fn load(path: &Path) -> LoadResult<CombatProfiles> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<CombatProfiles> {
        let profiles: CombatProfiles = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse profile catalog RON: {}", e))?;
        profiles.validate()?;

        Ok(profiles)
    }
}
