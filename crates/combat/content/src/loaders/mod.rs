//! Content loaders for reading combat data from files.
//!
//! Tunables come from TOML, profiles and encounters from RON. Every loader
//! validates what it read before handing it out.

pub mod config;
pub mod encounter;
pub mod factory;
pub mod profiles;

pub use config::ConfigLoader;
pub use encounter::EncounterLoader;
pub use factory::{ContentBundle, ContentFactory};
pub use profiles::ProfileLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
