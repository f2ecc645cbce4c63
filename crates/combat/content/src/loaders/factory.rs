//! Content factory for loading everything an encounter needs.

use std::path::{Path, PathBuf};

use combat_core::CombatConfig;

use crate::encounter::EncounterSpec;
use crate::loaders::{ConfigLoader, EncounterLoader, LoadResult, ProfileLoader};
use crate::profiles::CombatProfiles;

/// Tunables, profiles and one encounter loaded together.
#[derive(Clone, Debug)]
pub struct ContentBundle {
    pub config: CombatConfig,
    pub profiles: CombatProfiles,
    pub encounter: EncounterSpec,
}

/// Content factory that loads all combat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── combat.toml
/// ├── profiles.ron
/// └── encounters/
///     ├── duel.ron
///     └── gauntlet.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load combat tunables from `combat.toml`; a missing file yields defaults.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        let path = self.data_dir.join("combat.toml");
        if !path.exists() {
            return Ok(CombatConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the profile catalog from `profiles.ron`.
    pub fn load_profiles(&self) -> LoadResult<CombatProfiles> {
        let path = self.data_dir.join("profiles.ron");
        ProfileLoader::load(&path)
    }

    /// Load an encounter from `encounters/{name}.ron`.
    pub fn load_encounter(
        &self,
        name: &str,
        profiles: &CombatProfiles,
    ) -> LoadResult<EncounterSpec> {
        let path = self.encounter_path(name);
        EncounterLoader::load(&path, profiles)
    }

    pub fn load_bundle(&self, encounter: &str) -> LoadResult<ContentBundle> {
        let config = self.load_config()?;
        let profiles = self.load_profiles()?;
        let encounter = self.load_encounter(encounter, &profiles)?;
        Ok(ContentBundle {
            config,
            profiles,
            encounter,
        })
    }

    pub fn encounter_path(&self, name: &str) -> PathBuf {
        self.data_dir.join("encounters").join(format!("{}.ron", name))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
        assert_eq!(
            factory.encounter_path("duel"),
            Path::new("/tmp/data/encounters/duel.ron")
        );
    }

    #[test]
    fn loads_a_bundle_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("combat.toml"), "god_mode_allowed = true\n").unwrap();
        fs::write(
            dir.path().join("profiles.ron"),
            r#"(beams: { "laser": (beam: (max_length: 12.0)) })"#,
        )
        .unwrap();
        fs::create_dir(dir.path().join("encounters")).unwrap();
        fs::write(
            dir.path().join("encounters/duel.ron"),
            r#"(
                name: "duel",
                actors: [(name: "caster")],
                script: [(at: 0.0, action: StartBeam(shooter: "caster", profile: "laser"))],
            )"#,
        )
        .unwrap();

        let bundle = ContentFactory::new(dir.path()).load_bundle("duel").unwrap();
        assert!(bundle.config.god_mode_allowed);
        assert_eq!(bundle.profiles.beam("laser").unwrap().beam.max_length, 12.0);
        assert_eq!(bundle.encounter.name, "duel");
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ContentFactory::new(dir.path()).load_config().unwrap();
        assert_eq!(config, CombatConfig::default());
    }
}
