//! Encounter script loader.

use std::path::Path;

use crate::encounter::EncounterSpec;
use crate::loaders::{LoadResult, read_file};
use crate::profiles::CombatProfiles;

/// Loader for scripted encounters from RON files.
pub struct EncounterLoader;

impl EncounterLoader {
    /// Load an encounter and resolve its references against `profiles`.
    pub fn load(path: &Path, profiles: &CombatProfiles) -> LoadResult<EncounterSpec> {
        let content = read_file(path)?;
        Self::parse(&content, profiles)
            .map_err(|e| anyhow::anyhow!("Failed to load encounter {}: {}", path.display(), e))
    }

    pub fn parse(content: &str, profiles: &CombatProfiles) -> LoadResult<EncounterSpec> {
        let encounter: EncounterSpec = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse encounter RON: {}", e))?;
        encounter.validate(profiles)?;

        Ok(encounter)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::encounter::ScriptAction;

    #[test]
    fn parses_script_actions() {
        let encounter = EncounterLoader::parse(
            r#"(
                name: "training",
                duration: 2.0,
                actors: [
                    (name: "dummy", health: 10, position: (0.0, 0.0, 4.0)),
                ],
                script: [
                    (at: 0.0, action: Damage(agent: None, target: "dummy", min: 5.0, max: 5.0, types: [])),
                ],
            )"#,
            &CombatProfiles::new(),
        )
        .unwrap();

        assert_eq!(encounter.tick_rate, EncounterSpec::DEFAULT_TICK_RATE);
        assert_eq!(encounter.actors[0].position, Vec3::new(0.0, 0.0, 4.0));
        assert!(matches!(
            encounter.script[0].action,
            ScriptAction::Damage { min, .. } if min == 5.0
        ));
    }

    #[test]
    fn dangling_reference_fails_the_load() {
        let err = EncounterLoader::parse(
            r#"(actors: [], script: [(at: 0.0, action: Kill(agent: None, target: "nobody"))])"#,
            &CombatProfiles::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("nobody"));
    }
}
