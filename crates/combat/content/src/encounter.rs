//! Scripted encounters: a cast of actors plus a timeline of combat actions.

use std::collections::HashSet;

use combat_core::{Layer, StatsView};
use glam::Vec3;

use crate::profiles::{CombatProfiles, ContentError};

/// One actor placed in an encounter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActorSpec {
    pub name: String,
    pub health: i32,
    pub position: Vec3,
    pub forward: Vec3,
    /// Radius of the actor's sphere collider.
    pub radius: f32,
    pub layer: Layer,
    pub allegiance: Option<u16>,
    pub stats: Option<StatsView>,
    /// Name of a stun profile; actors without one cannot be stunned.
    pub stun: Option<String>,
    /// Name of a weakness/immunity profile.
    pub weakness: Option<String>,
    /// Seconds of invincibility granted after taking damage.
    pub invincibility: f32,
}

impl Default for ActorSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            health: 10,
            position: Vec3::ZERO,
            forward: Vec3::Z,
            radius: 0.5,
            layer: Layer::default(),
            allegiance: None,
            stats: None,
            stun: None,
            weakness: None,
            invincibility: 0.0,
        }
    }
}

/// Something that happens at a scripted point in time.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScriptAction {
    /// Fires a projectile from the shooter; `direction` defaults to its facing.
    Fire {
        shooter: String,
        profile: String,
        direction: Option<Vec3>,
    },
    StartBeam {
        shooter: String,
        profile: String,
    },
    StopBeam {
        shooter: String,
    },
    /// Direct damage, bypassing colliders.
    Damage {
        agent: Option<String>,
        target: String,
        min: f32,
        max: f32,
        types: Vec<String>,
    },
    Kill {
        agent: Option<String>,
        target: String,
    },
}

impl ScriptAction {
    fn actors(&self) -> impl Iterator<Item = &str> {
        let (first, second) = match self {
            Self::Fire { shooter, .. }
            | Self::StartBeam { shooter, .. }
            | Self::StopBeam { shooter } => (shooter.as_str(), None),
            Self::Damage { agent, target, .. } | Self::Kill { agent, target } => {
                (target.as_str(), agent.as_deref())
            }
        };
        std::iter::once(first).chain(second)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptStep {
    /// Seconds since the encounter started.
    pub at: f32,
    pub action: ScriptAction,
}

/// A complete encounter description.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EncounterSpec {
    pub name: String,
    /// Seconds of simulated time.
    pub duration: f32,
    /// Ticks per simulated second.
    pub tick_rate: u32,
    pub actors: Vec<ActorSpec>,
    pub script: Vec<ScriptStep>,
}

impl Default for EncounterSpec {
    fn default() -> Self {
        Self {
            name: String::from("encounter"),
            duration: 5.0,
            tick_rate: Self::DEFAULT_TICK_RATE,
            actors: Vec::new(),
            script: Vec::new(),
        }
    }
}

impl EncounterSpec {
    pub const DEFAULT_TICK_RATE: u32 = 60;

    pub fn actor(&self, name: &str) -> Option<&ActorSpec> {
        self.actors.iter().find(|actor| actor.name == name)
    }

    /// Script steps ordered by time; steps sharing a time keep file order.
    pub fn timeline(&self) -> Vec<&ScriptStep> {
        let mut steps: Vec<&ScriptStep> = self.script.iter().collect();
        steps.sort_by(|a, b| a.at.total_cmp(&b.at));
        steps
    }

    /// Checks timing, the cast, and every profile and actor reference.
    pub fn validate(&self, profiles: &CombatProfiles) -> Result<(), ContentError> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(self.invalid(format!("duration must be positive (got {})", self.duration)));
        }
        if self.tick_rate == 0 {
            return Err(self.invalid("tick_rate must be positive".into()));
        }

        let mut names = HashSet::new();
        for actor in &self.actors {
            if !names.insert(actor.name.as_str()) {
                return Err(ContentError::DuplicateActor {
                    name: actor.name.clone(),
                });
            }
            if !(actor.radius.is_finite() && actor.radius > 0.0) {
                return Err(self.invalid(format!("actor '{}' needs a positive radius", actor.name)));
            }
            if !(actor.invincibility.is_finite() && actor.invincibility >= 0.0) {
                return Err(self.invalid(format!(
                    "actor '{}' has a negative invincibility window",
                    actor.name
                )));
            }
            if let Some(stun) = &actor.stun {
                profiles.stun(stun)?;
            }
            if let Some(weakness) = &actor.weakness {
                profiles.weakness(weakness)?;
            }
        }

        for step in &self.script {
            if !(step.at.is_finite() && step.at >= 0.0) {
                return Err(self.invalid(format!("script step at {} is out of range", step.at)));
            }
            for name in step.action.actors() {
                if !names.contains(name) {
                    return Err(ContentError::UnknownActor {
                        name: name.to_owned(),
                    });
                }
            }
            match &step.action {
                ScriptAction::Fire { profile, .. } => {
                    profiles.projectile(profile)?;
                }
                ScriptAction::StartBeam { profile, .. } => {
                    profiles.beam(profile)?;
                }
                ScriptAction::Damage { min, max, .. } if min > max => {
                    return Err(self.invalid(format!("damage range is inverted: {min} > {max}")));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> ContentError {
        ContentError::InvalidEncounter {
            name: self.name.clone(),
            reason,
        }
    }
}
