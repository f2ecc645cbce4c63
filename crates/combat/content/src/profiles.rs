//! Named combat profiles referenced by encounters and weapons.

use std::collections::HashMap;

use combat_core::{
    BeamConfig, ConfigError, DamageHandlerConfig, HitTransfer, ProjectileConfig, StunConfig,
    StunOverride, WeaknessImmunityProfile,
};

/// Everything a weapon needs to spawn one kind of projectile.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProjectileProfile {
    pub projectile: ProjectileConfig,
    /// Damage trigger attached to the projectile.
    pub damage: Option<DamageHandlerConfig>,
    /// Stun applied to struck actors, with per-hit overrides.
    pub stun: Option<StunOverride>,
    /// Meter transfer for the weapon owner.
    pub transfer: Option<HitTransfer>,
}

impl ProjectileProfile {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.projectile.validate()?;
        if let Some(damage) = &self.damage {
            damage.validate()?;
        }
        if let Some(stun) = &self.stun {
            stun.validate()?;
        }
        Ok(())
    }
}

/// A beam weapon and the damage its strikes deal.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BeamProfile {
    pub beam: BeamConfig,
    pub damage: Option<DamageHandlerConfig>,
}

impl BeamProfile {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.beam.validate()?;
        if let Some(damage) = &self.damage {
            damage.validate()?;
        }
        Ok(())
    }
}

/// Kind of profile, used in error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileKind {
    Projectile,
    Beam,
    Stun,
    Weakness,
}

impl ProfileKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Projectile => "projectile",
            Self::Beam => "beam",
            Self::Stun => "stun",
            Self::Weakness => "weakness",
        }
    }
}

impl std::fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content problems found while assembling profiles and encounters.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ContentError {
    #[error("{kind} profile '{name}' is invalid: {source}")]
    InvalidProfile {
        kind: ProfileKind,
        name: String,
        #[source]
        source: ConfigError,
    },

    #[error("unknown {kind} profile '{name}'")]
    UnknownProfile { kind: ProfileKind, name: String },

    #[error("unknown actor '{name}'")]
    UnknownActor { name: String },

    #[error("actor '{name}' is declared twice")]
    DuplicateActor { name: String },

    #[error("encounter '{name}' is invalid: {reason}")]
    InvalidEncounter { name: String, reason: String },
}

/// Registry of named profiles.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatProfiles {
    pub projectiles: HashMap<String, ProjectileProfile>,
    pub beams: HashMap<String, BeamProfile>,
    pub stuns: HashMap<String, StunConfig>,
    pub weaknesses: HashMap<String, WeaknessImmunityProfile>,
}

impl CombatProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projectile(&self, name: &str) -> Result<&ProjectileProfile, ContentError> {
        self.projectiles
            .get(name)
            .ok_or_else(|| unknown(ProfileKind::Projectile, name))
    }

    pub fn beam(&self, name: &str) -> Result<&BeamProfile, ContentError> {
        self.beams.get(name).ok_or_else(|| unknown(ProfileKind::Beam, name))
    }

    pub fn stun(&self, name: &str) -> Result<&StunConfig, ContentError> {
        self.stuns.get(name).ok_or_else(|| unknown(ProfileKind::Stun, name))
    }

    pub fn weakness(&self, name: &str) -> Result<&WeaknessImmunityProfile, ContentError> {
        self.weaknesses
            .get(name)
            .ok_or_else(|| unknown(ProfileKind::Weakness, name))
    }

    /// Validates every profile, reporting the first invalid one by name.
    pub fn validate(&self) -> Result<(), ContentError> {
        for (name, profile) in &self.projectiles {
            profile
                .validate()
                .map_err(|source| invalid(ProfileKind::Projectile, name, source))?;
        }
        for (name, profile) in &self.beams {
            profile
                .validate()
                .map_err(|source| invalid(ProfileKind::Beam, name, source))?;
        }
        for (name, profile) in &self.stuns {
            profile
                .validate()
                .map_err(|source| invalid(ProfileKind::Stun, name, source))?;
        }
        for (name, profile) in &self.weaknesses {
            profile
                .validate()
                .map_err(|source| invalid(ProfileKind::Weakness, name, source))?;
        }
        Ok(())
    }
}

fn unknown(kind: ProfileKind, name: &str) -> ContentError {
    ContentError::UnknownProfile {
        kind,
        name: name.to_owned(),
    }
}

fn invalid(kind: ProfileKind, name: &str, source: ConfigError) -> ContentError {
    ContentError::InvalidProfile {
        kind,
        name: name.to_owned(),
        source,
    }
}
