//! Data-driven combat content.
//!
//! This crate defines named profiles (projectiles, beams, stuns, weakness
//! tables) and scripted encounters, and provides loaders for the RON/TOML
//! files that describe them:
//! - Combat tunables (`combat.toml`)
//! - Profile catalog (`profiles.ron`)
//! - Encounters (`encounters/*.ron`)
//!
//! Everything is validated on load so the runtime only ever sees consistent
//! content.

pub mod encounter;
pub mod profiles;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use encounter::{ActorSpec, EncounterSpec, ScriptAction, ScriptStep};
pub use profiles::{BeamProfile, CombatProfiles, ContentError, ProfileKind, ProjectileProfile};

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentBundle, ContentFactory, EncounterLoader, LoadResult, ProfileLoader,
};
