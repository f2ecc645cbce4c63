//! Damage and healing resolution.
//!
//! [`DamageResolver`] rolls a magnitude in the requested range, applies the
//! target's [`WeaknessImmunityProfile`], clamps to the configured minimums and
//! sends a health-change instruction through the
//! [`HealthGateway`](crate::env::HealthGateway).
mod profile;
mod resolver;
mod tags;

pub use profile::{DamagePair, WeaknessImmunityProfile};
pub use resolver::{DamageRequest, DamageResolver, apply_modifiers, clamp_magnitude};
pub use tags::{DamageTag, DamageTypeSet};
