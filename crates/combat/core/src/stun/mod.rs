//! Hit-stun: knockback, input lockout, hit animation and damage flicker.
//!
//! Stun parameters live in a [`StunConfig`] owned by the actor. Weapons that
//! need different values for a single hit pass a [`StunOverride`]; the
//! controller merges it into an [`EffectiveStun`] for that invocation and
//! never writes it back.
mod applier;
mod config;
mod controller;

pub use applier::HitStunApplier;
pub use config::{AnimationTag, EffectiveStun, KnockbackMode, StunConfig, StunOverride};
pub use controller::{HitStunController, StunContext, knockback_velocity};
