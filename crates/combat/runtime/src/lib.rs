//! Reference runtime for the combat core.
//!
//! Wires `combat-core` to an in-memory world: an actor registry acting as
//! the health gateway, a sphere-collider scene acting as the collision
//! source, an object pool for projectiles and beams, and a topic-based event
//! bus that receives every combat notification. [`EncounterRunner`] plays
//! scripted encounters loaded by `combat-content`.

pub mod config;
pub mod encounter;
pub mod error;
pub mod events;
pub mod runtime;
pub mod world;

pub use config::RuntimeConfig;
pub use encounter::{ActorReport, EncounterReport, EncounterRunner};
pub use error::{Result, RuntimeError};
pub use events::{BusSink, Event, EventBus, Topic};
pub use runtime::CombatRuntime;
pub use world::{
    Actor, ActorRegistry, HealthLost, ObjectPool, SimBody, SphereCollider, SphereScene, World,
};
