//! Traits describing the collaborators the combat core talks to.
//!
//! The core never reaches for global state: random rolls, actor health,
//! physics queries, pooling and the actor body are all handed in explicitly,
//! so every component can be exercised in isolation.
mod body;
mod health;
mod physics;
mod pool;
mod rng;

pub use body::ActorBody;
pub use health::{Allegiance, HealthChange, HealthGateway, HealthView, StatsView};
pub use physics::{CollisionSource, EmptyScene};
pub use pool::{InstanceContext, PoolManager};
pub use rng::{FixedRoll, PcgRng, RngOracle};
