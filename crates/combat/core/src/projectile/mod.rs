//! Pooled projectile lifecycle.
//!
//! A [`Projectile`] is activated by the pool, flies until its lifetime
//! expires, it is killed, or a collision spends it, and then hands itself back
//! through the [`PoolManager`](crate::env::PoolManager). Collisions are
//! classified by layer:
//!
//! - penetrate layers consume one penetration; exceeding the allowance
//!   terminates the projectile
//! - ignore layers are passed through without effect
//! - every other layer blocks: despawn callbacks run, then the projectile
//!   terminates
mod config;
mod lifecycle;
mod transfer;

pub use config::{ProjectileConfig, ProjectileFlags};
pub use lifecycle::{CollideCallback, CollisionOutcome, Projectile, ProjectilePhase, Strike};
pub use transfer::HitTransfer;
