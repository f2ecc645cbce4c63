//! Frame-driven combat resolution.
//!
//! `combat-core` resolves damage and healing between actors, runs pooled
//! projectile and beam lifecycles, and plays hit-stun effects. Every
//! component is a plain state machine advanced by explicit `tick` calls;
//! collaborators (actor health, physics queries, pooling, the actor body and
//! the notification sink) are passed in through the traits in [`env`] and
//! [`events`].
pub mod beam;
pub mod config;
pub mod damage;
pub mod env;
pub mod error;
pub mod events;
pub mod flicker;
pub mod projectile;
pub mod stun;
pub mod timer;
pub mod trigger;
pub mod types;

pub use beam::{Beam, BeamConfig, BeamPhase, SourcePose};
pub use config::CombatConfig;
pub use damage::{
    DamagePair, DamageRequest, DamageResolver, DamageTag, DamageTypeSet, WeaknessImmunityProfile,
};
pub use env::{
    ActorBody, Allegiance, CollisionSource, EmptyScene, FixedRoll, HealthChange, HealthGateway,
    HealthView, InstanceContext, PcgRng, PoolManager, RngOracle, StatsView,
};
pub use error::{CombatError, ConfigError, ContractViolation, ErrorSeverity};
pub use events::{CombatEvent, FlickerOwner, NotificationSink, TerminationReason, TraceSink};
pub use flicker::{Flicker, FlickerConfig, FlickerStep, Visuals};
pub use projectile::{
    CollideCallback, CollisionOutcome, HitTransfer, Projectile, ProjectileConfig, ProjectileFlags,
    ProjectilePhase, Strike,
};
pub use stun::{
    AnimationTag, EffectiveStun, HitStunApplier, HitStunController, KnockbackMode, StunConfig,
    StunContext, StunOverride,
};
pub use timer::TimerQueue;
pub use trigger::{
    DamageContext, DamageHandler, DamageHandlerConfig, HandlerFlags, TriggerMode, TriggerOutcome,
};
pub use types::{
    ColliderHit, ColliderId, EntityId, FrameTime, InstanceId, Layer, LayerMask,
    sort_hits_by_distance,
};
