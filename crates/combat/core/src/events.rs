//! Notifications emitted by the combat core.
//!
//! Components call a [`NotificationSink`] synchronously at the point where
//! something observable happens. The core never knows who is listening:
//! animation, audio, UI and meter systems subscribe on the other side of the
//! sink.

use glam::Vec3;

use crate::stun::AnimationTag;
use crate::types::{ColliderHit, ColliderId, EntityId, InstanceId};

/// Why a projectile left the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TerminationReason {
    /// Struck a blocking layer.
    Blocked,
    /// Exceeded its penetration allowance.
    PenetrationSpent,
    /// Lifetime ran out.
    Expired,
    /// Killed explicitly (weapon code, parent disabled, culled).
    Killed,
}

/// Owner of a flicker effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlickerOwner {
    Actor(EntityId),
    Projectile(InstanceId),
}

/// Every notification the combat core can emit.
#[derive(Clone, Debug, PartialEq, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum CombatEvent {
    // ===== damage triggers =====
    /// A damage trigger processed a valid target.
    Hit {
        agent: Option<EntityId>,
        target: EntityId,
    },
    /// A damage trigger touched a collider that does not belong to an actor.
    InvalidTarget {
        agent: Option<EntityId>,
        collider: ColliderId,
    },
    /// A target that was alive before a trigger's hit is dead after it.
    KilledTarget {
        agent: Option<EntityId>,
        target: EntityId,
    },

    // ===== projectiles =====
    ProjectileFired {
        projectile: InstanceId,
        source: Option<EntityId>,
    },
    ProjectileCollided {
        projectile: InstanceId,
        source: Option<EntityId>,
        hit: ColliderHit,
    },
    ProjectileTerminated {
        projectile: InstanceId,
        reason: TerminationReason,
    },
    /// Damage dealt by a projectile landed; builds meter for the weapon owner.
    ProjectileHit { owner: EntityId, scale: f32 },
    /// A projectile's damage killed `target`.
    ProjectileKilledTarget {
        projectile: InstanceId,
        target: EntityId,
    },

    // ===== beams =====
    BeamStruck { beam: InstanceId, hit: ColliderHit },
    BeamBlocked { beam: InstanceId, point: Vec3 },

    // ===== stun / flicker =====
    FlickerStarted { owner: FlickerOwner },
    FlickerEnded { owner: FlickerOwner },
    StunStarted { entity: EntityId },
    StunEnded { entity: EntityId },
    AnimationRequested {
        entity: EntityId,
        animation: AnimationTag,
        duration: f32,
    },
}

impl CombatEvent {
    /// Stable snake_case name of the notification, for logs and routing.
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// Receiver of combat notifications.
pub trait NotificationSink {
    fn notify(&mut self, event: CombatEvent);
}

/// Collects notifications in emission order. Used by tests and replay tools.
impl NotificationSink for Vec<CombatEvent> {
    fn notify(&mut self, event: CombatEvent) {
        self.push(event);
    }
}

/// Sink that forwards every notification to `tracing` at trace level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TraceSink;

impl NotificationSink for TraceSink {
    fn notify(&mut self, event: CombatEvent) {
        tracing::trace!(target: "combat::events", event = event.name(), ?event);
    }
}
