//! Health/actor gateway: the combat core's only window onto actor state.

use crate::damage::WeaknessImmunityProfile;
use crate::types::EntityId;

/// Read-only view of a target's health component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthView {
    pub is_dead: bool,
    /// True while the target's health is disabled (invincibility window).
    pub is_invincible: bool,
}

impl HealthView {
    pub const ALIVE: Self = Self {
        is_dead: false,
        is_invincible: false,
    };

    pub const fn is_alive(&self) -> bool {
        !self.is_dead
    }
}

/// Instruction sent to the gateway to mutate a target's health.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HealthChange {
    /// Subtract `amount` (negative amounts heal).
    Delta {
        amount: i32,
        source: Option<EntityId>,
        honor_invincibility: bool,
    },
    /// Kill the target regardless of remaining health.
    Kill { source: Option<EntityId> },
}

/// Combat stats of an actor.
///
/// Consumed by the stat-scaling extension point of the damage resolver,
/// which currently leaves the multiplier at 1.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatsView {
    pub power: f32,
    pub defense: f32,
    pub magic_power: f32,
    pub magic_defense: f32,
}

/// Allegiance used by the friendly-fire rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Allegiance(pub u16);

/// Actor lookup and health mutation.
///
/// Implementations resolve everything by [`EntityId`]; a missing entry means
/// "this actor has no such component", which callers treat as a silent no-op.
pub trait HealthGateway {
    /// Health view of `target`, or `None` when it has no health component.
    fn health(&self, target: EntityId) -> Option<HealthView>;

    /// Applies a health change instruction to `target`.
    fn apply(&mut self, target: EntityId, change: HealthChange);

    /// Combat stats of `entity`, if it has any.
    fn stats(&self, _entity: EntityId) -> Option<StatsView> {
        None
    }

    /// Weakness/immunity profile attached to `target`.
    fn weakness_profile(&self, _target: EntityId) -> Option<&WeaknessImmunityProfile> {
        None
    }

    /// Allegiance of `entity`, used by the friendly-fire rule.
    fn allegiance(&self, _entity: EntityId) -> Option<Allegiance> {
        None
    }
}
