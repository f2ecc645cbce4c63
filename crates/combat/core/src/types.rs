//! Identifiers, layers and collision records shared by every combat component.

use std::fmt;

use glam::Vec3;

/// Unique identifier for an actor (anything that can own health or a stun status).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a physics collider as reported by the collision source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColliderId(pub u32);

impl fmt::Display for ColliderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collider:{}", self.0)
    }
}

/// Identifier of a pooled instance (projectile or beam).
///
/// The id survives pool round trips: the pool hands the same id back out on
/// reactivation, so anything keyed by it must be reset on activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceId(pub u32);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance:{}", self.0)
    }
}

// ============================================================================
// Layers
// ============================================================================

/// Physics layer index (0..32).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Layer(pub u8);

impl Layer {
    /// Number of addressable layers.
    pub const COUNT: u8 = 32;

    /// Returns the single-bit mask for this layer, or an empty mask when the
    /// index is out of range.
    #[inline]
    pub const fn mask(self) -> LayerMask {
        if self.0 < Self::COUNT {
            LayerMask(1 << self.0)
        } else {
            LayerMask::NONE
        }
    }
}

/// Set of physics layers, one bit per layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);

    /// Builds a mask from a list of layers.
    pub fn from_layers(layers: &[Layer]) -> Self {
        layers
            .iter()
            .fold(Self::NONE, |mask, layer| mask.union(layer.mask()))
    }

    #[inline]
    pub const fn contains(self, layer: Layer) -> bool {
        self.0 & layer.mask().0 != 0
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for LayerMask {
    type Output = LayerMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

// ============================================================================
// Collision Records
// ============================================================================

/// A single hit record delivered by the collision source.
///
/// Ray queries fill `distance` with the distance from the ray origin; trigger
/// events report `0.0` and use `point` as the closest contact point.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColliderHit {
    pub collider: ColliderId,
    /// Actor that owns the collider, if the collider belongs to one.
    pub entity: Option<EntityId>,
    pub layer: Layer,
    pub distance: f32,
    pub point: Vec3,
}

impl ColliderHit {
    pub fn new(collider: ColliderId, layer: Layer, distance: f32, point: Vec3) -> Self {
        Self {
            collider,
            entity: None,
            layer,
            distance,
            point,
        }
    }

    /// Attaches the owning actor (builder pattern).
    #[must_use]
    pub fn with_entity(mut self, entity: EntityId) -> Self {
        self.entity = Some(entity);
        self
    }
}

/// Sorts hits ascending by distance.
///
/// The sort is stable, so hits at equal distances keep the order in which the
/// collision source reported them.
pub fn sort_hits_by_distance(hits: &mut [ColliderHit]) {
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
}

// ============================================================================
// Time
// ============================================================================

/// Clock values for one simulation frame.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds since the simulation started, sampled at the end of this frame.
    pub now: f64,
    /// Seconds elapsed since the previous frame.
    pub delta: f32,
}

impl FrameTime {
    pub const fn new(now: f64, delta: f32) -> Self {
        Self { now, delta }
    }

    /// Returns the next frame after advancing by `delta` seconds.
    pub fn advance(self, delta: f32) -> Self {
        Self {
            now: self.now + f64::from(delta),
            delta,
        }
    }
}
