//! Collision source consumed as a black box.

use glam::Vec3;

use crate::types::{ColliderHit, LayerMask};

/// Physics query surface used by beams and line-of-sight checks.
///
/// Hit order is unspecified; callers that need distance order sort with
/// [`sort_hits_by_distance`](crate::types::sort_hits_by_distance).
pub trait CollisionSource {
    /// Every collider on a layer in `mask` intersected by the ray from
    /// `origin` along the unit vector `direction`, up to `max_distance`.
    fn raycast_all(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Vec<ColliderHit>;

    /// Nearest hit along the ray, if any.
    fn raycast_nearest(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<ColliderHit> {
        self.raycast_all(origin, direction, max_distance, mask)
            .into_iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// Collision source with no colliders.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyScene;

impl CollisionSource for EmptyScene {
    fn raycast_all(&self, _: Vec3, _: Vec3, _: f32, _: LayerMask) -> Vec<ColliderHit> {
        Vec::new()
    }
}
