use combat_core::{ColliderHit, ColliderId, CollisionSource, EntityId, Layer, LayerMask};
use glam::Vec3;

/// Sphere collider placed in the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereCollider {
    pub id: ColliderId,
    pub entity: Option<EntityId>,
    pub layer: Layer,
    pub center: Vec3,
    pub radius: f32,
}

/// Collision source made of spheres.
///
/// Actor colliders follow their bodies; the runtime moves them every tick.
/// Static obstacles have no entity.
#[derive(Clone, Debug, Default)]
pub struct SphereScene {
    colliders: Vec<SphereCollider>,
    next_id: u32,
}

impl SphereScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        entity: Option<EntityId>,
        layer: Layer,
        center: Vec3,
        radius: f32,
    ) -> ColliderId {
        let id = ColliderId(self.next_id);
        self.next_id += 1;
        self.colliders.push(SphereCollider {
            id,
            entity,
            layer,
            center,
            radius,
        });
        id
    }

    pub fn get(&self, id: ColliderId) -> Option<&SphereCollider> {
        self.colliders.iter().find(|collider| collider.id == id)
    }

    pub fn move_to(&mut self, id: ColliderId, center: Vec3) {
        if let Some(collider) = self.colliders.iter_mut().find(|collider| collider.id == id) {
            collider.center = center;
        }
    }

    pub fn remove(&mut self, id: ColliderId) {
        self.colliders.retain(|collider| collider.id != id);
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

impl CollisionSource for SphereScene {
    /// A ray starting inside a sphere reports it at distance zero.
    fn raycast_all(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Vec<ColliderHit> {
        let Some(direction) = direction.try_normalize() else {
            return Vec::new();
        };
        self.colliders
            .iter()
            .filter(|collider| mask.contains(collider.layer))
            .filter_map(|collider| {
                let distance = ray_sphere(origin, direction, collider.center, collider.radius)?;
                if distance > max_distance {
                    return None;
                }
                let mut hit = ColliderHit::new(
                    collider.id,
                    collider.layer,
                    distance,
                    origin + direction * distance,
                );
                hit.entity = collider.entity;
                Some(hit)
            })
            .collect()
    }
}

/// Distance along a unit ray to the first intersection with a sphere.
fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let offset = origin - center;
    let c = offset.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    let b = offset.dot(direction);
    if b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    Some(-b - discriminant.sqrt())
}
