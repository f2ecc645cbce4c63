//! Reference environment for the combat core.
//!
//! Actors live in an [`ActorRegistry`] (the health gateway), their colliders
//! in a [`SphereScene`] (the collision source), and pooled projectiles and
//! beams draw ids from an [`ObjectPool`].

mod body;
mod pool;
mod registry;
mod scene;

pub use body::SimBody;
pub use pool::ObjectPool;
pub use registry::{Actor, ActorRegistry, HealthLost};
pub use scene::{SphereCollider, SphereScene};

use combat_core::{
    DamageContext, DamageResolver, EntityId, HealthGateway, HitStunApplier, StunContext,
};
use glam::Vec3;

use crate::events::BusSink;

/// Shared state the damage and stun paths operate on.
#[derive(Debug)]
pub struct World {
    pub resolver: DamageResolver,
    pub registry: ActorRegistry,
    pub scene: SphereScene,
    pub sink: BusSink,
}

impl World {
    pub fn damage_context(&mut self) -> DamageContext<'_> {
        DamageContext {
            resolver: &mut self.resolver,
            health: &mut self.registry,
            physics: &self.scene,
            sink: &mut self.sink,
        }
    }

    /// Runs a projectile's stun attachment against the struck actor.
    pub fn apply_stun(
        &mut self,
        now: f64,
        applier: &HitStunApplier,
        entity: EntityId,
        point: Vec3,
    ) -> bool {
        let view = self.registry.health(entity);
        let Some(actor) = self.registry.get_mut(entity) else {
            return false;
        };
        let Actor { body, stun, .. } = actor;
        let mut ctx = StunContext::new(body, &mut self.sink);
        applier.apply(now, view, stun.as_mut(), point, &mut ctx)
    }

    /// Hands pending health losses to the owners' stun controllers.
    pub fn route_health_lost(&mut self, now: f64, hit_point: Option<Vec3>) {
        for lost in self.registry.drain_health_lost() {
            let Some(actor) = self.registry.get_mut(lost.entity) else {
                continue;
            };
            let view = actor.view(now);
            let Actor { body, stun, .. } = actor;
            if let Some(stun) = stun.as_mut() {
                let mut ctx = StunContext::new(body, &mut self.sink);
                stun.handle_health_lost(now, view, hit_point, &mut ctx);
            }
        }
    }

    /// Advances every stun controller.
    pub fn tick_stuns(&mut self, now: f64) {
        let sink = &mut self.sink;
        for actor in self.registry.iter_mut() {
            let dead = actor.dead;
            let Actor { body, stun, .. } = actor;
            if let Some(stun) = stun.as_mut() {
                let mut ctx = StunContext::new(body, &mut *sink);
                stun.tick(now, dead, &mut ctx);
            }
        }
    }

    /// Moves dynamic bodies and keeps their colliders in step.
    pub fn integrate_bodies(&mut self, delta: f32, gravity: f32) {
        for actor in self.registry.iter_mut() {
            actor.body.integrate(delta, gravity);
            self.scene.move_to(actor.collider, actor.body.position);
        }
    }
}
