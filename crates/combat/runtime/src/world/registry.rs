use combat_core::{
    Allegiance, ColliderId, EntityId, HealthChange, HealthGateway, HealthView, HitStunController,
    StatsView, WeaknessImmunityProfile,
};

use super::body::SimBody;

/// Health lost by an actor, waiting to be routed to its stun controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealthLost {
    pub entity: EntityId,
    pub amount: i32,
    pub source: Option<EntityId>,
}

/// Everything the runtime tracks for one actor.
#[derive(Debug)]
pub struct Actor {
    pub id: EntityId,
    pub name: String,
    pub max_health: i32,
    pub health: i32,
    pub dead: bool,
    /// Seconds of invincibility granted after each damaging hit.
    pub invincibility_window: f32,
    pub invincible_until: f64,
    pub allegiance: Option<Allegiance>,
    pub stats: Option<StatsView>,
    pub weakness: Option<WeaknessImmunityProfile>,
    pub collider: ColliderId,
    pub radius: f32,
    pub body: SimBody,
    pub stun: Option<HitStunController>,
}

impl Actor {
    pub fn view(&self, now: f64) -> HealthView {
        HealthView {
            is_dead: self.dead,
            is_invincible: !self.dead && now < self.invincible_until,
        }
    }
}

/// In-memory actor store backing the health gateway.
#[derive(Debug, Default)]
pub struct ActorRegistry {
    actors: Vec<Actor>,
    now: f64,
    lost: Vec<HealthLost>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock used for invincibility windows.
    pub fn set_time(&mut self, now: f64) {
        self.now = now;
    }

    pub fn insert(&mut self, actor: Actor) {
        self.actors.push(actor);
    }

    pub fn next_id(&self) -> EntityId {
        EntityId(self.actors.len() as u32 + 1)
    }

    pub fn get(&self, id: EntityId) -> Option<&Actor> {
        self.actors.iter().find(|actor| actor.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|actor| actor.id == id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Actor> {
        self.actors.iter().find(|actor| actor.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.actors.iter_mut()
    }

    /// Health-lost records accumulated since the last drain.
    pub fn drain_health_lost(&mut self) -> Vec<HealthLost> {
        std::mem::take(&mut self.lost)
    }

    fn apply_delta(
        &mut self,
        target: EntityId,
        amount: i32,
        source: Option<EntityId>,
        honor: bool,
    ) {
        let now = self.now;
        let Some(actor) = self.get_mut(target) else {
            return;
        };
        if actor.dead || (honor && actor.view(now).is_invincible) {
            return;
        }

        let before = actor.health;
        actor.health = (actor.health - amount).min(actor.max_health);
        if actor.health <= 0 {
            actor.health = 0;
            actor.dead = true;
            tracing::debug!(target: "runtime::world", actor = %actor.name, ?source, "died");
        }
        let lost = before - actor.health;
        if lost <= 0 {
            return;
        }
        if actor.invincibility_window > 0.0 {
            actor.invincible_until = now + f64::from(actor.invincibility_window);
        }
        tracing::debug!(
            target: "runtime::world",
            actor = %actor.name,
            lost,
            health = actor.health,
            "health lost"
        );
        self.lost.push(HealthLost {
            entity: target,
            amount: lost,
            source,
        });
    }
}

impl HealthGateway for ActorRegistry {
    fn health(&self, target: EntityId) -> Option<HealthView> {
        self.get(target).map(|actor| actor.view(self.now))
    }

    fn apply(&mut self, target: EntityId, change: HealthChange) {
        match change {
            HealthChange::Delta {
                amount,
                source,
                honor_invincibility,
            } => self.apply_delta(target, amount, source, honor_invincibility),
            HealthChange::Kill { source } => {
                if let Some(actor) = self.get_mut(target) {
                    if !actor.dead {
                        actor.health = 0;
                        actor.dead = true;
                        tracing::debug!(
                            target: "runtime::world",
                            actor = %actor.name,
                            ?source,
                            "killed"
                        );
                    }
                }
            }
        }
    }

    fn stats(&self, entity: EntityId) -> Option<StatsView> {
        self.get(entity).and_then(|actor| actor.stats)
    }

    fn weakness_profile(&self, target: EntityId) -> Option<&WeaknessImmunityProfile> {
        self.get(target).and_then(|actor| actor.weakness.as_ref())
    }

    fn allegiance(&self, entity: EntityId) -> Option<Allegiance> {
        self.get(entity).and_then(|actor| actor.allegiance)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn actor(id: u32, health: i32) -> Actor {
        Actor {
            id: EntityId(id),
            name: format!("actor-{id}"),
            max_health: health,
            health,
            dead: false,
            invincibility_window: 0.5,
            invincible_until: 0.0,
            allegiance: None,
            stats: None,
            weakness: None,
            collider: ColliderId(id),
            radius: 0.5,
            body: SimBody::new(Vec3::ZERO, Vec3::Z),
            stun: None,
        }
    }

    fn hit(amount: i32) -> HealthChange {
        HealthChange::Delta {
            amount,
            source: None,
            honor_invincibility: true,
        }
    }

    #[test]
    fn damage_opens_an_invincibility_window() {
        let mut registry = ActorRegistry::new();
        registry.insert(actor(1, 10));

        registry.apply(EntityId(1), hit(3));
        assert_eq!(registry.get(EntityId(1)).unwrap().health, 7);
        assert!(registry.health(EntityId(1)).unwrap().is_invincible);

        registry.apply(EntityId(1), hit(3));
        assert_eq!(registry.get(EntityId(1)).unwrap().health, 7);

        registry.set_time(0.5);
        registry.apply(EntityId(1), hit(3));
        assert_eq!(registry.get(EntityId(1)).unwrap().health, 4);
        assert_eq!(registry.drain_health_lost().len(), 2);
    }

    #[test]
    fn healing_caps_at_max_and_is_not_a_loss() {
        let mut registry = ActorRegistry::new();
        registry.insert(actor(1, 10));
        registry.apply(EntityId(1), hit(-5));
        assert_eq!(registry.get(EntityId(1)).unwrap().health, 10);
        assert!(registry.drain_health_lost().is_empty());
    }

    #[test]
    fn kill_marks_dead() {
        let mut registry = ActorRegistry::new();
        registry.insert(actor(1, 10));
        registry.apply(EntityId(1), HealthChange::Kill { source: None });
        assert!(registry.health(EntityId(1)).unwrap().is_dead);
    }
}
