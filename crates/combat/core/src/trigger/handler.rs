use glam::Vec3;

use crate::damage::{DamageRequest, DamageResolver};
use crate::env::{CollisionSource, HealthGateway};
use crate::events::{CombatEvent, NotificationSink};
use crate::types::{ColliderHit, EntityId};

use super::config::{DamageHandlerConfig, HandlerFlags, TriggerMode};

/// Collaborators a damage trigger needs for one event.
pub struct DamageContext<'a> {
    pub resolver: &'a mut DamageResolver,
    pub health: &'a mut dyn HealthGateway,
    pub physics: &'a dyn CollisionSource,
    pub sink: &'a mut dyn NotificationSink,
}

/// What a damage trigger did with one collision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Trigger mode does not react to this event kind.
    Ignored,
    /// Line of sight to the target was obstructed.
    Obstructed,
    /// The collider does not belong to an actor.
    InvalidTarget,
    /// Agent and target are allies and friendly fire is off.
    FriendlyFire,
    /// Inside the frequency window of the previous application.
    Throttled,
    /// Damage was resolved. `amount` is `None` when a resolver guard
    /// rejected it (dead, invincible, no health).
    Applied {
        target: EntityId,
        amount: Option<i32>,
        killed: bool,
    },
}

/// Converts trigger events into direct-damage requests.
///
/// The trigger remembers the position it was activated at and uses it as the
/// line-of-sight origin, so a projectile checks the line from its muzzle
/// rather than from where it currently overlaps the target.
#[derive(Clone, Debug, PartialEq)]
pub struct DamageHandler {
    config: DamageHandlerConfig,
    owner: Option<EntityId>,
    origin: Vec3,
    last_applied: Option<f64>,
}

impl DamageHandler {
    pub fn new(config: DamageHandlerConfig, owner: Option<EntityId>) -> Self {
        Self {
            config,
            owner,
            origin: Vec3::ZERO,
            last_applied: None,
        }
    }

    pub fn config(&self) -> &DamageHandlerConfig {
        &self.config
    }

    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    pub fn set_owner(&mut self, owner: Option<EntityId>) {
        self.owner = owner;
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Records the line-of-sight origin and clears the frequency window.
    pub fn activate(&mut self, origin: Vec3) {
        self.origin = origin;
        self.last_applied = None;
    }

    pub fn on_trigger_enter(
        &mut self,
        now: f64,
        hit: &ColliderHit,
        ctx: &mut DamageContext<'_>,
    ) -> TriggerOutcome {
        if !self.config.trigger.contains(TriggerMode::ENTER) {
            return TriggerOutcome::Ignored;
        }
        self.process(now, hit, self.origin, ctx)
    }

    pub fn on_trigger_stay(
        &mut self,
        now: f64,
        hit: &ColliderHit,
        ctx: &mut DamageContext<'_>,
    ) -> TriggerOutcome {
        if !self.config.trigger.contains(TriggerMode::STAY) {
            return TriggerOutcome::Ignored;
        }
        self.process(now, hit, self.origin, ctx)
    }

    /// Applies damage to the actor owning `hit`, checking line of sight from
    /// `from` when configured.
    pub fn process(
        &mut self,
        now: f64,
        hit: &ColliderHit,
        from: Vec3,
        ctx: &mut DamageContext<'_>,
    ) -> TriggerOutcome {
        if self.config.flags.contains(HandlerFlags::CONFIRM_LOS)
            && self.line_obstructed(hit, from, ctx)
        {
            tracing::trace!(
                target: "combat::trigger",
                collider = %hit.collider,
                "line of sight blocked"
            );
            return TriggerOutcome::Obstructed;
        }

        let Some(target) = hit.entity else {
            ctx.sink.notify(CombatEvent::InvalidTarget {
                agent: self.owner,
                collider: hit.collider,
            });
            return TriggerOutcome::InvalidTarget;
        };

        if self.blocked_by_friendly_fire(target, ctx) {
            tracing::trace!(target: "combat::trigger", %target, "friendly fire suppressed");
            return TriggerOutcome::FriendlyFire;
        }

        if self.config.frequency > 0.0 {
            if let Some(last) = self.last_applied {
                if now - last < f64::from(self.config.frequency) {
                    return TriggerOutcome::Throttled;
                }
            }
            self.last_applied = Some(now);
        }

        let was_alive = ctx.health.health(target).is_some_and(|view| view.is_alive());
        let request = DamageRequest::new(target, self.config.min, self.config.max)
            .with_agent(self.owner)
            .with_types(self.config.types.clone())
            .with_honor_invincibility(self.config.honor_invincibility());
        let amount = ctx.resolver.resolve_direct_damage(&mut *ctx.health, &request);
        let killed = was_alive && ctx.health.health(target).is_some_and(|view| view.is_dead);

        if killed {
            ctx.sink.notify(CombatEvent::KilledTarget {
                agent: self.owner,
                target,
            });
        }
        ctx.sink.notify(CombatEvent::Hit {
            agent: self.owner,
            target,
        });
        TriggerOutcome::Applied {
            target,
            amount,
            killed,
        }
    }

    fn line_obstructed(&self, hit: &ColliderHit, from: Vec3, ctx: &DamageContext<'_>) -> bool {
        let to = hit.point + self.config.target_offset;
        let delta = to - from;
        let distance = delta.length();
        let Some(direction) = delta.try_normalize() else {
            return false;
        };
        let fudge = ctx.resolver.config().invincibility_recheck_fudge;
        ctx.physics
            .raycast_nearest(from, direction, distance, self.config.los_mask)
            .is_some_and(|blocker| {
                blocker.collider != hit.collider && blocker.distance < distance - fudge
            })
    }

    fn blocked_by_friendly_fire(&self, target: EntityId, ctx: &DamageContext<'_>) -> bool {
        if ctx.resolver.config().friendly_fire_allowed {
            return false;
        }
        let Some(owner) = self.owner else {
            return false;
        };
        if owner == target {
            return false;
        }
        match (ctx.health.allegiance(owner), ctx.health.allegiance(target)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
