use std::fmt;

use glam::Vec3;

use crate::env::InstanceContext;
use crate::error::ContractViolation;
use crate::events::{CombatEvent, FlickerOwner, TerminationReason};
use crate::flicker::{Flicker, FlickerStep};
use crate::timer::TimerQueue;
use crate::types::{ColliderHit, EntityId, InstanceId};

use super::config::{ProjectileConfig, ProjectileFlags};

/// Payload handed to collision callbacks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Strike {
    pub projectile: InstanceId,
    pub source: Option<EntityId>,
    pub hit: ColliderHit,
}

/// Collision callback registered by weapon code.
pub type CollideCallback = Box<dyn FnMut(&Strike)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ProjectilePhase {
    /// In the pool; every entry point except `activate` is a no-op.
    Pooled,
    Active,
    /// Lifetime ran out; the fade flicker is playing.
    Expiring,
}

/// What a trigger-enter event did to the projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionOutcome {
    /// The event was not processed (inactive, flags, self hit, bad payload).
    Skipped,
    /// Penetrate layer hit within the allowance.
    Penetrated { used: u32 },
    /// Ignore layer hit.
    PassedThrough,
    Terminated(TerminationReason),
}

impl CollisionOutcome {
    /// True when strike callbacks ran for this event.
    pub fn struck(&self) -> bool {
        !matches!(self, Self::Skipped)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ProjectileTimer {
    Lifetime,
}

/// Runtime state of one pooled projectile.
///
/// The instance is reset on every [`activate`](Self::activate) and cleared
/// on every deactivation, so nothing carries over between flights except an
/// explicit penetration override (see [`reset_to_default`](Self::reset_to_default)).
pub struct Projectile {
    id: InstanceId,
    config: ProjectileConfig,
    phase: ProjectilePhase,
    penetrations_allowed: u16,
    penetrations_used: u32,
    timeout_started: bool,
    activated_at: f64,
    source: Option<EntityId>,
    heading: Vec3,
    visible: bool,
    timers: TimerQueue<ProjectileTimer>,
    fade: Option<Flicker>,
    strike_callbacks: Vec<CollideCallback>,
    despawn_callbacks: Vec<CollideCallback>,
}

impl Projectile {
    pub fn new(id: InstanceId, config: ProjectileConfig) -> Self {
        Self {
            id,
            penetrations_allowed: config.penetrations,
            fade: config.fade.map(Flicker::new),
            config,
            phase: ProjectilePhase::Pooled,
            penetrations_used: 0,
            timeout_started: false,
            activated_at: 0.0,
            source: None,
            heading: Vec3::Z,
            visible: true,
            timers: TimerQueue::new(),
            strike_callbacks: Vec::new(),
            despawn_callbacks: Vec::new(),
        }
    }

    // ===== accessors =====

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn config(&self) -> &ProjectileConfig {
        &self.config
    }

    pub fn flags(&self) -> ProjectileFlags {
        self.config.flags
    }

    pub fn phase(&self) -> ProjectilePhase {
        self.phase
    }

    /// Active or expiring.
    pub fn is_active(&self) -> bool {
        self.phase != ProjectilePhase::Pooled
    }

    pub fn source(&self) -> Option<EntityId> {
        self.source
    }

    pub fn heading(&self) -> Vec3 {
        self.heading
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn penetrations_used(&self) -> u32 {
        self.penetrations_used
    }

    pub fn penetrations_allowed(&self) -> u16 {
        self.penetrations_allowed
    }

    /// Seconds since the last activation.
    pub fn elapsed(&self, now: f64) -> f64 {
        if self.is_active() {
            now - self.activated_at
        } else {
            0.0
        }
    }

    // ===== lifecycle =====

    /// Takes the projectile out of the pool and starts its lifetime timer.
    pub fn activate(&mut self, now: f64, source: Option<EntityId>, heading: Vec3) {
        self.reset_transient();
        self.penetrations_used = 0;
        self.timeout_started = false;
        self.visible = true;
        self.phase = ProjectilePhase::Active;
        self.activated_at = now;
        self.source = source;
        self.heading = heading.try_normalize().unwrap_or(Vec3::Z);
        self.timers
            .schedule(now + f64::from(self.config.lifetime), ProjectileTimer::Lifetime);
        tracing::trace!(target: "combat::projectile", id = %self.id, ?source, "activated");
    }

    /// Announces the launch.
    pub fn fired(&mut self, ctx: &mut InstanceContext<'_>) {
        if !self.is_active() {
            return;
        }
        ctx.sink.notify(CombatEvent::ProjectileFired {
            projectile: self.id,
            source: self.source,
        });
    }

    /// Drops callbacks and timers and returns to the pooled phase without
    /// notifying anyone. Called by the pool when it disables the instance.
    pub fn deactivate(&mut self) {
        self.reset_transient();
        self.phase = ProjectilePhase::Pooled;
    }

    fn reset_transient(&mut self) {
        self.strike_callbacks.clear();
        self.despawn_callbacks.clear();
        self.timers.clear();
        if let Some(fade) = self.fade.as_mut() {
            fade.cancel();
        }
    }

    fn terminate(&mut self, reason: TerminationReason, ctx: &mut InstanceContext<'_>) {
        tracing::debug!(
            target: "combat::projectile",
            id = %self.id,
            %reason,
            used = self.penetrations_used,
            "terminated"
        );
        ctx.sink.notify(CombatEvent::ProjectileTerminated {
            projectile: self.id,
            reason,
        });
        self.deactivate();
        ctx.pool.relinquish(self.id);
    }

    // ===== callbacks =====

    /// Runs on every processed collision, in registration order.
    pub fn add_strike_callback(&mut self, callback: CollideCallback) {
        self.strike_callbacks.push(callback);
    }

    /// Runs just before a blocking collision despawns the projectile.
    pub fn add_despawn_callback(&mut self, callback: CollideCallback) {
        self.despawn_callbacks.push(callback);
    }

    // ===== collisions =====

    /// Processes a trigger-enter event carrying `hit`.
    ///
    /// A missing collider record is a collision-source contract violation: it
    /// is logged and ignored.
    pub fn on_trigger_enter(
        &mut self,
        hit: Option<&ColliderHit>,
        ctx: &mut InstanceContext<'_>,
    ) -> CollisionOutcome {
        if !self.is_active() || self.config.flags.contains(ProjectileFlags::NO_COLLISION_EVENTS) {
            return CollisionOutcome::Skipped;
        }
        let Some(hit) = hit.copied() else {
            ContractViolation::MissingCollider { instance: self.id }.report();
            return CollisionOutcome::Skipped;
        };
        if self.config.flags.contains(ProjectileFlags::USE_EXTERNAL_CALLBACK) {
            return CollisionOutcome::Skipped;
        }
        if self.config.flags.contains(ProjectileFlags::DISALLOW_SELF_HIT)
            && self.source.is_some()
            && hit.entity == self.source
        {
            tracing::trace!(target: "combat::projectile", id = %self.id, "ignored self hit");
            return CollisionOutcome::Skipped;
        }

        let strike = Strike {
            projectile: self.id,
            source: self.source,
            hit,
        };
        for callback in &mut self.strike_callbacks {
            callback(&strike);
        }
        ctx.sink.notify(CombatEvent::ProjectileCollided {
            projectile: self.id,
            source: self.source,
            hit,
        });

        if self.config.penetrate_layers.contains(hit.layer) {
            self.penetrations_used += 1;
            if self.penetrations_used > u32::from(self.penetrations_allowed) {
                self.terminate(TerminationReason::PenetrationSpent, ctx);
                return CollisionOutcome::Terminated(TerminationReason::PenetrationSpent);
            }
            return CollisionOutcome::Penetrated {
                used: self.penetrations_used,
            };
        }
        if self.config.ignore_layers.contains(hit.layer) {
            return CollisionOutcome::PassedThrough;
        }

        for callback in &mut self.despawn_callbacks {
            callback(&strike);
        }
        self.terminate(TerminationReason::Blocked, ctx);
        CollisionOutcome::Terminated(TerminationReason::Blocked)
    }

    // ===== time =====

    /// Fires due timers and advances the fade flicker.
    pub fn tick(&mut self, now: f64, ctx: &mut InstanceContext<'_>) {
        while let Some((timer, _)) = self.timers.pop_due(now) {
            match timer {
                ProjectileTimer::Lifetime => self.life_timeout(now, ctx),
            }
        }
        if self.phase == ProjectilePhase::Expiring {
            self.advance_fade(now, ctx);
        }
    }

    /// Lifetime expiry. Runs at most once per activation.
    pub fn life_timeout(&mut self, now: f64, ctx: &mut InstanceContext<'_>) {
        if self.timeout_started || !self.is_active() {
            return;
        }
        self.timeout_started = true;
        self.timers.cancel(ProjectileTimer::Lifetime);

        match self.fade.as_mut() {
            None => self.terminate(TerminationReason::Expired, ctx),
            Some(fade) => {
                fade.start(now);
                self.phase = ProjectilePhase::Expiring;
                ctx.sink.notify(CombatEvent::FlickerStarted {
                    owner: FlickerOwner::Projectile(self.id),
                });
                self.advance_fade(now, ctx);
            }
        }
    }

    fn advance_fade(&mut self, now: f64, ctx: &mut InstanceContext<'_>) {
        let Some(fade) = self.fade.as_mut() else {
            return;
        };
        loop {
            match fade.poll(now, false) {
                FlickerStep::Toggle => self.visible = !self.visible,
                FlickerStep::Finished => {
                    ctx.sink.notify(CombatEvent::FlickerEnded {
                        owner: FlickerOwner::Projectile(self.id),
                    });
                    self.terminate(TerminationReason::Expired, ctx);
                    return;
                }
                FlickerStep::Idle | FlickerStep::Waiting => return,
            }
        }
    }

    /// Explicit kill from weapon code. No-op when not active.
    pub fn kill(&mut self, ctx: &mut InstanceContext<'_>) {
        if self.is_active() {
            self.terminate(TerminationReason::Killed, ctx);
        }
    }

    /// Left the view. Kills when `DISABLE_ON_CULL` is set.
    pub fn on_culled(&mut self, ctx: &mut InstanceContext<'_>) {
        if self.config.flags.contains(ProjectileFlags::DISABLE_ON_CULL) {
            self.kill(ctx);
        }
    }

    /// Parent was disabled. Kills when `DESTROY_WITH_PARENT` is set.
    pub fn on_parent_disabled(&mut self, ctx: &mut InstanceContext<'_>) {
        if self.config.flags.contains(ProjectileFlags::DESTROY_WITH_PARENT) {
            self.kill(ctx);
        }
    }

    // ===== weapon tuning =====

    /// Changes the heading when `ADJUSTABLE_HEADING` is set. Returns whether
    /// the change was accepted.
    pub fn set_heading(&mut self, heading: Vec3) -> bool {
        if !self.config.flags.contains(ProjectileFlags::ADJUSTABLE_HEADING) {
            return false;
        }
        match heading.try_normalize() {
            Some(dir) => {
                self.heading = dir;
                true
            }
            None => false,
        }
    }

    /// Overrides the penetration allowance until [`reset_to_default`](Self::reset_to_default).
    pub fn set_penetrations(&mut self, allowed: u16) {
        self.penetrations_allowed = allowed;
    }

    /// Restores the configured penetration allowance.
    pub fn reset_to_default(&mut self) {
        self.penetrations_allowed = self.config.penetrations;
    }
}

impl fmt::Debug for Projectile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projectile")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("penetrations_used", &self.penetrations_used)
            .field("penetrations_allowed", &self.penetrations_allowed)
            .field("source", &self.source)
            .field("strike_callbacks", &self.strike_callbacks.len())
            .field("despawn_callbacks", &self.despawn_callbacks.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::events::CombatEvent;
    use crate::flicker::FlickerConfig;
    use crate::types::{ColliderId, Layer, LayerMask};

    const ID: InstanceId = InstanceId(7);
    const SHOOTER: EntityId = EntityId(1);
    const WALL: Layer = Layer(1);
    const ENEMY: Layer = Layer(2);
    const GHOST: Layer = Layer(3);

    #[derive(Default)]
    struct Harness {
        events: Vec<CombatEvent>,
        returned: Vec<InstanceId>,
    }

    impl Harness {
        fn ctx(&mut self) -> InstanceContext<'_> {
            InstanceContext::new(&mut self.events, &mut self.returned)
        }

        fn terminated(&self) -> Vec<TerminationReason> {
            self.events
                .iter()
                .filter_map(|event| match event {
                    CombatEvent::ProjectileTerminated { reason, .. } => Some(*reason),
                    _ => None,
                })
                .collect()
        }
    }

    fn hit(layer: Layer) -> ColliderHit {
        ColliderHit::new(ColliderId(9), layer, 0.0, Vec3::ZERO).with_entity(EntityId(5))
    }

    fn piercing(allowance: u16) -> Projectile {
        let config = ProjectileConfig::default()
            .with_penetration(allowance, ENEMY.mask())
            .with_ignore_layers(GHOST.mask());
        let mut projectile = Projectile::new(ID, config);
        projectile.activate(0.0, Some(SHOOTER), Vec3::X);
        projectile
    }

    #[test]
    fn penetration_allowance_is_honored() {
        let mut harness = Harness::default();
        let mut projectile = piercing(1);

        let first = projectile.on_trigger_enter(Some(&hit(ENEMY)), &mut harness.ctx());
        assert_eq!(first, CollisionOutcome::Penetrated { used: 1 });
        assert!(projectile.is_active());
        assert!(harness.returned.is_empty());

        let second = projectile.on_trigger_enter(Some(&hit(ENEMY)), &mut harness.ctx());
        assert_eq!(
            second,
            CollisionOutcome::Terminated(TerminationReason::PenetrationSpent)
        );
        assert_eq!(harness.returned, vec![ID]);
        assert_eq!(projectile.phase(), ProjectilePhase::Pooled);
    }

    #[test]
    fn ignore_layers_never_count() {
        let mut harness = Harness::default();
        let mut projectile = piercing(0);
        for _ in 0..5 {
            let outcome = projectile.on_trigger_enter(Some(&hit(GHOST)), &mut harness.ctx());
            assert_eq!(outcome, CollisionOutcome::PassedThrough);
        }
        assert_eq!(projectile.penetrations_used(), 0);
        assert!(projectile.is_active());
        assert!(harness.terminated().is_empty());
    }

    #[test]
    fn blocking_hit_runs_callbacks_in_order_then_terminates() {
        let mut harness = Harness::default();
        let mut projectile = piercing(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in ["strike-a", "strike-b"] {
            let log = Rc::clone(&log);
            projectile.add_strike_callback(Box::new(move |_| log.borrow_mut().push(name)));
        }
        let despawn_log = Rc::clone(&log);
        projectile.add_despawn_callback(Box::new(move |strike| {
            assert_eq!(strike.source, Some(SHOOTER));
            despawn_log.borrow_mut().push("despawn");
        }));

        let outcome = projectile.on_trigger_enter(Some(&hit(WALL)), &mut harness.ctx());
        assert_eq!(outcome, CollisionOutcome::Terminated(TerminationReason::Blocked));
        assert_eq!(*log.borrow(), vec!["strike-a", "strike-b", "despawn"]);
        assert!(matches!(
            harness.events[0],
            CombatEvent::ProjectileCollided { projectile: ID, .. }
        ));
        assert_eq!(harness.terminated(), vec![TerminationReason::Blocked]);
    }

    #[test]
    fn callbacks_do_not_survive_a_pool_round_trip() {
        let mut harness = Harness::default();
        let mut projectile = piercing(1);
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        projectile.add_strike_callback(Box::new(move |_| *counter.borrow_mut() += 1));

        projectile.kill(&mut harness.ctx());
        projectile.activate(1.0, Some(SHOOTER), Vec3::X);
        projectile.on_trigger_enter(Some(&hit(ENEMY)), &mut harness.ctx());
        assert_eq!(*count.borrow(), 0);
        assert_eq!(projectile.penetrations_used(), 1);
    }

    #[test]
    fn blocking_hit_terminates_without_self_destruct() {
        let mut harness = Harness::default();
        let config = ProjectileConfig::default().with_flags(ProjectileFlags::ADJUSTABLE_HEADING);
        let mut projectile = Projectile::new(ID, config);
        projectile.activate(0.0, None, Vec3::X);
        let despawned = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&despawned);
        projectile.add_despawn_callback(Box::new(move |_| *counter.borrow_mut() += 1));

        let outcome = projectile.on_trigger_enter(Some(&hit(WALL)), &mut harness.ctx());

        assert_eq!(outcome, CollisionOutcome::Terminated(TerminationReason::Blocked));
        assert_eq!(*despawned.borrow(), 1);
        assert!(!projectile.is_active());
        assert_eq!(harness.returned, vec![ID]);
    }

    #[test]
    fn default_flags_blocking_hit_returns_to_pool() {
        let mut harness = Harness::default();
        let mut projectile = Projectile::new(ID, ProjectileConfig::default());
        projectile.activate(0.0, Some(SHOOTER), Vec3::X);
        let despawned = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&despawned);
        projectile.add_despawn_callback(Box::new(move |strike| {
            log.borrow_mut().push(strike.hit.layer);
        }));

        let outcome = projectile.on_trigger_enter(Some(&hit(WALL)), &mut harness.ctx());

        assert_eq!(outcome, CollisionOutcome::Terminated(TerminationReason::Blocked));
        assert_eq!(*despawned.borrow(), vec![WALL]);
        assert_eq!(harness.returned, vec![ID]);
        assert_eq!(harness.terminated(), vec![TerminationReason::Blocked]);
        assert_eq!(projectile.phase(), ProjectilePhase::Pooled);
    }

    #[test]
    fn collision_while_fading_ends_the_fade_early() {
        let mut harness = Harness::default();
        let fade = FlickerConfig {
            time: 0.5,
            rate: 0.25,
            once: false,
        };
        let config = ProjectileConfig::default().with_lifetime(1.0).with_fade(fade);
        let mut projectile = Projectile::new(ID, config);
        projectile.activate(0.0, None, Vec3::X);
        projectile.tick(1.0, &mut harness.ctx());
        assert_eq!(projectile.phase(), ProjectilePhase::Expiring);

        let outcome = projectile.on_trigger_enter(Some(&hit(WALL)), &mut harness.ctx());
        assert_eq!(outcome, CollisionOutcome::Terminated(TerminationReason::Blocked));
        assert_eq!(harness.returned, vec![ID]);
        assert!(!projectile.is_active());

        // The cancelled fade neither finishes nor returns the instance twice.
        projectile.tick(2.0, &mut harness.ctx());
        assert_eq!(harness.returned, vec![ID]);
        assert_eq!(harness.terminated(), vec![TerminationReason::Blocked]);
        assert!(!harness.events.iter().any(|event| matches!(
            event,
            CombatEvent::FlickerEnded {
                owner: FlickerOwner::Projectile(ID)
            }
        )));
    }

    #[test]
    fn self_hits_and_missing_colliders_are_skipped() {
        let mut harness = Harness::default();
        let config = ProjectileConfig::default()
            .with_flags(ProjectileFlags::default() | ProjectileFlags::DISALLOW_SELF_HIT);
        let mut projectile = Projectile::new(ID, config);
        projectile.activate(0.0, Some(SHOOTER), Vec3::X);

        let own = hit(WALL).with_entity(SHOOTER);
        assert_eq!(
            projectile.on_trigger_enter(Some(&own), &mut harness.ctx()),
            CollisionOutcome::Skipped
        );
        assert_eq!(
            projectile.on_trigger_enter(None, &mut harness.ctx()),
            CollisionOutcome::Skipped
        );
        assert!(harness.events.is_empty());
        assert!(projectile.is_active());
    }

    #[test]
    fn lifetime_expiry_returns_to_pool_once() {
        let mut harness = Harness::default();
        let mut projectile = Projectile::new(ID, ProjectileConfig::default().with_lifetime(2.0));
        projectile.activate(0.0, None, Vec3::X);

        projectile.tick(1.0, &mut harness.ctx());
        assert!(projectile.is_active());
        projectile.tick(2.0, &mut harness.ctx());
        assert!(!projectile.is_active());
        projectile.life_timeout(2.5, &mut harness.ctx());
        assert_eq!(harness.returned, vec![ID]);
        assert_eq!(harness.terminated(), vec![TerminationReason::Expired]);
    }

    #[test]
    fn fade_flicker_delays_the_pool_return() {
        let mut harness = Harness::default();
        let fade = FlickerConfig {
            time: 0.5,
            rate: 0.25,
            once: false,
        };
        let config = ProjectileConfig::default().with_lifetime(1.0).with_fade(fade);
        let mut projectile = Projectile::new(ID, config);
        projectile.activate(0.0, None, Vec3::X);

        projectile.tick(1.0, &mut harness.ctx());
        assert_eq!(projectile.phase(), ProjectilePhase::Expiring);
        assert!(!projectile.is_visible());
        projectile.tick(1.25, &mut harness.ctx());
        assert!(projectile.is_visible());
        assert!(harness.returned.is_empty());

        projectile.tick(1.5, &mut harness.ctx());
        assert_eq!(harness.returned, vec![ID]);
        assert!(harness.events.iter().any(|event| matches!(
            event,
            CombatEvent::FlickerEnded {
                owner: FlickerOwner::Projectile(ID)
            }
        )));
    }

    #[test]
    fn kill_is_a_no_op_when_pooled() {
        let mut harness = Harness::default();
        let mut projectile = Projectile::new(ID, ProjectileConfig::default());
        projectile.kill(&mut harness.ctx());
        projectile.fired(&mut harness.ctx());
        assert!(harness.events.is_empty());
        assert!(harness.returned.is_empty());
    }

    #[test]
    fn penetration_override_resets_to_config() {
        let mut projectile = piercing(1);
        projectile.set_penetrations(4);
        assert_eq!(projectile.penetrations_allowed(), 4);
        projectile.reset_to_default();
        assert_eq!(projectile.penetrations_allowed(), 1);
    }

    #[test]
    fn heading_changes_require_the_flag() {
        let mut projectile = piercing(0);
        assert!(projectile.set_heading(Vec3::new(0.0, 0.0, 2.0)));
        assert_eq!(projectile.heading(), Vec3::Z);

        let config = ProjectileConfig::default().with_flags(ProjectileFlags::SELF_DESTRUCT);
        let mut fixed = Projectile::new(ID, config);
        fixed.activate(0.0, None, Vec3::X);
        assert!(!fixed.set_heading(Vec3::Y));
        assert_eq!(fixed.heading(), Vec3::X);
    }

    #[test]
    fn cull_and_parent_flags_gate_kills() {
        let mut harness = Harness::default();
        let mut projectile = piercing(0);
        projectile.on_culled(&mut harness.ctx());
        assert!(projectile.is_active());
        projectile.on_parent_disabled(&mut harness.ctx());
        assert!(!projectile.is_active());
        assert_eq!(harness.terminated(), vec![TerminationReason::Killed]);
    }
}
