use glam::Vec3;

use crate::env::{ActorBody, HealthView};
use crate::events::{CombatEvent, FlickerOwner, NotificationSink};
use crate::flicker::{Flicker, FlickerStep, Visuals};
use crate::timer::TimerQueue;
use crate::types::EntityId;

use super::config::{EffectiveStun, KnockbackMode, StunConfig, StunOverride};

/// Body and notification handles for one stun call.
pub struct StunContext<'a> {
    pub body: &'a mut dyn ActorBody,
    pub sink: &'a mut dyn NotificationSink,
}

impl<'a> StunContext<'a> {
    pub fn new(body: &'a mut dyn ActorBody, sink: &'a mut dyn NotificationSink) -> Self {
        Self { body, sink }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StunTimer {
    ResetInput,
}

/// Hit-stun, knockback and flicker state of one actor.
///
/// One effect runs at a time: `begin_*` calls made while an effect is
/// flickering are ignored. Input recovery is a separate deadline that may
/// outlive the flicker.
#[derive(Clone, Debug)]
pub struct HitStunController {
    owner: EntityId,
    config: StunConfig,
    visuals: Visuals,
    enabled: bool,
    effect_running: bool,
    flicker: Flicker,
    stun_pending: bool,
    saved_gravity: bool,
    timers: TimerQueue<StunTimer>,
}

impl HitStunController {
    pub fn new(owner: EntityId, config: StunConfig, visuals: Visuals) -> Self {
        Self {
            owner,
            flicker: Flicker::new(config.flicker),
            config,
            visuals,
            enabled: true,
            effect_running: false,
            stun_pending: false,
            saved_gravity: true,
            timers: TimerQueue::new(),
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn config(&self) -> &StunConfig {
        &self.config
    }

    pub fn visuals(&self) -> &Visuals {
        &self.visuals
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// True while an effect holds the single effect slot.
    pub fn is_effect_running(&self) -> bool {
        self.effect_running
    }

    /// True between a knockback and its input recovery.
    pub fn is_stunned(&self) -> bool {
        self.stun_pending
    }

    /// Flicker only: no knockback, no animation.
    pub fn begin_flicker_effect(
        &mut self,
        now: f64,
        target: HealthView,
        ctx: &mut StunContext<'_>,
    ) -> bool {
        self.begin_effect(now, target, false, false, Vec3::ZERO, None, ctx)
    }

    /// Knockback, animation and flicker using the base parameters.
    pub fn begin_damage_effect(
        &mut self,
        now: f64,
        target: HealthView,
        hit_point: Vec3,
        ctx: &mut StunContext<'_>,
    ) -> bool {
        self.begin_effect(now, target, true, true, hit_point, None, ctx)
    }

    /// Knockback, animation and flicker with `overrides` merged over the base
    /// parameters for this invocation only.
    pub fn begin_damage_effect_with(
        &mut self,
        now: f64,
        target: HealthView,
        hit_point: Vec3,
        overrides: &StunOverride,
        ctx: &mut StunContext<'_>,
    ) -> bool {
        self.begin_effect(now, target, true, true, hit_point, Some(overrides), ctx)
    }

    /// Reaction to a "health lost" notification for the owner.
    pub fn handle_health_lost(
        &mut self,
        now: f64,
        target: HealthView,
        hit_point: Option<Vec3>,
        ctx: &mut StunContext<'_>,
    ) -> bool {
        if target.is_dead {
            return false;
        }
        self.begin_damage_effect(now, target, hit_point.unwrap_or(Vec3::ZERO), ctx)
    }

    /// Starts an effect. Returns false when the slot is taken or the
    /// controller is disabled.
    #[allow(clippy::too_many_arguments)]
    pub fn begin_effect(
        &mut self,
        now: f64,
        target: HealthView,
        include_knockback: bool,
        include_animation: bool,
        hit_point: Vec3,
        overrides: Option<&StunOverride>,
        ctx: &mut StunContext<'_>,
    ) -> bool {
        if self.effect_running || !self.enabled {
            tracing::trace!(target: "combat::stun", owner = %self.owner, "effect slot busy");
            return false;
        }
        self.effect_running = true;
        let effective = self.config.effective(overrides);

        if include_knockback && effective.stun_time > 0.0 {
            self.start_stun(now, &effective, hit_point, ctx);
        }

        ctx.sink.notify(CombatEvent::FlickerStarted {
            owner: FlickerOwner::Actor(self.owner),
        });

        if include_animation
            && effective.animation_time > 0.0
            && (self.config.play_anim_if_dead || target.is_alive())
        {
            ctx.sink.notify(CombatEvent::AnimationRequested {
                entity: self.owner,
                animation: effective.animation.clone(),
                duration: effective.animation_time,
            });
        }

        self.flicker.start(now);
        self.advance_flicker(now, target.is_dead, ctx.sink);
        true
    }

    fn start_stun(
        &mut self,
        now: f64,
        effective: &EffectiveStun,
        hit_point: Vec3,
        ctx: &mut StunContext<'_>,
    ) {
        // A recovery still pending from an earlier hit already saved the real gravity.
        if !self.stun_pending {
            self.saved_gravity = ctx.body.uses_gravity();
        }
        self.stun_pending = true;
        ctx.sink.notify(CombatEvent::StunStarted { entity: self.owner });
        ctx.body.set_input_enabled(false);

        if effective.knockback_force.length_squared() > 0.0 {
            let position = ctx.body.position();
            let axis = match self.config.knockback_mode {
                KnockbackMode::DirectionOfFacing => ctx.body.forward(),
                KnockbackMode::DirectionOfHit => {
                    (hit_point - position).normalize_or_zero() * self.config.direction_scaling
                }
            };
            let velocity = knockback_velocity(axis, effective.knockback_force);
            ctx.body.set_mover_enabled(false);
            ctx.body.set_controller_enabled(false);
            ctx.body.set_kinematic(false);
            ctx.body.set_uses_gravity(true);
            ctx.body.apply_velocity_change(velocity);
            tracing::debug!(target: "combat::stun", owner = %self.owner, ?velocity, "knockback");
        }

        self.timers
            .reschedule(now + f64::from(effective.stun_time), StunTimer::ResetInput);
    }

    /// Fires due timers and advances the flicker.
    pub fn tick(&mut self, now: f64, target_dead: bool, ctx: &mut StunContext<'_>) {
        while let Some((timer, _)) = self.timers.pop_due(now) {
            match timer {
                StunTimer::ResetInput => self.reset_input(ctx),
            }
        }
        self.advance_flicker(now, target_dead, ctx.sink);
    }

    fn advance_flicker(&mut self, now: f64, target_dead: bool, sink: &mut dyn NotificationSink) {
        loop {
            match self.flicker.poll(now, target_dead) {
                FlickerStep::Toggle => self.visuals.toggle(),
                FlickerStep::Finished => {
                    sink.notify(CombatEvent::FlickerEnded {
                        owner: FlickerOwner::Actor(self.owner),
                    });
                    self.visuals.restore_defaults();
                    self.effect_running = false;
                    return;
                }
                FlickerStep::Idle | FlickerStep::Waiting => return,
            }
        }
    }

    /// Ends the stun: body back to kinematic with its saved gravity, movement
    /// and input re-enabled. No-op when no stun is pending.
    pub fn reset_input(&mut self, ctx: &mut StunContext<'_>) {
        if !self.stun_pending {
            return;
        }
        self.stun_pending = false;
        self.timers.cancel(StunTimer::ResetInput);
        ctx.body.set_kinematic(true);
        ctx.body.set_uses_gravity(self.saved_gravity);
        ctx.body.set_mover_enabled(true);
        ctx.body.set_controller_enabled(true);
        ctx.body.set_input_enabled(true);
        ctx.sink.notify(CombatEvent::StunEnded { entity: self.owner });
    }

    /// Cancels every timer, restores default visibility and releases the
    /// effect slot. A pending stun is recovered immediately so the actor is
    /// never left without input.
    pub fn disable(&mut self, ctx: &mut StunContext<'_>) {
        self.enabled = false;
        self.flicker.cancel();
        self.timers.clear();
        self.visuals.restore_defaults();
        self.effect_running = false;
        self.reset_input(ctx);
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }
}

/// Velocity change for `force` expressed in the frame whose forward axis is
/// `axis`; the actor is pushed away from that axis.
///
/// A degenerate axis falls back to the world frame.
pub fn knockback_velocity(axis: Vec3, force: Vec3) -> Vec3 {
    let offset = match axis.try_normalize() {
        Some(forward) => {
            let right = Vec3::Y.cross(forward).try_normalize().unwrap_or(Vec3::X);
            let up = forward.cross(right);
            right * force.x + up * force.y + forward * force.z
        }
        None => force,
    };
    -offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flicker::FlickerConfig;

    #[derive(Debug)]
    struct Body {
        position: Vec3,
        forward: Vec3,
        gravity: bool,
        kinematic: bool,
        input: bool,
        mover: bool,
        controller: bool,
        velocity: Vec3,
    }

    impl Default for Body {
        fn default() -> Self {
            Self {
                position: Vec3::ZERO,
                forward: Vec3::Z,
                gravity: false,
                kinematic: true,
                input: true,
                mover: true,
                controller: true,
                velocity: Vec3::ZERO,
            }
        }
    }

    impl ActorBody for Body {
        fn position(&self) -> Vec3 {
            self.position
        }
        fn forward(&self) -> Vec3 {
            self.forward
        }
        fn uses_gravity(&self) -> bool {
            self.gravity
        }
        fn set_uses_gravity(&mut self, enabled: bool) {
            self.gravity = enabled;
        }
        fn set_kinematic(&mut self, kinematic: bool) {
            self.kinematic = kinematic;
        }
        fn apply_velocity_change(&mut self, velocity: Vec3) {
            self.velocity += velocity;
        }
        fn set_input_enabled(&mut self, enabled: bool) {
            self.input = enabled;
        }
        fn set_mover_enabled(&mut self, enabled: bool) {
            self.mover = enabled;
        }
        fn set_controller_enabled(&mut self, enabled: bool) {
            self.controller = enabled;
        }
    }

    const OWNER: EntityId = EntityId(4);

    fn stunning() -> StunConfig {
        StunConfig {
            flicker: FlickerConfig {
                time: 0.5,
                rate: 0.125,
                once: false,
            },
            stun_time: 1.0,
            knockback_mode: KnockbackMode::DirectionOfFacing,
            knockback_force: Vec3::new(0.0, 0.0, 5.0),
            animation_time: 0.25,
            animation: crate::stun::AnimationTag::new("flinch"),
            ..StunConfig::default()
        }
    }

    fn names(events: &[CombatEvent]) -> Vec<&'static str> {
        events.iter().map(CombatEvent::name).collect()
    }

    #[test]
    fn damage_effect_knocks_back_and_recovers() {
        let mut body = Body::default();
        let mut events = Vec::new();
        let mut stun = HitStunController::new(OWNER, stunning(), Visuals::new(1, 1));

        let started = stun.begin_damage_effect(
            0.0,
            HealthView::ALIVE,
            Vec3::ZERO,
            &mut StunContext::new(&mut body, &mut events),
        );
        assert!(started);
        assert!(!body.input && !body.mover && !body.kinematic && body.gravity);
        assert_eq!(body.velocity, Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(
            names(&events),
            vec!["stun_started", "flicker_started", "animation_requested"]
        );

        stun.tick(0.5, false, &mut StunContext::new(&mut body, &mut events));
        assert!(!stun.is_effect_running());
        assert!(stun.visuals().is_default());
        assert!(stun.is_stunned());

        stun.tick(1.0, false, &mut StunContext::new(&mut body, &mut events));
        assert!(body.input && body.mover && body.controller && body.kinematic);
        assert!(!body.gravity);
        assert_eq!(names(&events).last(), Some(&"stun_ended"));
    }

    #[test]
    fn second_hit_is_ignored_while_flickering() {
        let mut body = Body::default();
        let mut events = Vec::new();
        let mut stun = HitStunController::new(OWNER, stunning(), Visuals::new(1, 0));
        let mut ctx = StunContext::new(&mut body, &mut events);

        assert!(stun.begin_damage_effect(0.0, HealthView::ALIVE, Vec3::ZERO, &mut ctx));
        assert!(!stun.begin_damage_effect(0.1, HealthView::ALIVE, Vec3::ZERO, &mut ctx));
        drop(ctx);
        assert_eq!(body.velocity, Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn zero_stun_time_only_flickers() {
        let mut body = Body::default();
        let mut events = Vec::new();
        let config = StunConfig {
            stun_time: 0.0,
            ..stunning()
        };
        let mut stun = HitStunController::new(OWNER, config, Visuals::new(1, 0));
        stun.begin_damage_effect(
            0.0,
            HealthView::ALIVE,
            Vec3::ZERO,
            &mut StunContext::new(&mut body, &mut events),
        );
        assert!(body.input);
        assert_eq!(body.velocity, Vec3::ZERO);
        assert!(!names(&events).contains(&"stun_started"));
    }

    #[test]
    fn override_applies_once_and_base_survives() {
        let mut body = Body::default();
        let mut events = Vec::new();
        let mut stun = HitStunController::new(OWNER, stunning(), Visuals::new(1, 0));
        let overrides = StunOverride {
            knockback_force: Some(Vec3::new(0.0, 0.0, 2.0)),
            stun_time: Some(0.25),
            animation: None,
        };

        stun.begin_damage_effect_with(
            0.0,
            HealthView::ALIVE,
            Vec3::ZERO,
            &overrides,
            &mut StunContext::new(&mut body, &mut events),
        );
        assert_eq!(body.velocity, Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(stun.config(), &stunning());

        stun.tick(0.25, false, &mut StunContext::new(&mut body, &mut events));
        assert!(!stun.is_stunned());
    }

    #[test]
    fn hit_direction_pushes_away_from_the_hit() {
        let mut body = Body::default();
        let mut events = Vec::new();
        let config = StunConfig {
            knockback_mode: KnockbackMode::DirectionOfHit,
            ..stunning()
        };
        let mut stun = HitStunController::new(OWNER, config, Visuals::default());
        stun.begin_damage_effect(
            0.0,
            HealthView::ALIVE,
            Vec3::new(3.0, 2.0, 0.0),
            &mut StunContext::new(&mut body, &mut events),
        );
        // vertical component of the hit direction is scaled out
        assert!((body.velocity - Vec3::new(-5.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn disable_mid_effect_restores_everything() {
        let mut body = Body::default();
        let mut events = Vec::new();
        let mut stun = HitStunController::new(OWNER, stunning(), Visuals::new(2, 1));
        let mut ctx = StunContext::new(&mut body, &mut events);
        stun.begin_damage_effect(0.0, HealthView::ALIVE, Vec3::ZERO, &mut ctx);
        assert!(!stun.visuals().is_default());

        stun.disable(&mut ctx);
        assert!(stun.visuals().is_default());
        assert!(!stun.is_effect_running());
        assert!(!stun.is_stunned());
        assert!(!stun.begin_flicker_effect(0.1, HealthView::ALIVE, &mut ctx));
        drop(ctx);
        assert!(body.input);

        let before = events.len();
        stun.tick(5.0, false, &mut StunContext::new(&mut body, &mut events));
        assert_eq!(events.len(), before);
    }

    #[test]
    fn dead_targets_get_no_animation_or_reaction() {
        let mut body = Body::default();
        let mut events = Vec::new();
        let dead = HealthView {
            is_dead: true,
            is_invincible: false,
        };
        let mut stun = HitStunController::new(OWNER, stunning(), Visuals::new(1, 0));
        let mut ctx = StunContext::new(&mut body, &mut events);
        assert!(!stun.handle_health_lost(0.0, dead, None, &mut ctx));
        assert!(stun.begin_flicker_effect(0.0, dead, &mut ctx));
        drop(ctx);
        assert!(!names(&events).contains(&"animation_requested"));
        assert_eq!(names(&events).last(), Some(&"flicker_ended"));
    }

    #[test]
    fn knockback_velocity_uses_the_axis_frame() {
        let v = knockback_velocity(Vec3::X, Vec3::new(0.0, 1.0, 2.0));
        assert!((v - Vec3::new(-2.0, -1.0, 0.0)).length() < 1e-5);
        assert_eq!(knockback_velocity(Vec3::ZERO, Vec3::Z), -Vec3::Z);
    }
}
