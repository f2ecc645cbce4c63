use glam::Vec3;

use crate::env::{CollisionSource, InstanceContext};
use crate::events::CombatEvent;
use crate::timer::TimerQueue;
use crate::types::{ColliderHit, InstanceId, sort_hits_by_distance};

use super::config::BeamConfig;

/// Pose of the weapon a beam is attached to, sampled each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourcePose {
    pub position: Vec3,
    pub forward: Vec3,
    pub active: bool,
}

impl SourcePose {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            forward,
            active: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum BeamPhase {
    Pooled,
    Growing,
    Shrinking,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BeamTimer {
    StartGrowth,
}

/// Growable, retractable ray beam.
///
/// While growing, the beam follows its source and extends by `speed * dt`
/// per tick until it reaches `max_length` or a blocking layer. Once killed it
/// keeps its end point and retracts its start toward it at the same speed.
#[derive(Clone, Debug)]
pub struct Beam {
    id: InstanceId,
    config: BeamConfig,
    phase: BeamPhase,
    start: Vec3,
    end: Vec3,
    direction: Vec3,
    length: f32,
    blocked: bool,
    growth_enabled: bool,
    timers: TimerQueue<BeamTimer>,
}

impl Beam {
    pub fn new(id: InstanceId, config: BeamConfig) -> Self {
        Self {
            id,
            config,
            phase: BeamPhase::Pooled,
            start: Vec3::ZERO,
            end: Vec3::ZERO,
            direction: Vec3::Z,
            length: 0.0,
            blocked: false,
            growth_enabled: false,
            timers: TimerQueue::new(),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn config(&self) -> &BeamConfig {
        &self.config
    }

    pub fn phase(&self) -> BeamPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != BeamPhase::Pooled
    }

    pub fn start(&self) -> Vec3 {
        self.start
    }

    pub fn end(&self) -> Vec3 {
        self.end
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// True when the last growing tick stopped at a blocking hit.
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Starts a fresh beam at the source.
    pub fn activate(&mut self, now: f64, source: SourcePose) {
        self.timers.clear();
        self.phase = BeamPhase::Growing;
        self.start = source.position;
        self.end = source.position;
        self.direction = source.forward.try_normalize().unwrap_or(Vec3::Z);
        self.length = 0.0;
        self.blocked = false;
        if self.config.startup_delay > 0.0 {
            self.growth_enabled = false;
            self.timers.schedule(
                now + f64::from(self.config.startup_delay),
                BeamTimer::StartGrowth,
            );
        } else {
            self.growth_enabled = true;
        }
        tracing::trace!(target: "combat::beam", id = %self.id, "activated");
    }

    /// Switches to retraction. Repeated calls have no further effect.
    pub fn kill(&mut self) {
        if self.phase == BeamPhase::Growing {
            self.phase = BeamPhase::Shrinking;
            self.timers.clear();
            tracing::trace!(
                target: "combat::beam",
                id = %self.id,
                length = self.length,
                "retracting"
            );
        }
    }

    /// Returns to the pooled phase without a pool request.
    pub fn deactivate(&mut self) {
        self.timers.clear();
        self.phase = BeamPhase::Pooled;
    }

    /// Advances the beam by one frame.
    ///
    /// `source` is `None` when the weapon no longer exists. Returns the hits
    /// struck this tick, in distance order, so the caller can apply damage.
    pub fn tick(
        &mut self,
        now: f64,
        delta: f32,
        source: Option<SourcePose>,
        physics: &dyn CollisionSource,
        ctx: &mut InstanceContext<'_>,
    ) -> Vec<ColliderHit> {
        while let Some((timer, _)) = self.timers.pop_due(now) {
            match timer {
                BeamTimer::StartGrowth => self.growth_enabled = true,
            }
        }

        match self.phase {
            BeamPhase::Pooled => Vec::new(),
            BeamPhase::Growing => match source.filter(|pose| pose.active) {
                Some(pose) => self.grow(pose, delta, physics, ctx),
                None => {
                    self.kill();
                    self.shrink(delta, physics, ctx)
                }
            },
            BeamPhase::Shrinking => self.shrink(delta, physics, ctx),
        }
    }

    fn grow(
        &mut self,
        source: SourcePose,
        delta: f32,
        physics: &dyn CollisionSource,
        ctx: &mut InstanceContext<'_>,
    ) -> Vec<ColliderHit> {
        self.start = source.position;
        if let Some(forward) = source.forward.try_normalize() {
            self.direction = forward;
        }

        let (struck, blocker) = self.sweep(self.length, physics, ctx);
        match blocker {
            Some(hit) => {
                self.blocked = true;
                self.end = hit.point;
                self.length = hit.distance;
                ctx.sink.notify(CombatEvent::BeamBlocked {
                    beam: self.id,
                    point: hit.point,
                });
            }
            None => {
                self.blocked = false;
                self.end = self.start + self.direction * self.length;
                if self.growth_enabled {
                    self.length =
                        (self.length + self.config.speed * delta).min(self.config.max_length);
                }
            }
        }
        struck
    }

    fn shrink(
        &mut self,
        delta: f32,
        physics: &dyn CollisionSource,
        ctx: &mut InstanceContext<'_>,
    ) -> Vec<ColliderHit> {
        let remaining = self.start.distance(self.end);
        let step = (self.config.speed * delta).max(0.0);
        if let Some(toward_end) = (self.end - self.start).try_normalize() {
            self.direction = toward_end;
        }
        if step >= remaining {
            self.start = self.end;
        } else {
            self.start += self.direction * step;
        }
        self.length = self.start.distance(self.end);

        // A zero threshold still retires a beam whose start reached its end.
        if self.length < self.config.kill_threshold || self.length <= 0.0 {
            tracing::trace!(target: "combat::beam", id = %self.id, "retracted");
            self.deactivate();
            ctx.pool.relinquish(self.id);
            return Vec::new();
        }

        // The end stays pinned while retracting; a blocker only cuts the walk short.
        let (struck, _) = self.sweep(self.length, physics, ctx);
        struck
    }

    /// Casts along the beam, reporting strikes up to the first blocking hit.
    fn sweep(
        &self,
        length: f32,
        physics: &dyn CollisionSource,
        ctx: &mut InstanceContext<'_>,
    ) -> (Vec<ColliderHit>, Option<ColliderHit>) {
        let mut struck = Vec::new();
        if length <= 0.0 {
            return (struck, None);
        }

        let mask = self.config.blocking | self.config.strike;
        let mut hits = physics.raycast_all(self.start, self.direction, length, mask);
        sort_hits_by_distance(&mut hits);

        for hit in hits {
            if self.config.blocking.contains(hit.layer) {
                return (struck, Some(hit));
            }
            if !self.config.strike.contains(hit.layer) {
                continue;
            }
            if self.config.max_hits > 0 && struck.len() >= self.config.max_hits {
                continue;
            }
            ctx.sink.notify(CombatEvent::BeamStruck { beam: self.id, hit });
            struck.push(hit);
        }
        (struck, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::EmptyScene;
    use crate::types::{ColliderId, EntityId, Layer, LayerMask};

    const ID: InstanceId = InstanceId(11);
    const WALL: Layer = Layer(1);
    const ENEMY: Layer = Layer(2);

    /// Plates perpendicular to +X at fixed x positions.
    struct Plates(Vec<(f32, Layer)>);

    impl CollisionSource for Plates {
        fn raycast_all(
            &self,
            origin: Vec3,
            direction: Vec3,
            max: f32,
            mask: LayerMask,
        ) -> Vec<ColliderHit> {
            if direction.x <= 0.0 {
                return Vec::new();
            }
            self.0
                .iter()
                .enumerate()
                .filter(|(_, (_, layer))| mask.contains(*layer))
                .filter_map(|(index, &(x, layer))| {
                    let distance = (x - origin.x) / direction.x;
                    (distance >= 0.0 && distance <= max).then(|| {
                        ColliderHit::new(
                            ColliderId(index as u32),
                            layer,
                            distance,
                            origin + direction * distance,
                        )
                        .with_entity(EntityId(index as u32))
                    })
                })
                .rev()
                .collect()
        }
    }

    #[derive(Default)]
    struct Harness {
        events: Vec<CombatEvent>,
        returned: Vec<InstanceId>,
    }

    impl Harness {
        fn ctx(&mut self) -> InstanceContext<'_> {
            InstanceContext::new(&mut self.events, &mut self.returned)
        }
    }

    fn pose() -> SourcePose {
        SourcePose::new(Vec3::ZERO, Vec3::X)
    }

    fn config() -> BeamConfig {
        BeamConfig::default()
            .with_speed(10.0)
            .with_max_length(20.0)
            .with_layers(WALL.mask(), ENEMY.mask())
    }

    /// Ticks at 10 Hz for `seconds`, returning the time reached.
    fn run(
        beam: &mut Beam,
        harness: &mut Harness,
        physics: &dyn CollisionSource,
        source: Option<SourcePose>,
        from: f64,
        seconds: f64,
    ) -> f64 {
        let steps = (seconds * 10.0).round() as usize;
        let mut now = from;
        for _ in 0..steps {
            now += 0.1;
            beam.tick(now, 0.1, source, physics, &mut harness.ctx());
        }
        now
    }

    #[test]
    fn unobstructed_growth_clamps_at_max_length() {
        let mut harness = Harness::default();
        let mut beam = Beam::new(ID, config());
        beam.activate(0.0, pose());

        let mut previous = 0.0;
        let mut now = 0.0;
        for _ in 0..20 {
            now = run(&mut beam, &mut harness, &EmptyScene, Some(pose()), now, 0.1);
            assert!(beam.length() >= previous);
            assert!(beam.length() <= 20.0);
            previous = beam.length();
        }
        assert!((beam.length() - 20.0).abs() < 1e-4);

        run(&mut beam, &mut harness, &EmptyScene, Some(pose()), now, 1.0);
        assert_eq!(beam.length(), 20.0);
    }

    #[test]
    fn blocking_hit_pins_the_end() {
        let mut harness = Harness::default();
        let plates = Plates(vec![(7.5, WALL)]);
        let mut beam = Beam::new(ID, config());
        beam.activate(0.0, pose());

        run(&mut beam, &mut harness, &plates, Some(pose()), 0.0, 1.5);
        assert!(beam.is_blocked());
        assert_eq!(beam.length(), 7.5);
        assert_eq!(beam.end(), Vec3::new(7.5, 0.0, 0.0));
        assert!(harness
            .events
            .iter()
            .any(|event| matches!(event, CombatEvent::BeamBlocked { beam: ID, .. })));
    }

    #[test]
    fn strikes_before_the_blocker_are_reported_in_distance_order() {
        let mut harness = Harness::default();
        let plates = Plates(vec![(3.0, ENEMY), (5.0, WALL), (1.0, ENEMY), (6.0, ENEMY)]);
        let mut beam = Beam::new(ID, config());
        beam.activate(0.0, pose());
        run(&mut beam, &mut harness, &plates, Some(pose()), 0.0, 1.0);

        let struck = beam.tick(1.1, 0.1, Some(pose()), &plates, &mut harness.ctx());
        let order: Vec<u32> = struck.iter().map(|hit| hit.collider.0).collect();
        assert_eq!(order, vec![2, 0]);
    }

    #[test]
    fn max_hits_caps_strikes_per_tick() {
        let mut harness = Harness::default();
        let plates = Plates(vec![(1.0, ENEMY), (2.0, ENEMY), (3.0, ENEMY)]);
        let mut beam = Beam::new(ID, config().with_max_hits(2));
        beam.activate(0.0, pose());
        run(&mut beam, &mut harness, &plates, Some(pose()), 0.0, 1.0);

        let struck = beam.tick(1.1, 0.1, Some(pose()), &plates, &mut harness.ctx());
        assert_eq!(struck.len(), 2);
    }

    #[test]
    fn retraction_terminates_below_threshold() {
        let mut harness = Harness::default();
        let mut beam = Beam::new(ID, config());
        beam.activate(0.0, pose());
        let now = run(&mut beam, &mut harness, &EmptyScene, Some(pose()), 0.0, 0.5);
        let end = beam.end();

        beam.kill();
        beam.kill();
        assert_eq!(beam.phase(), BeamPhase::Shrinking);

        let mut now = now;
        while beam.is_active() {
            now += 0.1;
            beam.tick(now, 0.1, Some(pose()), &EmptyScene, &mut harness.ctx());
            assert!(beam.length() >= 0.0);
            assert_eq!(beam.end(), end);
            if beam.is_active() {
                assert!(beam.length() >= beam.config().kill_threshold);
            }
        }
        assert_eq!(harness.returned, vec![ID]);
    }

    #[test]
    fn zero_threshold_retraction_still_returns_to_pool() {
        let mut harness = Harness::default();
        let config = BeamConfig {
            kill_threshold: 0.0,
            ..config()
        };
        let mut beam = Beam::new(ID, config);
        beam.activate(0.0, pose());
        let mut now = run(&mut beam, &mut harness, &EmptyScene, Some(pose()), 0.0, 0.5);
        beam.kill();

        for _ in 0..20 {
            if !beam.is_active() {
                break;
            }
            now += 0.1;
            beam.tick(now, 0.1, Some(pose()), &EmptyScene, &mut harness.ctx());
        }
        assert!(!beam.is_active());
        assert_eq!(harness.returned, vec![ID]);
    }

    #[test]
    fn inactive_source_starts_retraction() {
        let mut harness = Harness::default();
        let mut beam = Beam::new(ID, config());
        beam.activate(0.0, pose());
        run(&mut beam, &mut harness, &EmptyScene, Some(pose()), 0.0, 1.0);

        let gone = SourcePose {
            active: false,
            ..pose()
        };
        beam.tick(1.1, 0.1, Some(gone), &EmptyScene, &mut harness.ctx());
        assert_eq!(beam.phase(), BeamPhase::Shrinking);
    }

    #[test]
    fn startup_delay_holds_growth() {
        let mut harness = Harness::default();
        let mut beam = Beam::new(ID, config().with_startup_delay(0.5));
        beam.activate(0.0, pose());
        beam.tick(0.25, 0.25, Some(pose()), &EmptyScene, &mut harness.ctx());
        assert_eq!(beam.length(), 0.0);
        beam.tick(0.5, 0.25, Some(pose()), &EmptyScene, &mut harness.ctx());
        assert_eq!(beam.length(), 2.5);
    }
}
