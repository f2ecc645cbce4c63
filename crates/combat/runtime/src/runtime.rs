//! Frame loop that drives the combat core against the reference world.
//!
//! Each [`CombatRuntime::tick`] integrates stunned bodies, moves projectiles
//! and feeds their collisions through the projectile lifecycle and its
//! attachments, advances beams and applies their strikes, then ticks stun
//! controllers. Instances returned to the pool during a tick become
//! reusable at the end of it.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use combat_content::{ActorSpec, CombatProfiles, ProjectileProfile};
use combat_core::{
    Allegiance, Beam, ColliderHit, ColliderId, CollisionSource, DamageHandler, DamageRequest,
    DamageResolver, EntityId, FrameTime, HitStunApplier, HitStunController, HitTransfer,
    InstanceContext, InstanceId, Layer, LayerMask, PcgRng, Projectile, SourcePose, Strike,
    Visuals, sort_hits_by_distance,
};
use glam::Vec3;
use tokio::sync::broadcast;

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::events::{BusSink, Event, EventBus, Topic};
use crate::world::{Actor, ActorRegistry, ObjectPool, SimBody, SphereScene, World};

/// Gap left between a shooter's collider and a spawned projectile or beam.
const SPAWN_CLEARANCE: f32 = 0.05;

/// Collision attachments riding on one projectile flight.
#[derive(Debug, Default)]
struct Attachments {
    handler: Option<DamageHandler>,
    applier: Option<HitStunApplier>,
    transfer: Option<HitTransfer>,
}

impl Attachments {
    fn from_profile(profile: &ProjectileProfile, owner: Option<EntityId>, origin: Vec3) -> Self {
        Self {
            handler: profile.damage.clone().map(|config| {
                let mut handler = DamageHandler::new(config, owner);
                handler.activate(origin);
                handler
            }),
            applier: profile.stun.clone().map(HitStunApplier::new),
            transfer: profile.transfer,
        }
    }

    fn on_strike(&mut self, now: f64, strike: &Strike, world: &mut World) {
        if let Some(handler) = self.handler.as_mut() {
            let outcome = handler.on_trigger_enter(now, &strike.hit, &mut world.damage_context());
            if let Some(transfer) = &self.transfer {
                transfer.on_trigger_outcome(
                    strike.projectile,
                    handler.owner(),
                    &outcome,
                    &mut world.sink,
                );
            }
        }
        if let (Some(applier), Some(entity)) = (&self.applier, strike.hit.entity) {
            world.apply_stun(now, applier, entity, strike.hit.point);
        }
        world.route_health_lost(now, Some(strike.hit.point));
    }
}

struct ProjectileSlot {
    profile: String,
    projectile: Projectile,
    position: Vec3,
    attachments: Attachments,
    /// Colliders already entered during this flight.
    touched: HashSet<ColliderId>,
    strikes: Rc<RefCell<Vec<Strike>>>,
}

struct BeamSlot {
    profile: String,
    beam: Beam,
    owner: EntityId,
    handler: Option<DamageHandler>,
    /// Colliders struck on the previous tick; they receive stay events.
    touching: HashSet<ColliderId>,
}

/// Owns the world, the pooled instances and the clock.
pub struct CombatRuntime {
    config: RuntimeConfig,
    profiles: CombatProfiles,
    world: World,
    pool: ObjectPool,
    projectiles: BTreeMap<InstanceId, ProjectileSlot>,
    beams: BTreeMap<InstanceId, BeamSlot>,
    active_beams: HashMap<EntityId, InstanceId>,
    fallen: HashSet<EntityId>,
    clock: FrameTime,
    ticks: u64,
}

impl CombatRuntime {
    pub fn new(config: RuntimeConfig, profiles: CombatProfiles) -> Result<Self> {
        config.validate()?;
        profiles.validate()?;

        let bus = EventBus::with_capacity(config.event_buffer_size);
        let world = World {
            resolver: DamageResolver::new(config.combat.clone(), PcgRng::new(config.seed)),
            registry: ActorRegistry::new(),
            scene: SphereScene::new(),
            sink: BusSink::new(bus),
        };
        tracing::debug!(
            target: "runtime::world",
            tick_rate = config.tick_rate,
            "combat runtime created"
        );

        Ok(Self {
            config,
            profiles,
            world,
            pool: ObjectPool::new(),
            projectiles: BTreeMap::new(),
            beams: BTreeMap::new(),
            active_beams: HashMap::new(),
            fallen: HashSet::new(),
            clock: FrameTime::default(),
            ticks: 0,
        })
    }

    // ===== accessors =====

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn profiles(&self) -> &CombatProfiles {
        &self.profiles
    }

    pub fn now(&self) -> f64 {
        self.clock.now
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn bus(&self) -> &EventBus {
        self.world.sink.bus()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.bus().subscribe(topic)
    }

    pub fn sink(&self) -> &BusSink {
        &self.world.sink
    }

    pub fn registry(&self) -> &ActorRegistry {
        &self.world.registry
    }

    pub fn actor(&self, id: EntityId) -> Option<&Actor> {
        self.world.registry.get(id)
    }

    pub fn entity(&self, name: &str) -> Result<EntityId> {
        self.world
            .registry
            .by_name(name)
            .map(|actor| actor.id)
            .ok_or_else(|| RuntimeError::UnknownActor { name: name.to_owned() })
    }

    pub fn projectile(&self, id: InstanceId) -> Option<&Projectile> {
        self.projectiles.get(&id).map(|slot| &slot.projectile)
    }

    /// Current position of a projectile in flight.
    pub fn projectile_position(&self, id: InstanceId) -> Option<Vec3> {
        self.projectiles
            .get(&id)
            .filter(|slot| slot.projectile.is_active())
            .map(|slot| slot.position)
    }

    pub fn beam(&self, id: InstanceId) -> Option<&Beam> {
        self.beams.get(&id).map(|slot| &slot.beam)
    }

    /// Beam currently attached to `shooter`, if any.
    pub fn active_beam(&self, shooter: EntityId) -> Option<InstanceId> {
        self.active_beams.get(&shooter).copied()
    }

    pub fn pool(&self) -> &ObjectPool {
        &self.pool
    }

    pub fn active_projectiles(&self) -> usize {
        self.projectiles.values().filter(|slot| slot.projectile.is_active()).count()
    }

    // ===== setup =====

    /// Adds an actor described by content and returns its id.
    pub fn spawn_actor(&mut self, spec: &ActorSpec) -> Result<EntityId> {
        let id = self.world.registry.next_id();
        let stun = match &spec.stun {
            Some(name) => Some(HitStunController::new(
                id,
                self.profiles.stun(name)?.clone(),
                Visuals::new(1, 1),
            )),
            None => None,
        };
        let weakness = match &spec.weakness {
            Some(name) => Some(self.profiles.weakness(name)?.clone()),
            None => None,
        };
        let collider = self
            .world
            .scene
            .add(Some(id), spec.layer, spec.position, spec.radius);

        self.world.registry.insert(Actor {
            id,
            name: spec.name.clone(),
            max_health: spec.health,
            health: spec.health,
            dead: spec.health <= 0,
            invincibility_window: spec.invincibility,
            invincible_until: 0.0,
            allegiance: spec.allegiance.map(Allegiance),
            stats: spec.stats,
            weakness,
            collider,
            radius: spec.radius,
            body: SimBody::new(spec.position, spec.forward),
            stun,
        });
        tracing::debug!(target: "runtime::world", actor = %spec.name, %id, "spawned");
        Ok(id)
    }

    /// Adds a static obstacle with no actor behind it.
    pub fn add_obstacle(&mut self, layer: Layer, center: Vec3, radius: f32) -> ColliderId {
        self.world.scene.add(None, layer, center, radius)
    }

    // ===== commands =====

    /// Fires a projectile from `shooter` using the named profile.
    ///
    /// `direction` defaults to the shooter's facing.
    pub fn fire(
        &mut self,
        shooter: EntityId,
        profile: &str,
        direction: Option<Vec3>,
    ) -> Result<InstanceId> {
        let actor = self
            .world
            .registry
            .get(shooter)
            .ok_or(RuntimeError::UnknownEntity { entity: shooter })?;
        let content = self.profiles.projectile(profile)?;
        let heading = direction
            .and_then(Vec3::try_normalize)
            .unwrap_or(actor.body.forward);
        let origin = actor.body.position + heading * (actor.radius + SPAWN_CLEARANCE);
        let now = self.clock.now;

        let projectiles = &self.projectiles;
        let id = self.pool.acquire(|id| {
            projectiles
                .get(&id)
                .is_some_and(|slot| slot.profile == profile)
        });
        let slot = self.projectiles.entry(id).or_insert_with(|| ProjectileSlot {
            profile: profile.to_owned(),
            projectile: Projectile::new(id, content.projectile.clone()),
            position: origin,
            attachments: Attachments::default(),
            touched: HashSet::new(),
            strikes: Rc::new(RefCell::new(Vec::new())),
        });

        slot.projectile.activate(now, Some(shooter), heading);
        slot.projectile.reset_to_default();
        slot.position = origin;
        slot.touched.clear();
        slot.strikes.borrow_mut().clear();
        slot.attachments = Attachments::from_profile(content, Some(shooter), origin);
        let queue = Rc::clone(&slot.strikes);
        slot.projectile
            .add_strike_callback(Box::new(move |strike| queue.borrow_mut().push(*strike)));

        let mut ctx = InstanceContext::new(&mut self.world.sink, &mut self.pool);
        slot.projectile.fired(&mut ctx);
        tracing::debug!(target: "runtime::world", %shooter, %id, profile, "projectile fired");
        Ok(id)
    }

    /// Starts a beam attached to `shooter`. A beam already running on the
    /// shooter is retracted first.
    pub fn start_beam(&mut self, shooter: EntityId, profile: &str) -> Result<InstanceId> {
        let actor = self
            .world
            .registry
            .get(shooter)
            .ok_or(RuntimeError::UnknownEntity { entity: shooter })?;
        let content = self.profiles.beam(profile)?;
        let pose = source_pose(actor);

        if let Some(previous) = self.active_beams.remove(&shooter) {
            if let Some(slot) = self.beams.get_mut(&previous) {
                slot.beam.kill();
            }
        }

        let beams = &self.beams;
        let id = self.pool.acquire(|id| {
            beams
                .get(&id)
                .is_some_and(|slot| slot.profile == profile)
        });
        let slot = self.beams.entry(id).or_insert_with(|| BeamSlot {
            profile: profile.to_owned(),
            beam: Beam::new(id, content.beam.clone()),
            owner: shooter,
            handler: None,
            touching: HashSet::new(),
        });
        slot.owner = shooter;
        slot.touching.clear();
        slot.handler = content.damage.clone().map(|config| {
            let mut handler = DamageHandler::new(config, Some(shooter));
            handler.activate(pose.position);
            handler
        });
        slot.beam.activate(self.clock.now, pose);
        self.active_beams.insert(shooter, id);
        tracing::debug!(target: "runtime::world", %shooter, %id, profile, "beam started");
        Ok(id)
    }

    /// Retracts the beam attached to `shooter`.
    pub fn stop_beam(&mut self, shooter: EntityId) -> Result<()> {
        let id = self
            .active_beams
            .remove(&shooter)
            .ok_or(RuntimeError::NoActiveBeam { entity: shooter })?;
        if let Some(slot) = self.beams.get_mut(&id) {
            slot.beam.kill();
        }
        Ok(())
    }

    /// Resolves a direct damage request and routes any health loss to stun.
    pub fn damage(&mut self, request: &DamageRequest) -> Option<i32> {
        let amount = self
            .world
            .resolver
            .resolve_direct_damage(&mut self.world.registry, request);
        self.world.route_health_lost(self.clock.now, None);
        amount
    }

    /// Kills `target` regardless of its remaining health.
    pub fn kill(
        &mut self,
        agent: Option<EntityId>,
        target: EntityId,
        honor_invincibility: bool,
    ) -> bool {
        self.world
            .resolver
            .force_kill(&mut self.world.registry, agent, target, honor_invincibility)
    }

    // ===== frame loop =====

    /// Advances one fixed tick.
    pub fn step(&mut self) {
        self.tick(self.config.tick_delta());
    }

    /// Advances the simulation by `delta` seconds.
    pub fn tick(&mut self, delta: f32) {
        self.clock = self.clock.advance(delta);
        self.ticks += 1;
        let now = self.clock.now;
        self.world.sink.set_time(now);
        self.world.registry.set_time(now);

        self.world.integrate_bodies(delta, self.config.gravity);
        self.tick_projectiles(now, delta);
        self.tick_beams(now, delta);
        self.world.tick_stuns(now);
        self.reap_fallen();

        for id in self.pool.settle() {
            tracing::trace!(target: "runtime::world", %id, "instance reusable");
        }
    }

    fn tick_projectiles(&mut self, now: f64, delta: f32) {
        let cull_distance = self.config.cull_distance;
        for slot in self.projectiles.values_mut() {
            if !slot.projectile.is_active() {
                continue;
            }
            slot.projectile
                .tick(now, &mut InstanceContext::new(&mut self.world.sink, &mut self.pool));
            if !slot.projectile.is_active() {
                continue;
            }

            let heading = slot.projectile.heading();
            let step = slot.projectile.config().speed * delta;
            let mut hits = self
                .world
                .scene
                .raycast_all(slot.position, heading, step, LayerMask::ALL);
            sort_hits_by_distance(&mut hits);
            slot.position += heading * step;

            for hit in hits {
                if !slot.touched.insert(hit.collider) {
                    continue;
                }
                collide(slot, &hit, now, &mut self.world, &mut self.pool);
                if !slot.projectile.is_active() {
                    break;
                }
            }

            if slot.projectile.is_active() && slot.position.length() > cull_distance {
                slot.projectile
                    .on_culled(&mut InstanceContext::new(&mut self.world.sink, &mut self.pool));
            }
        }
    }

    fn tick_beams(&mut self, now: f64, delta: f32) {
        for slot in self.beams.values_mut() {
            if !slot.beam.is_active() {
                continue;
            }
            let source = self.world.registry.get(slot.owner).map(source_pose);
            let struck = {
                let mut ctx = InstanceContext::new(&mut self.world.sink, &mut self.pool);
                slot.beam.tick(now, delta, source, &self.world.scene, &mut ctx)
            };

            if let Some(handler) = slot.handler.as_mut() {
                for hit in &struck {
                    if slot.touching.contains(&hit.collider) {
                        handler.on_trigger_stay(now, hit, &mut self.world.damage_context());
                    } else {
                        handler.on_trigger_enter(now, hit, &mut self.world.damage_context());
                    }
                    self.world.route_health_lost(now, Some(hit.point));
                }
            }
            slot.touching = struck.iter().map(|hit| hit.collider).collect();
        }

        let beams = &self.beams;
        self.active_beams
            .retain(|_, id| beams.get(id).is_some_and(|slot| slot.beam.is_active()));
    }

    /// Retires the weapons of actors that died this tick.
    fn reap_fallen(&mut self) {
        let newly_dead: Vec<EntityId> = self
            .world
            .registry
            .iter()
            .filter(|actor| actor.dead && !self.fallen.contains(&actor.id))
            .map(|actor| actor.id)
            .collect();

        for entity in newly_dead {
            self.fallen.insert(entity);
            tracing::info!(target: "runtime::world", %entity, "actor fell");
            if let Some(id) = self.active_beams.remove(&entity) {
                if let Some(slot) = self.beams.get_mut(&id) {
                    slot.beam.kill();
                }
            }
            for slot in self.projectiles.values_mut() {
                if slot.projectile.is_active() && slot.projectile.source() == Some(entity) {
                    let mut ctx = InstanceContext::new(&mut self.world.sink, &mut self.pool);
                    slot.projectile.on_parent_disabled(&mut ctx);
                }
            }
        }
    }
}

impl std::fmt::Debug for CombatRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatRuntime")
            .field("now", &self.clock.now)
            .field("ticks", &self.ticks)
            .field("projectiles", &self.projectiles.len())
            .field("beams", &self.beams.len())
            .finish_non_exhaustive()
    }
}

/// Feeds one enter event through the lifecycle, then runs the attachments
/// for every strike the callbacks queued.
fn collide(
    slot: &mut ProjectileSlot,
    hit: &ColliderHit,
    now: f64,
    world: &mut World,
    pool: &mut ObjectPool,
) {
    let outcome = slot
        .projectile
        .on_trigger_enter(Some(hit), &mut InstanceContext::new(&mut world.sink, pool));
    tracing::trace!(
        target: "runtime::world",
        id = %slot.projectile.id(),
        ?outcome,
        "projectile collision"
    );

    let strikes: Vec<Strike> = slot.strikes.borrow_mut().drain(..).collect();
    for strike in &strikes {
        slot.attachments.on_strike(now, strike, world);
    }
}

fn source_pose(actor: &Actor) -> SourcePose {
    let forward = actor.body.forward;
    SourcePose {
        position: actor.body.position + forward * (actor.radius + SPAWN_CLEARANCE),
        forward,
        active: !actor.dead,
    }
}
