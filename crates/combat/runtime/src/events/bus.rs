//! Topic-based event bus implementation.

use std::sync::Arc;

use combat_core::CombatEvent;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Damage trigger results (hits, kills, invalid targets, meter events)
    Damage,
    /// Projectile lifecycle
    Projectile,
    /// Beam strikes and blocks
    Beam,
    /// Stun, flicker and animation requests
    Status,
}

impl Topic {
    pub const ALL: [Topic; 4] = [Topic::Damage, Topic::Projectile, Topic::Beam, Topic::Status];

    /// Routes a combat notification to its topic.
    pub fn of(event: &CombatEvent) -> Self {
        match event {
            CombatEvent::Hit { .. }
            | CombatEvent::InvalidTarget { .. }
            | CombatEvent::KilledTarget { .. }
            | CombatEvent::ProjectileHit { .. }
            | CombatEvent::ProjectileKilledTarget { .. } => Topic::Damage,
            CombatEvent::ProjectileFired { .. }
            | CombatEvent::ProjectileCollided { .. }
            | CombatEvent::ProjectileTerminated { .. } => Topic::Projectile,
            CombatEvent::BeamStruck { .. } | CombatEvent::BeamBlocked { .. } => Topic::Beam,
            CombatEvent::FlickerStarted { .. }
            | CombatEvent::FlickerEnded { .. }
            | CombatEvent::StunStarted { .. }
            | CombatEvent::StunEnded { .. }
            | CombatEvent::AnimationRequested { .. } => Topic::Status,
        }
    }
}

/// A combat notification stamped with the simulation time it was emitted at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub at: f64,
    pub payload: CombatEvent,
}

impl Event {
    pub fn topic(&self) -> Topic {
        Topic::of(&self.payload)
    }
}

struct Channels {
    damage: broadcast::Sender<Event>,
    projectile: broadcast::Sender<Event>,
    beam: broadcast::Sender<Event>,
    status: broadcast::Sender<Event>,
}

impl Channels {
    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Damage => &self.damage,
            Topic::Projectile => &self.projectile,
            Topic::Beam => &self.beam,
            Topic::Status => &self.status,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing never blocks: slow receivers lag and
/// lose the oldest events.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Channels {
                damage: broadcast::channel(capacity).0,
                projectile: broadcast::channel(capacity).0,
                beam: broadcast::channel(capacity).0,
                status: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.channels.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "runtime::events", "No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> Vec<(Topic, broadcast::Receiver<Event>)> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }

    /// Number of live receivers on `topic`.
    pub fn receiver_count(&self, topic: Topic) -> usize {
        self.channels.sender(topic).receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").finish_non_exhaustive()
    }
}
