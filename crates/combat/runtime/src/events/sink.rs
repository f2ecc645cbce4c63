//! Bridge from the core's synchronous notification sink to the event bus.

use combat_core::{CombatEvent, NotificationSink};

use super::bus::{Event, EventBus};

/// Publishes every notification on the bus, stamped with the current frame
/// time, and keeps per-kind counters for reports.
#[derive(Debug)]
pub struct BusSink {
    bus: EventBus,
    now: f64,
    published: usize,
    counts: std::collections::BTreeMap<&'static str, usize>,
}

impl BusSink {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            now: 0.0,
            published: 0,
            counts: Default::default(),
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Sets the timestamp applied to subsequent notifications.
    pub fn set_time(&mut self, now: f64) {
        self.now = now;
    }

    pub fn published(&self) -> usize {
        self.published
    }

    /// Notifications seen so far, by snake_case name.
    pub fn count(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.counts.iter().map(|(name, count)| (*name, *count))
    }
}

impl NotificationSink for BusSink {
    fn notify(&mut self, event: CombatEvent) {
        let name = event.name();
        tracing::trace!(target: "runtime::events", at = self.now, event = name, ?event);
        *self.counts.entry(name).or_default() += 1;
        self.published += 1;
        self.bus.publish(Event {
            at: self.now,
            payload: event,
        });
    }
}
