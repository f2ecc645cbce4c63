//! Topic-based event bus for combat notifications.
//!
//! The core reports through a synchronous [`NotificationSink`](combat_core::NotificationSink);
//! [`BusSink`] forwards those notifications to broadcast channels so
//! consumers can subscribe only to the topics they need.

mod bus;
mod sink;

pub use bus::{Event, EventBus, Topic};
pub use sink::BusSink;
