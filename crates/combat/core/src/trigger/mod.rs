//! Damage triggers: collision and trigger events in, direct damage out.
mod config;
mod handler;

pub use config::{DamageHandlerConfig, HandlerFlags, TriggerMode};
pub use handler::{DamageContext, DamageHandler, TriggerOutcome};
