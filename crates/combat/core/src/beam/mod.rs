//! Ray beams that grow from a weapon, stop at blockers and retract when killed.
mod config;
mod simulator;

pub use config::BeamConfig;
pub use simulator::{Beam, BeamPhase, SourcePose};
