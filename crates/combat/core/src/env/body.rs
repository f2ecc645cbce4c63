//! Physical body and control surface of a stunnable actor.

use glam::Vec3;

/// Body, movement and input components the stun controller toggles.
///
/// Implementations may ignore calls for components the actor does not have
/// (an actor without a character controller simply ignores
/// `set_controller_enabled`).
pub trait ActorBody {
    /// World position of the actor.
    fn position(&self) -> Vec3;

    /// Facing direction (unit vector).
    fn forward(&self) -> Vec3;

    fn uses_gravity(&self) -> bool;
    fn set_uses_gravity(&mut self, enabled: bool);

    fn set_kinematic(&mut self, kinematic: bool);

    /// Instantaneous velocity change, independent of mass.
    fn apply_velocity_change(&mut self, velocity: Vec3);

    fn set_input_enabled(&mut self, enabled: bool);
    fn set_mover_enabled(&mut self, enabled: bool);
    fn set_controller_enabled(&mut self, enabled: bool);
}
