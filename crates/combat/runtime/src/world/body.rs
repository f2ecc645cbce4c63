use combat_core::ActorBody;
use glam::Vec3;

/// Minimal rigid body for simulated actors.
///
/// Kinematic bodies stay where they are put. A stun makes the body dynamic
/// so knockback velocity and gravity move it until input is restored.
#[derive(Clone, Debug, PartialEq)]
pub struct SimBody {
    pub position: Vec3,
    pub forward: Vec3,
    pub velocity: Vec3,
    pub gravity: bool,
    pub kinematic: bool,
    pub input_enabled: bool,
    pub mover_enabled: bool,
    pub controller_enabled: bool,
}

impl SimBody {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            forward: forward.try_normalize().unwrap_or(Vec3::Z),
            velocity: Vec3::ZERO,
            gravity: false,
            kinematic: true,
            input_enabled: true,
            mover_enabled: true,
            controller_enabled: true,
        }
    }

    /// Moves a dynamic body by its velocity. The ground plane is `y = 0`.
    pub fn integrate(&mut self, delta: f32, gravity: f32) {
        if self.kinematic {
            self.velocity = Vec3::ZERO;
            return;
        }
        if self.gravity {
            self.velocity.y -= gravity * delta;
        }
        self.position += self.velocity * delta;
        if self.position.y < 0.0 {
            self.position.y = 0.0;
            self.velocity.y = 0.0;
        }
    }
}

impl ActorBody for SimBody {
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
        self.input_enabled = enabled;
    }

    fn set_mover_enabled(&mut self, enabled: bool) {
        self.mover_enabled = enabled;
    }

    fn set_controller_enabled(&mut self, enabled: bool) {
        self.controller_enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinematic_bodies_ignore_velocity() {
        let mut body = SimBody::new(Vec3::ZERO, Vec3::Z);
        body.apply_velocity_change(Vec3::new(0.0, 0.0, 4.0));
        body.integrate(0.5, 9.81);
        assert_eq!(body.position, Vec3::ZERO);

        body.set_kinematic(false);
        body.apply_velocity_change(Vec3::new(0.0, 0.0, 4.0));
        body.integrate(0.5, 9.81);
        assert_eq!(body.position, Vec3::new(0.0, 0.0, 2.0));
    }
}
