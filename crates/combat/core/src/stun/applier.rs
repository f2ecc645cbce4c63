use glam::Vec3;

use crate::env::HealthView;

use super::config::StunOverride;
use super::controller::{HitStunController, StunContext};

/// Projectile attachment that stuns whatever the projectile collides with,
/// replacing selected stun parameters for that one hit.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HitStunApplier {
    pub overrides: StunOverride,
}

impl HitStunApplier {
    pub fn new(overrides: StunOverride) -> Self {
        Self { overrides }
    }

    /// Starts a damage effect on the struck actor at `contact_point`.
    ///
    /// Does nothing for colliders without a stun controller or a live health
    /// component. Returns whether an effect started.
    pub fn apply(
        &self,
        now: f64,
        target: Option<HealthView>,
        controller: Option<&mut HitStunController>,
        contact_point: Vec3,
        ctx: &mut StunContext<'_>,
    ) -> bool {
        let (Some(view), Some(controller)) = (target, controller) else {
            return false;
        };
        if view.is_dead {
            return false;
        }
        controller.begin_damage_effect_with(now, view, contact_point, &self.overrides, ctx)
    }
}
