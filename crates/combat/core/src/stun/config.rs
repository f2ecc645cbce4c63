use std::fmt;

use glam::Vec3;

use crate::error::ConfigError;
use crate::flicker::FlickerConfig;

/// Name of the hit-stun animation handed to the animation system.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AnimationTag(pub String);

impl AnimationTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnimationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Frame the knockback force is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum KnockbackMode {
    /// Forward axis points from the actor toward the hit point.
    #[default]
    DirectionOfHit,
    /// Forward axis is the actor's facing.
    DirectionOfFacing,
}

/// Base stun parameters owned by an actor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StunConfig {
    pub flicker: FlickerConfig,
    /// Seconds input stays disabled after a knockback; `0` disables stun.
    pub stun_time: f32,
    pub knockback_mode: KnockbackMode,
    /// Force in the knockback frame (x right, y up, z forward).
    pub knockback_force: Vec3,
    /// Per-axis scaling of the hit direction in `DirectionOfHit` mode.
    pub direction_scaling: Vec3,
    /// Seconds of hit-stun animation; `0` plays none.
    pub animation_time: f32,
    pub animation: AnimationTag,
    pub play_anim_if_dead: bool,
}

impl StunConfig {
    pub const DEFAULT_DIRECTION_SCALING: Vec3 = Vec3::new(1.0, 0.0, 1.0);

    /// Merges an optional override over the base values.
    ///
    /// The animation override only applies when its duration is positive.
    pub fn effective(&self, overrides: Option<&StunOverride>) -> EffectiveStun {
        let mut effective = EffectiveStun {
            knockback_force: self.knockback_force,
            stun_time: self.stun_time,
            animation_time: self.animation_time,
            animation: self.animation.clone(),
        };
        let Some(overrides) = overrides else {
            return effective;
        };
        if let Some(force) = overrides.knockback_force {
            effective.knockback_force = force;
        }
        if let Some(stun_time) = overrides.stun_time {
            effective.stun_time = stun_time;
        }
        if let Some((time, tag)) = &overrides.animation {
            if *time > 0.0 {
                effective.animation_time = *time;
                effective.animation = tag.clone();
            }
        }
        effective
    }

    /// # Errors
    ///
    /// Rejects negative durations, a non-finite force and an invalid flicker.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.flicker.validate()?;
        ConfigError::non_negative("stun.stun_time", self.stun_time)?;
        ConfigError::non_negative("stun.animation_time", self.animation_time)?;
        if !self.knockback_force.is_finite() {
            return Err(ConfigError::NegativeOrNonFinite {
                field: "stun.knockback_force",
                value: self.knockback_force.length(),
            });
        }
        Ok(())
    }
}

impl Default for StunConfig {
    fn default() -> Self {
        Self {
            flicker: FlickerConfig::default(),
            stun_time: 0.0,
            knockback_mode: KnockbackMode::default(),
            knockback_force: Vec3::ZERO,
            direction_scaling: Self::DEFAULT_DIRECTION_SCALING,
            animation_time: 0.0,
            animation: AnimationTag::default(),
            play_anim_if_dead: false,
        }
    }
}

/// Transient replacement of selected stun parameters for one hit.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StunOverride {
    pub knockback_force: Option<Vec3>,
    pub stun_time: Option<f32>,
    /// Animation duration and tag.
    pub animation: Option<(f32, AnimationTag)>,
}

impl StunOverride {
    /// # Errors
    ///
    /// Rejects negative durations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(stun_time) = self.stun_time {
            ConfigError::non_negative("stun_override.stun_time", stun_time)?;
        }
        if let Some((time, _)) = &self.animation {
            ConfigError::non_negative("stun_override.animation_time", *time)?;
        }
        Ok(())
    }
}

/// Parameters used by one stun invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectiveStun {
    pub knockback_force: Vec3,
    pub stun_time: f32,
    pub animation_time: f32,
    pub animation: AnimationTag,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_never_touch_the_base() {
        let base = StunConfig {
            stun_time: 0.5,
            knockback_force: Vec3::new(0.0, 1.0, 4.0),
            animation_time: 0.3,
            animation: AnimationTag::new("flinch"),
            ..StunConfig::default()
        };
        let snapshot = base.clone();
        let overrides = StunOverride {
            knockback_force: Some(Vec3::new(0.0, 0.0, 9.0)),
            stun_time: Some(1.5),
            animation: Some((0.8, AnimationTag::new("launch"))),
        };

        let effective = base.effective(Some(&overrides));
        assert_eq!(effective.stun_time, 1.5);
        assert_eq!(effective.knockback_force, Vec3::new(0.0, 0.0, 9.0));
        assert_eq!(effective.animation.as_str(), "launch");
        assert_eq!(base, snapshot);
        assert_eq!(base.effective(None).stun_time, 0.5);
    }

    #[test]
    fn zero_length_animation_override_is_ignored() {
        let base = StunConfig {
            animation_time: 0.3,
            animation: AnimationTag::new("flinch"),
            ..StunConfig::default()
        };
        let overrides = StunOverride {
            animation: Some((0.0, AnimationTag::new("launch"))),
            ..StunOverride::default()
        };
        let effective = base.effective(Some(&overrides));
        assert_eq!(effective.animation_time, 0.3);
        assert_eq!(effective.animation.as_str(), "flinch");
    }
}
