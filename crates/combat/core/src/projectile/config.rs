use bitflags::bitflags;

use crate::error::ConfigError;
use crate::flicker::FlickerConfig;
use crate::types::LayerMask;

bitflags! {
    /// Behaviour switches of a projectile.
    ///
    /// The default set is `SELF_DESTRUCT | ADJUSTABLE_HEADING |
    /// DESTROY_WITH_PARENT` (bit value 112).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ProjectileFlags: u8 {
        /// Kill the projectile once it is no longer visible.
        const DISABLE_ON_CULL       = 1 << 0;
        /// Ignore every collision (shields, decorative projectiles).
        const NO_COLLISION_EVENTS   = 1 << 1;
        /// Ignore colliders belonging to the projectile's own source.
        const DISALLOW_SELF_HIT     = 1 << 2;
        /// Collisions are processed by an external owner, not by the projectile.
        const USE_EXTERNAL_CALLBACK = 1 << 3;
        /// Marks a projectile that despawns on impact. Carried for content
        /// compatibility; blocking hits terminate regardless.
        const SELF_DESTRUCT         = 1 << 4;
        /// Heading changes after launch are accepted.
        const ADJUSTABLE_HEADING    = 1 << 5;
        /// Kill the projectile when its parent is disabled.
        const DESTROY_WITH_PARENT   = 1 << 6;
    }
}

impl Default for ProjectileFlags {
    fn default() -> Self {
        Self::SELF_DESTRUCT | Self::ADJUSTABLE_HEADING | Self::DESTROY_WITH_PARENT
    }
}

/// Designer-tunable projectile parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProjectileConfig {
    /// Seconds the projectile may exist before it expires.
    pub lifetime: f32,
    /// Hits on `penetrate_layers` tolerated before termination.
    pub penetrations: u16,
    pub penetrate_layers: LayerMask,
    /// Layers that neither count as penetrations nor terminate.
    pub ignore_layers: LayerMask,
    pub flags: ProjectileFlags,
    /// Fade-out flicker played on timeout before the projectile is returned.
    pub fade: Option<FlickerConfig>,
    /// Travel speed in units per second, used by simple integrators.
    pub speed: f32,
}

impl ProjectileConfig {
    pub const DEFAULT_LIFETIME: f32 = 3.0;
    pub const DEFAULT_SPEED: f32 = 10.0;

    #[must_use]
    pub fn with_lifetime(mut self, lifetime: f32) -> Self {
        self.lifetime = lifetime;
        self
    }

    #[must_use]
    pub fn with_penetration(mut self, penetrations: u16, layers: LayerMask) -> Self {
        self.penetrations = penetrations;
        self.penetrate_layers = layers;
        self
    }

    #[must_use]
    pub fn with_ignore_layers(mut self, layers: LayerMask) -> Self {
        self.ignore_layers = layers;
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: ProjectileFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_fade(mut self, fade: FlickerConfig) -> Self {
        self.fade = Some(fade);
        self
    }

    /// # Errors
    ///
    /// Rejects a negative lifetime or speed and an invalid fade flicker.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::non_negative("projectile.lifetime", self.lifetime)?;
        ConfigError::non_negative("projectile.speed", self.speed)?;
        if let Some(fade) = &self.fade {
            fade.validate()?;
        }
        Ok(())
    }
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            lifetime: Self::DEFAULT_LIFETIME,
            penetrations: 0,
            penetrate_layers: LayerMask::NONE,
            ignore_layers: LayerMask::NONE,
            flags: ProjectileFlags::default(),
            fade: None,
            speed: Self::DEFAULT_SPEED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flags_have_bit_value_112() {
        assert_eq!(ProjectileFlags::default().bits(), 112);
        assert!(ProjectileConfig::default().validate().is_ok());
    }

    #[test]
    fn invalid_fade_is_rejected() {
        let config = ProjectileConfig::default().with_fade(FlickerConfig {
            rate: 0.0,
            ..FlickerConfig::default()
        });
        assert!(config.validate().is_err());
    }
}
