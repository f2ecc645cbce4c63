use crate::error::ConfigError;
use crate::types::LayerMask;

/// Designer-tunable beam parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BeamConfig {
    /// Layers that stop the beam and pin its end point.
    pub blocking: LayerMask,
    /// Layers that are struck without stopping the beam.
    pub strike: LayerMask,
    /// Strikes reported per tick; `0` means unlimited.
    pub max_hits: usize,
    /// Growth and retraction speed in units per second.
    pub speed: f32,
    pub max_length: f32,
    /// A retracting beam terminates once its length drops below this.
    pub kill_threshold: f32,
    /// Seconds after activation before the beam starts growing.
    pub startup_delay: f32,
}

impl BeamConfig {
    pub const DEFAULT_SPEED: f32 = 10.0;
    pub const DEFAULT_MAX_LENGTH: f32 = 20.0;
    pub const DEFAULT_KILL_THRESHOLD: f32 = 1.0;

    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    #[must_use]
    pub fn with_max_length(mut self, max_length: f32) -> Self {
        self.max_length = max_length;
        self
    }

    #[must_use]
    pub fn with_layers(mut self, blocking: LayerMask, strike: LayerMask) -> Self {
        self.blocking = blocking;
        self.strike = strike;
        self
    }

    #[must_use]
    pub fn with_max_hits(mut self, max_hits: usize) -> Self {
        self.max_hits = max_hits;
        self
    }

    #[must_use]
    pub fn with_startup_delay(mut self, delay: f32) -> Self {
        self.startup_delay = delay;
        self
    }

    /// # Errors
    ///
    /// Rejects a non-positive speed and negative lengths or delays.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::positive("beam.speed", self.speed)?;
        ConfigError::non_negative("beam.max_length", self.max_length)?;
        ConfigError::non_negative("beam.kill_threshold", self.kill_threshold)?;
        ConfigError::non_negative("beam.startup_delay", self.startup_delay)
    }
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            blocking: LayerMask::NONE,
            strike: LayerMask::NONE,
            max_hits: 0,
            speed: Self::DEFAULT_SPEED,
            max_length: Self::DEFAULT_MAX_LENGTH,
            kill_threshold: Self::DEFAULT_KILL_THRESHOLD,
            startup_delay: 0.0,
        }
    }
}
