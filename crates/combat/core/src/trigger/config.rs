use bitflags::bitflags;
use glam::Vec3;

use crate::damage::DamageTypeSet;
use crate::error::ConfigError;
use crate::types::LayerMask;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct HandlerFlags: u8 {
        /// Targets inside an invincibility window are not damaged.
        const HONOR_INVINCIBILITY = 1 << 0;
        /// Require an unobstructed line from the trigger origin to the target.
        const CONFIRM_LOS         = 1 << 1;
    }
}

impl Default for HandlerFlags {
    fn default() -> Self {
        Self::HONOR_INVINCIBILITY
    }
}

bitflags! {
    /// Trigger events a damage trigger reacts to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TriggerMode: u8 {
        const ENTER = 1 << 0;
        const STAY  = 1 << 1;
        const ALL   = Self::ENTER.bits() | Self::STAY.bits();
    }
}

impl Default for TriggerMode {
    fn default() -> Self {
        Self::ENTER
    }
}

/// Parameters of a damage trigger.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DamageHandlerConfig {
    pub min: f32,
    pub max: f32,
    pub types: DamageTypeSet,
    /// Minimum seconds between applications; `0` applies on every event.
    pub frequency: f32,
    pub flags: HandlerFlags,
    /// Layers that can obstruct the line-of-sight check.
    pub los_mask: LayerMask,
    /// Offset added to the target point for the line-of-sight check.
    pub target_offset: Vec3,
    pub trigger: TriggerMode,
}

impl DamageHandlerConfig {
    pub const DEFAULT_TARGET_OFFSET: Vec3 = Vec3::new(0.0, 0.5, 0.0);

    pub fn new(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_types(mut self, types: DamageTypeSet) -> Self {
        self.types = types;
        self
    }

    #[must_use]
    pub fn with_frequency(mut self, frequency: f32) -> Self {
        self.frequency = frequency;
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: HandlerFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_los(mut self, mask: LayerMask) -> Self {
        self.flags |= HandlerFlags::CONFIRM_LOS;
        self.los_mask = mask;
        self
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: TriggerMode) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn honor_invincibility(&self) -> bool {
        self.flags.contains(HandlerFlags::HONOR_INVINCIBILITY)
    }

    /// # Errors
    ///
    /// Rejects an inverted damage range and a negative or non-finite frequency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::ordered("damage_handler.damage", self.min, self.max)?;
        ConfigError::non_negative("damage_handler.frequency", self.frequency)
    }
}

impl Default for DamageHandlerConfig {
    fn default() -> Self {
        Self {
            min: 1.0,
            max: 1.0,
            types: DamageTypeSet::new(),
            frequency: 0.0,
            flags: HandlerFlags::default(),
            los_mask: LayerMask::NONE,
            target_offset: Self::DEFAULT_TARGET_OFFSET,
            trigger: TriggerMode::default(),
        }
    }
}
