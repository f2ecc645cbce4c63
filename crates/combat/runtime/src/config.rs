use combat_core::CombatConfig;

use crate::error::{Result, RuntimeError};

/// Runtime configuration shared by the world and the event bus.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub combat: CombatConfig,
    /// Capacity of each event bus topic.
    pub event_buffer_size: usize,
    /// Fixed simulation ticks per second.
    pub tick_rate: u32,
    /// Seed of the damage roll generator.
    pub seed: u64,
    /// Downward acceleration applied to stunned, non-kinematic bodies.
    pub gravity: f32,
    /// Projectiles farther than this from the origin are culled.
    pub cull_distance: f32,
}

impl RuntimeConfig {
    pub const DEFAULT_TICK_RATE: u32 = 60;
    pub const DEFAULT_GRAVITY: f32 = 9.81;
    pub const DEFAULT_CULL_DISTANCE: f32 = 200.0;

    #[must_use]
    pub fn with_combat(mut self, combat: CombatConfig) -> Self {
        self.combat = combat;
        self
    }

    #[must_use]
    pub fn with_tick_rate(mut self, tick_rate: u32) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Seconds per tick.
    pub fn tick_delta(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_rate == 0 {
            return Err(RuntimeError::InvalidTickRate);
        }
        self.combat.validate()?;
        Ok(())
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            combat: CombatConfig::default(),
            event_buffer_size: 256,
            tick_rate: Self::DEFAULT_TICK_RATE,
            seed: 0x853c_49e6_748f_ea9b,
            gravity: Self::DEFAULT_GRAVITY,
            cull_distance: Self::DEFAULT_CULL_DISTANCE,
        }
    }
}
