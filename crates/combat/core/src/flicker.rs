//! Visibility flicker driven by explicit deadlines.
//!
//! A [`Flicker`] toggles a [`Visuals`] set either twice ("flicker once") or
//! repeatedly for a fixed duration, one toggle every `rate` seconds. The
//! owner polls it each tick; missed toggles are caught up in order so a long
//! frame behaves like several short ones.

use crate::error::ConfigError;

/// Flicker timing.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlickerConfig {
    /// Total flicker duration in seconds (ignored when `once` is set).
    pub time: f32,
    /// Seconds between toggles.
    pub rate: f32,
    /// Toggle exactly twice instead of flickering for `time`.
    pub once: bool,
}

impl FlickerConfig {
    pub const DEFAULT_TIME: f32 = 0.75;
    pub const DEFAULT_RATE: f32 = 0.05;

    /// Rejects a non-positive rate and a negative duration.
    ///
    /// # Errors
    ///
    /// Returns the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::positive("flicker.rate", self.rate)?;
        ConfigError::non_negative("flicker.time", self.time)
    }
}

impl Default for FlickerConfig {
    fn default() -> Self {
        Self {
            time: Self::DEFAULT_TIME,
            rate: Self::DEFAULT_RATE,
            once: false,
        }
    }
}

/// Result of polling a flicker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlickerStep {
    /// Not running.
    Idle,
    /// Running, next toggle not due yet.
    Waiting,
    /// Visuals must be toggled now.
    Toggle,
    /// The flicker completed (or was cut short by death) on this poll.
    Finished,
}

/// Deadline-driven flicker state machine.
#[derive(Clone, Debug, PartialEq)]
pub struct Flicker {
    config: FlickerConfig,
    started_at: f64,
    next_due: Option<f64>,
    toggles: u32,
}

impl Flicker {
    pub fn new(config: FlickerConfig) -> Self {
        Self {
            config,
            started_at: 0.0,
            next_due: None,
            toggles: 0,
        }
    }

    pub fn config(&self) -> &FlickerConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn toggles(&self) -> u32 {
        self.toggles
    }

    /// Starts (or restarts) the flicker. The first toggle is due immediately.
    pub fn start(&mut self, now: f64) {
        self.started_at = now;
        self.next_due = Some(now);
        self.toggles = 0;
    }

    /// Stops without finishing. The owner restores visuals itself.
    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Advances to `now`.
    ///
    /// Call repeatedly until it stops returning [`FlickerStep::Toggle`].
    /// `target_dead` ends the flicker at the next iteration boundary.
    pub fn poll(&mut self, now: f64, target_dead: bool) -> FlickerStep {
        let Some(due) = self.next_due else {
            return FlickerStep::Idle;
        };
        if now < due {
            return FlickerStep::Waiting;
        }

        let done = if self.config.once {
            self.toggles >= 2
        } else {
            due - self.started_at >= f64::from(self.config.time)
        };
        if done || target_dead {
            self.next_due = None;
            return FlickerStep::Finished;
        }

        self.toggles += 1;
        self.next_due = Some(due + f64::from(self.config.rate.max(f32::EPSILON)));
        FlickerStep::Toggle
    }
}

/// On/off state of an actor's renderers and hit-flash overlays.
///
/// Defaults: every sprite shown, every flash hidden.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Visuals {
    pub sprites: Vec<bool>,
    pub flashes: Vec<bool>,
}

impl Visuals {
    /// `sprites` renderers (shown) and `flashes` overlays (hidden).
    pub fn new(sprites: usize, flashes: usize) -> Self {
        Self {
            sprites: vec![true; sprites],
            flashes: vec![false; flashes],
        }
    }

    /// Flips every sprite and flash.
    pub fn toggle(&mut self) {
        for enabled in self.sprites.iter_mut().chain(self.flashes.iter_mut()) {
            *enabled = !*enabled;
        }
    }

    pub fn restore_defaults(&mut self) {
        self.sprites.fill(true);
        self.flashes.fill(false);
    }

    pub fn is_default(&self) -> bool {
        self.sprites.iter().all(|&on| on) && self.flashes.iter().all(|&on| !on)
    }
}
