use crate::error::ConfigError;

/// Process-wide combat tunables.
///
/// One instance is handed to the [`DamageResolver`](crate::damage::DamageResolver)
/// and the damage trigger at construction; nothing reads these values through
/// global state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Scale applied to attacker power by stat-driven damage scaling.
    pub attack_scale: f32,
    /// Scale applied to defender defense by stat-driven damage scaling.
    pub defense_scale: f32,
    /// Smallest magnitude a damage request (min >= 0) can resolve to.
    pub min_damage: f32,
    /// Smallest healing magnitude a heal request (min < 0) can resolve to.
    pub min_heal: f32,
    /// When false, actors sharing an allegiance never damage each other.
    pub friendly_fire_allowed: bool,
    /// When true, every resolved damage magnitude is zero.
    pub god_mode_allowed: bool,
    /// Distance tolerance used when re-checking line of sight for an attack.
    pub invincibility_recheck_fudge: f32,
    /// Log every resolved direct-damage instruction at debug level.
    pub report_damage: bool,
}

impl CombatConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ATTACK_SCALE: f32 = 1.0;
    pub const DEFAULT_DEFENSE_SCALE: f32 = 1.0;
    pub const DEFAULT_MIN_DAMAGE: f32 = 1.0;
    pub const DEFAULT_MIN_HEAL: f32 = 1.0;
    pub const DEFAULT_RECHECK_FUDGE: f32 = 0.2;

    pub fn new() -> Self {
        Self {
            attack_scale: Self::DEFAULT_ATTACK_SCALE,
            defense_scale: Self::DEFAULT_DEFENSE_SCALE,
            min_damage: Self::DEFAULT_MIN_DAMAGE,
            min_heal: Self::DEFAULT_MIN_HEAL,
            friendly_fire_allowed: false,
            god_mode_allowed: false,
            invincibility_recheck_fudge: Self::DEFAULT_RECHECK_FUDGE,
            report_damage: false,
        }
    }

    #[must_use]
    pub fn with_min_damage(mut self, min_damage: f32) -> Self {
        self.min_damage = min_damage;
        self
    }

    #[must_use]
    pub fn with_min_heal(mut self, min_heal: f32) -> Self {
        self.min_heal = min_heal;
        self
    }

    #[must_use]
    pub fn with_friendly_fire(mut self, allowed: bool) -> Self {
        self.friendly_fire_allowed = allowed;
        self
    }

    #[must_use]
    pub fn with_god_mode(mut self, enabled: bool) -> Self {
        self.god_mode_allowed = enabled;
        self
    }

    /// Rejects negative minimums, non-positive scales and a negative fudge.
    ///
    /// # Errors
    ///
    /// Returns the first offending field as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::positive("attack_scale", self.attack_scale)?;
        ConfigError::positive("defense_scale", self.defense_scale)?;
        ConfigError::non_negative("min_damage", self.min_damage)?;
        ConfigError::non_negative("min_heal", self.min_heal)?;
        ConfigError::non_negative(
            "invincibility_recheck_fudge",
            self.invincibility_recheck_fudge,
        )?;
        Ok(())
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = CombatConfig::default();

        assert_eq!(config.min_damage, 1.0);
        assert_eq!(config.min_heal, 1.0);
        assert!(!config.friendly_fire_allowed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn negative_min_damage_is_rejected() {
        let config = CombatConfig::default().with_min_damage(-2.0);

        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeOrNonFinite {
                field: "min_damage",
                ..
            })
        ));
    }
}
