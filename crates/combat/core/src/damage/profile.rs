use crate::error::ConfigError;

use super::tags::{DamageTag, DamageTypeSet};

/// One `{tag, multiplier}` entry of a weakness/immunity profile.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamagePair {
    pub tag: DamageTag,
    pub multiplier: f32,
}

impl DamagePair {
    pub fn new(tag: impl Into<String>, multiplier: f32) -> Self {
        Self {
            tag: DamageTag::new(tag),
            multiplier,
        }
    }
}

/// Per-actor damage modifiers.
///
/// Weakness entries multiply the rolled magnitude, immunity entries divide
/// it. Every entry whose tag appears in the request's tag set applies, in list
/// order; entries for tags absent from the request are ignored.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WeaknessImmunityProfile {
    pub weaknesses: Vec<DamagePair>,
    pub immunities: Vec<DamagePair>,
}

impl WeaknessImmunityProfile {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_weakness(mut self, tag: impl Into<String>, multiplier: f32) -> Self {
        self.weaknesses.push(DamagePair::new(tag, multiplier));
        self
    }

    #[must_use]
    pub fn with_immunity(mut self, tag: impl Into<String>, multiplier: f32) -> Self {
        self.immunities.push(DamagePair::new(tag, multiplier));
        self
    }

    /// Weakness entries matching any tag in `types`.
    pub fn matching_weaknesses<'a>(
        &'a self,
        types: &'a DamageTypeSet,
    ) -> impl Iterator<Item = &'a DamagePair> + 'a {
        self.weaknesses
            .iter()
            .filter(move |pair| types.contains(pair.tag.as_str()))
    }

    /// Immunity entries matching any tag in `types`.
    pub fn matching_immunities<'a>(
        &'a self,
        types: &'a DamageTypeSet,
    ) -> impl Iterator<Item = &'a DamagePair> + 'a {
        self.immunities
            .iter()
            .filter(move |pair| types.contains(pair.tag.as_str()))
    }

    /// Weakness multipliers must be finite and non-negative; immunity
    /// multipliers must be finite and strictly positive.
    ///
    /// # Errors
    ///
    /// Returns the first offending entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for pair in &self.weaknesses {
            if !(pair.multiplier.is_finite() && pair.multiplier >= 0.0) {
                return Err(ConfigError::InvalidWeaknessMultiplier {
                    tag: pair.tag.to_string(),
                    multiplier: pair.multiplier,
                });
            }
        }
        for pair in &self.immunities {
            if !(pair.multiplier.is_finite() && pair.multiplier > 0.0) {
                return Err(ConfigError::InvalidImmunityMultiplier {
                    tag: pair.tag.to_string(),
                    multiplier: pair.multiplier,
                });
            }
        }
        Ok(())
    }
}
