//! Common error infrastructure for combat-core.
//!
//! Combat resolution deliberately has very few failure paths: a missing
//! target, a dead target, or an active invincibility window are expected
//! conditions and are handled as silent no-ops, never as errors. What remains
//! are configuration problems (rejected by `validate()` before content reaches
//! the simulation) and collaborator contract violations (logged, then
//! ignored).
//!
//! # Design Principles
//!
//! - **Guard and return**: expected absence never produces an error value
//! - **Severity Classification**: errors are categorized for recovery strategies
//! - **Stable codes**: every variant exposes a static error code for logs and tests

use crate::types::InstanceId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the frame can continue; the offending input is skipped
/// - **Validation**: invalid configuration that must be fixed before use
/// - **Internal**: unexpected state inconsistencies that require investigation
/// - **Fatal**: the simulation cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all combat-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait CombatError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Misconfigured tunables detected by `validate()`.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A value that must be finite and non-negative was not.
    #[error("{field} must be a finite, non-negative number (got {value})")]
    NegativeOrNonFinite { field: &'static str, value: f32 },

    /// A value that must be strictly positive was not.
    #[error("{field} must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: f32 },

    /// A `[min, max]` range with `min > max`.
    #[error("{field} range is inverted: min {min} > max {max}")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },

    /// An immunity multiplier that would divide by zero or flip the sign.
    #[error("immunity multiplier for damage type '{tag}' must be > 0 (got {multiplier})")]
    InvalidImmunityMultiplier { tag: String, multiplier: f32 },

    /// A weakness multiplier that is negative or not finite.
    #[error("weakness multiplier for damage type '{tag}' must be finite and >= 0 (got {multiplier})")]
    InvalidWeaknessMultiplier { tag: String, multiplier: f32 },
}

impl ConfigError {
    /// Checks that `value` is finite and `>= 0`.
    pub(crate) fn non_negative(field: &'static str, value: f32) -> Result<(), Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(Self::NegativeOrNonFinite { field, value })
        }
    }

    /// Checks that `value` is finite and `> 0`.
    pub(crate) fn positive(field: &'static str, value: f32) -> Result<(), Self> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(Self::NotPositive { field, value })
        }
    }

    /// Checks that `min <= max`.
    pub(crate) fn ordered(field: &'static str, min: f32, max: f32) -> Result<(), Self> {
        if min <= max {
            Ok(())
        } else {
            Err(Self::InvertedRange { field, min, max })
        }
    }
}

impl CombatError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NegativeOrNonFinite { .. } => "CONFIG_NEGATIVE_OR_NON_FINITE",
            Self::NotPositive { .. } => "CONFIG_NOT_POSITIVE",
            Self::InvertedRange { .. } => "CONFIG_INVERTED_RANGE",
            Self::InvalidImmunityMultiplier { .. } => "CONFIG_INVALID_IMMUNITY_MULTIPLIER",
            Self::InvalidWeaknessMultiplier { .. } => "CONFIG_INVALID_WEAKNESS_MULTIPLIER",
        }
    }
}

/// Contract violations by a collaborator (collision source, pool manager).
///
/// These are never returned to callers. Components log them at error level
/// and treat the offending input as a no-op so a release build keeps running.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContractViolation {
    /// A collision callback was delivered without a collider record.
    #[error("collision delivered to {instance} without a collider")]
    MissingCollider { instance: InstanceId },
}

impl ContractViolation {
    /// Logs the violation. Release builds continue; callers return early.
    pub fn report(&self) {
        tracing::error!(
            target: "combat::contract",
            code = self.error_code(),
            "{}",
            self
        );
    }
}

impl CombatError for ContractViolation {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingCollider { .. } => "CONTRACT_MISSING_COLLIDER",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_validation_errors() {
        let err = ConfigError::non_negative("lifetime", -1.0).unwrap_err();

        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert_eq!(err.error_code(), "CONFIG_NEGATIVE_OR_NON_FINITE");
        assert!(err.to_string().contains("lifetime"));
    }

    #[test]
    fn nan_is_rejected_by_range_checks() {
        assert!(ConfigError::positive("speed", f32::NAN).is_err());
        assert!(ConfigError::non_negative("speed", f32::INFINITY).is_err());
        assert!(ConfigError::ordered("damage", 1.0, 1.0).is_ok());
    }
}
