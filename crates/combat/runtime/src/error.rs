//! Errors surfaced by the combat runtime.
//!
//! Expected absences inside a frame (missing targets, dead actors) never
//! reach this type; they are silent no-ops in the core. What remains are
//! setup problems and commands that name things the world does not have.

use combat_content::ContentError;
use combat_core::{CombatError, ConfigError, EntityId, ErrorSeverity};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("tick rate must be positive")]
    InvalidTickRate,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("unknown actor '{name}'")]
    UnknownActor { name: String },

    #[error("entity {entity} is not registered")]
    UnknownEntity { entity: EntityId },

    #[error("entity {entity} has no beam running")]
    NoActiveBeam { entity: EntityId },
}

impl CombatError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidTickRate | Self::Config(_) | Self::Content(_) => ErrorSeverity::Validation,
            Self::UnknownActor { .. } | Self::UnknownEntity { .. } | Self::NoActiveBeam { .. } => {
                ErrorSeverity::Recoverable
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTickRate => "RUNTIME_INVALID_TICK_RATE",
            Self::Config(err) => err.error_code(),
            Self::Content(_) => "RUNTIME_CONTENT",
            Self::UnknownActor { .. } => "RUNTIME_UNKNOWN_ACTOR",
            Self::UnknownEntity { .. } => "RUNTIME_UNKNOWN_ENTITY",
            Self::NoActiveBeam { .. } => "RUNTIME_NO_ACTIVE_BEAM",
        }
    }
}
