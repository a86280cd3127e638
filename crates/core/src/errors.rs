//! Core error types for the tracking engine.
//!
//! Classification, progress and projection functions never fail: unusual data
//! degrades to a status (`configuration_invalid`) instead of an error. The
//! types here cover the caller-facing operations that can legitimately be
//! refused: lifecycle commands, manual contributions, event validation and
//! configuration validation.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

use crate::targets::{GoalStatus, TargetKind};

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the tracking engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Target operation failed: {0}")]
    Target(#[from] TargetError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Validation errors for caller-supplied input.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

/// Errors raised by operations on a single target.
#[derive(Error, Debug)]
pub enum TargetError {
    #[error("Cannot move goal {target_id} from {from} to {to}")]
    InvalidTransition {
        target_id: String,
        from: GoalStatus,
        to: GoalStatus,
    },

    #[error("Operation '{operation}' is not supported for {kind} target {target_id}")]
    UnsupportedForKind {
        target_id: String,
        kind: TargetKind,
        operation: String,
    },

    #[error("Goal {0} is cancelled and no longer accepts contributions")]
    Cancelled(String),

    #[error("Milestone not found: {0}")]
    MilestoneNotFound(String),

    #[error("Milestone {0} is already achieved")]
    MilestoneAlreadyAchieved(String),
}

impl TargetError {
    /// Creates an UnsupportedForKind error.
    pub fn unsupported(
        target_id: impl Into<String>,
        kind: TargetKind,
        operation: impl Into<String>,
    ) -> Self {
        Self::UnsupportedForKind {
            target_id: target_id.into(),
            kind,
            operation: operation.into(),
        }
    }
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}
