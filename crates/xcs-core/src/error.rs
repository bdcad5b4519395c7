//! Error types for XCS

use thiserror::Error;

use crate::types::{Action, Feature};

/// Main error type for XCS
#[derive(Error, Debug, Clone, PartialEq)]
pub enum XcsError {
    #[error("Invalid perception: feature {value} at position {position} is not 0 or 1")]
    InvalidPerception { position: usize, value: Feature },

    #[error("Perception length mismatch: expected {expected}, found {found}")]
    PerceptionLength { expected: usize, found: usize },

    #[error("Action space must not be empty")]
    EmptyActionSpace,

    #[error("Duplicate action in action space: {0}")]
    DuplicateAction(Action),

    #[error("Unknown action: {0}")]
    UnknownAction(Action),

    #[error("Out of phase: {0}")]
    OutOfPhase(String),

    #[error("Malformed record: {0}")]
    Record(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for XCS operations
pub type Result<T> = std::result::Result<T, XcsError>;
