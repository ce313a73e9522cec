//! Domain models for the labeling system.

mod difficulty;
mod doctor;
mod label;
mod whitelist;

pub use difficulty::*;
pub use doctor::*;
pub use label::*;
pub use whitelist::*;

use thiserror::Error;

/// Input rejected at the boundary, before anything is written.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Doctor ID is empty")]
    EmptyIdentifier,

    #[error("Image filename is empty")]
    EmptyFilename,

    #[error("Unknown difficulty level: {0:?}")]
    UnknownDifficulty(String),

    #[error("Malformed field {field}: {reason}")]
    MalformedField { field: String, reason: String },
}

pub type ValidationResult<T> = Result<T, ValidationError>;
