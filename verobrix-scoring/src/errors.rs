//! Error types for scoring configuration.

use thiserror::Error;

/// Errors raised while loading or validating a scoring rubric.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// The rubric file could not be read.
    #[error("failed to load rubric: {path}: {message}")]
    Load { path: String, message: String },

    /// The rubric is not valid TOML or has the wrong shape.
    #[error("failed to parse rubric: {0}")]
    Parse(#[from] toml::de::Error),

    /// The rubric parsed but its weights are unusable.
    #[error("invalid rubric: {message}")]
    InvalidRubric { message: String },
}

/// Result type for scoring operations.
pub type ScoringResult<T> = Result<T, ScoringError>;
