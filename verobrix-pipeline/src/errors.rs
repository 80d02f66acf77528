//! Error types for analysis runs.

use thiserror::Error;
use verobrix::DocumentError;
use verobrix_provenance::ProvenanceError;

use crate::stage::Stage;
use crate::state::InvalidTransition;

/// Why an analysis run did not produce a report.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The input was rejected before anything was recorded.
    #[error("invalid input: {0}")]
    Input(#[from] DocumentError),

    /// A fatal stage did not finish within its time budget.
    #[error("stage {stage} timed out after {timeout_ms} ms")]
    StageTimeout { stage: Stage, timeout_ms: u64 },

    /// A fatal stage returned an error or panicked.
    #[error("stage {stage} failed: {message}")]
    StageFailure { stage: Stage, message: String },

    /// The entries written by the run no longer chain.
    #[error("provenance chain broken at sequence {first_break}")]
    ChainIntegrity { first_break: u64 },

    /// The configuration was rejected before anything was recorded.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The provenance log could not record an entry.
    #[error("provenance error: {0}")]
    Provenance(#[source] ProvenanceError),

    /// The caller cancelled the run before `stage` started.
    #[error("run cancelled before stage {stage}")]
    Cancelled { stage: Stage },

    /// The run state machine refused a transition.
    #[error(transparent)]
    State(#[from] InvalidTransition),
}

impl From<ProvenanceError> for AnalysisError {
    fn from(error: ProvenanceError) -> Self {
        match error {
            ProvenanceError::ChainIntegrity { first_break } => {
                AnalysisError::ChainIntegrity { first_break }
            }
            other => AnalysisError::Provenance(other),
        }
    }
}

/// Errors raised while loading or validating an [`AnalysisConfig`](crate::AnalysisConfig).
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The config file could not be read.
    #[error("failed to load config: {path}: {message}")]
    Load { path: String, message: String },

    /// The config is not valid TOML or has the wrong shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override could not be parsed.
    #[error("invalid override {key}={value}: {message}")]
    Override {
        key: String,
        value: String,
        message: String,
    },

    /// A value is out of range.
    #[error("invalid config value for '{key}': {message}")]
    Invalid { key: &'static str, message: String },
}

/// A single analyzer's failure. Converted to a degraded default by the
/// orchestrator for every stage except interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    #[error("{message}")]
    Failed { message: String },

    #[error("analyzer panicked: {message}")]
    Panicked { message: String },
}

impl StageError {
    pub fn failed(message: impl Into<String>) -> Self {
        StageError::Failed {
            message: message.into(),
        }
    }
}

/// Result type for analysis runs.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigurationError>;
