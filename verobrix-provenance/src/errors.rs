//! Error types for the provenance log.

use thiserror::Error;

/// Errors raised while writing, loading or verifying the log.
#[derive(Debug, Error)]
pub enum ProvenanceError {
    /// The durable sink could not be read or written.
    #[error("provenance storage error: {0}")]
    Io(#[from] std::io::Error),

    /// An entry could not be serialized for hashing or storage.
    #[error("failed to serialize provenance entry: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A stored line could not be parsed back into an entry.
    #[error("corrupt provenance log at line {line}: {message}")]
    Corrupt { line: usize, message: String },

    /// A score was NaN or infinite and cannot be hashed reproducibly.
    #[error("score '{name}' is not a finite number")]
    InvalidScore { name: String },

    /// A writer panicked while holding the log lock.
    #[error("provenance log lock poisoned")]
    Poisoned,

    /// Verification found a divergence; the log is left untouched.
    #[error("provenance chain broken at sequence {first_break}")]
    ChainIntegrity { first_break: u64 },
}

/// Result type for provenance operations.
pub type ProvenanceResult<T> = Result<T, ProvenanceError>;
