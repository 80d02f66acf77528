//! Stage identifiers and the analyzer capability trait.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::StageError;

/// The fixed set of pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Interpret,
    Clauses,
    Sentiment,
    Sovereignty,
    Remedy,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Interpret,
        Stage::Clauses,
        Stage::Sentiment,
        Stage::Sovereignty,
        Stage::Remedy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Interpret => "interpret",
            Stage::Clauses => "clauses",
            Stage::Sentiment => "sentiment",
            Stage::Sovereignty => "sovereignty",
            Stage::Remedy => "remedy",
        }
    }

    /// Component name used for this stage's provenance entries.
    pub fn component(self) -> &'static str {
        match self {
            Stage::Interpret => "situation_interpreter",
            Stage::Clauses => "clause_extractor",
            Stage::Sentiment => "sentiment_assessor",
            Stage::Sovereignty => "sovereignty_scorer",
            Stage::Remedy => "remedy_synthesizer",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("unknown stage '{}'", name))
    }
}

/// One analysis capability.
///
/// Analyzers run on the blocking pool, so they are plain synchronous code and
/// must be shareable across threads.
pub trait Analyzer<I, O>: Send + Sync {
    fn analyze(&self, input: &I) -> Result<O, StageError>;
}
