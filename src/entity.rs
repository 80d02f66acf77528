use serde::{Deserialize, Serialize};

use crate::TextSpan;

/// Kind of a recognized mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Person,
    Organization,
    Date,
    Amount,
    StatuteCitation,
    /// Case, docket or citation numbers
    Identifier,
}

/// A recognized mention with its location and normalized value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub span: TextSpan,
    pub text: String,
    pub normalized: String,
}

impl Entity {
    pub fn new(
        kind: EntityKind,
        span: TextSpan,
        text: impl Into<String>,
        normalized: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
            normalized: normalized.into(),
        }
    }
}
