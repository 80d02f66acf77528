//! `Scored<T>` infrastructure for confidence-carrying results.
//!
//! The [`Scored<T>`] wrapper pairs a value with a confidence in `[0.0, 1.0]`
//! and records where that confidence came from via [`ScoreSource`]:
//! - Rule-based phrase and pattern matches
//! - Pluggable comparators (for example the semantic contradiction pass)
//! - Values derived from combining other scores

use std::fmt;

/// A value with an associated confidence score.
///
/// # Example
/// ```
/// use verobrix::{Scored, ScoreSource};
///
/// let category = Scored::rule_based("obligation", 0.9, "obligation:must");
/// assert_eq!(category.confidence, 0.9);
/// assert!(matches!(category.source, ScoreSource::RuleBased { .. }));
///
/// // Confidence is always clamped into [0, 1]
/// let clamped = Scored::derived("x", 1.7);
/// assert_eq!(clamped.confidence, 1.0);
/// ```
#[derive(Clone)]
pub struct Scored<T> {
    /// The actual value
    pub value: T,
    /// Confidence score from 0.0 to 1.0
    pub confidence: f64,
    /// Where this score came from
    pub source: ScoreSource,
}

/// The source of a confidence score.
#[derive(Clone, Debug, PartialEq)]
pub enum ScoreSource {
    /// Score produced by a rule-based formula or phrase match
    RuleBased {
        /// Name of the rule that produced this score
        rule_name: String,
    },
    /// Score produced by a named, swappable comparator
    Comparator {
        /// Comparator identifier
        name: String,
    },
    /// Score derived from combining other scores
    Derived,
}

impl<T> Scored<T> {
    /// Create a new scored value with explicit confidence and source.
    ///
    /// Non-finite confidences collapse to `0.0`.
    pub fn new(value: T, confidence: f64, source: ScoreSource) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            value,
            confidence,
            source,
        }
    }

    /// Create a scored value from a rule-based formula.
    pub fn rule_based(value: T, confidence: f64, rule_name: &str) -> Self {
        Self::new(
            value,
            confidence,
            ScoreSource::RuleBased {
                rule_name: rule_name.to_string(),
            },
        )
    }

    /// Create a scored value produced by a named comparator.
    pub fn from_comparator(value: T, confidence: f64, name: &str) -> Self {
        Self::new(
            value,
            confidence,
            ScoreSource::Comparator {
                name: name.to_string(),
            },
        )
    }

    /// Create a derived scored value (from combining other scores).
    pub fn derived(value: T, confidence: f64) -> Self {
        Self::new(value, confidence, ScoreSource::Derived)
    }

    /// Name of the rule or comparator behind this score, if any.
    pub fn rule_name(&self) -> Option<&str> {
        match &self.source {
            ScoreSource::RuleBased { rule_name } => Some(rule_name),
            ScoreSource::Comparator { name } => Some(name),
            ScoreSource::Derived => None,
        }
    }

    /// Map the inner value while preserving confidence and source.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Scored<U> {
        Scored {
            value: f(self.value),
            confidence: self.confidence,
            source: self.source,
        }
    }

    /// Get a reference to the inner value.
    pub fn as_ref(&self) -> Scored<&T> {
        Scored {
            value: &self.value,
            confidence: self.confidence,
            source: self.source.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Scored<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Compact format for snapshot tests: Scored(value, conf: 0.85)
        write!(f, "Scored({:?}, conf: {:.2})", self.value, self.confidence)
    }
}

impl<T: PartialEq> PartialEq for Scored<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
            && (self.confidence - other.confidence).abs() < f64::EPSILON
            && self.source == other.source
    }
}
