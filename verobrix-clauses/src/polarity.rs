//! Polarity tracking for clauses.
//!
//! Tracks negation count to determine overall polarity:
//! - Even negations = Positive polarity
//! - Odd negations = Negative polarity
//! - Ambiguous when a double-negative pattern is detected

use serde::{Deserialize, Serialize};
use verobrix::{words, TextSpan};

/// Polarity classification for a clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Affirmative meaning (even number of negations including 0)
    Positive,
    /// Negative meaning (odd number of negations)
    Negative,
    /// Ambiguous due to a double-negative pattern
    Ambiguous,
}

/// Context about how polarity was determined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolarityContext {
    pub polarity: Polarity,
    pub negation_count: usize,
    /// Spans of the negation words, relative to the analyzed text
    pub negation_spans: Vec<TextSpan>,
    pub has_double_negative: bool,
    /// Confidence score (0.0-1.0)
    pub confidence: f64,
    pub review_reason: Option<String>,
}

impl PolarityContext {
    pub fn positive() -> Self {
        Self {
            polarity: Polarity::Positive,
            negation_count: 0,
            negation_spans: Vec::new(),
            has_double_negative: false,
            confidence: 1.0,
            review_reason: None,
        }
    }
}

/// Double-negative patterns that require special handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoubleNegativePattern {
    /// "unless not"
    UnlessNot,
    /// "cannot fail to"
    CannotFailTo,
    /// "not without"
    NotWithout,
    /// "never not"
    NeverNot,
}

impl DoubleNegativePattern {
    pub fn description(&self) -> &'static str {
        match self {
            Self::UnlessNot => "Double negative: 'unless not' pattern",
            Self::CannotFailTo => "Double negative: 'cannot fail to' pattern",
            Self::NotWithout => "Double negative: 'not without' pattern",
            Self::NeverNot => "Double negative: 'never not' pattern",
        }
    }
}

/// Check if a word is a negation marker.
pub fn is_negation_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    matches!(
        lower.as_str(),
        "not" | "no" | "never" | "none" | "nothing" | "neither" | "nor" | "cannot"
    ) || lower.ends_with("n't")
        || lower.ends_with("n\u{2019}t")
}

/// Tracks polarity within a clause by counting negations
#[derive(Debug, Default)]
pub struct PolarityTracker {
    negations: Vec<(TextSpan, bool)>,
    double_negatives: Vec<DoubleNegativePattern>,
}

impl PolarityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a negation operator; `correlative` marks "neither"/"nor".
    pub fn add_negation(&mut self, span: TextSpan, correlative: bool) {
        self.negations.push((span, correlative));
    }

    pub fn add_double_negative(&mut self, pattern: DoubleNegativePattern) {
        self.double_negatives.push(pattern);
    }

    pub fn negation_count(&self) -> usize {
        self.negations.len()
    }

    /// Track every negation and double-negative pattern in `text`.
    pub fn scan(text: &str) -> Self {
        let mut tracker = Self::new();
        let tokens = words(text);
        let lower: Vec<String> = tokens.iter().map(|w| w.text.to_lowercase()).collect();

        for (i, word) in tokens.iter().enumerate() {
            if is_negation_word(word.text) {
                let correlative = matches!(lower[i].as_str(), "neither" | "nor");
                tracker.add_negation(word.span, correlative);
            }

            let next = |offset: usize| lower.get(i + offset).map(String::as_str);
            let pattern = match (lower[i].as_str(), next(1), next(2)) {
                ("unless", Some("not"), _) => Some(DoubleNegativePattern::UnlessNot),
                ("cannot" | "can't", Some("fail"), Some("to")) => {
                    Some(DoubleNegativePattern::CannotFailTo)
                }
                ("not", Some("without"), _) => Some(DoubleNegativePattern::NotWithout),
                ("never", Some("not"), _) => Some(DoubleNegativePattern::NeverNot),
                _ => None,
            };
            if let Some(pattern) = pattern {
                tracker.add_double_negative(pattern);
            }
        }

        tracker
    }

    /// Calculate polarity from tracked negations
    pub fn polarity(&self) -> PolarityContext {
        let negation_count = self.negations.len();
        let negation_spans: Vec<_> = self.negations.iter().map(|(s, _)| *s).collect();

        // Double negatives require review - don't auto-resolve
        if !self.double_negatives.is_empty() {
            let reasons: Vec<&str> = self
                .double_negatives
                .iter()
                .map(|p| p.description())
                .collect();
            return PolarityContext {
                polarity: Polarity::Ambiguous,
                negation_count,
                negation_spans,
                has_double_negative: true,
                confidence: 0.6,
                review_reason: Some(reasons.join("; ")),
            };
        }

        let polarity = if negation_count % 2 == 0 {
            Polarity::Positive
        } else {
            Polarity::Negative
        };

        if self.negations.iter().any(|(_, correlative)| *correlative) {
            return PolarityContext {
                polarity,
                negation_count,
                negation_spans,
                has_double_negative: false,
                confidence: 0.7,
                review_reason: Some("Correlative negation detected (neither...nor)".to_string()),
            };
        }

        let confidence = match negation_count {
            0 => 1.0,
            1 => 0.95,
            2 => 0.7,
            _ => 0.5,
        };
        let review_reason = (negation_count >= 2).then(|| {
            format!(
                "Multiple negations detected ({}) - verify polarity",
                negation_count
            )
        });

        PolarityContext {
            polarity,
            negation_count,
            negation_spans,
            has_double_negative: false,
            confidence,
            review_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polarity_of(text: &str) -> PolarityContext {
        PolarityTracker::scan(text).polarity()
    }

    #[test]
    fn test_no_negations_positive() {
        let ctx = polarity_of("All users must pay the fee.");
        assert_eq!(ctx.polarity, Polarity::Positive);
        assert_eq!(ctx.negation_count, 0);
        assert_eq!(ctx.confidence, 1.0);
        assert_eq!(ctx.review_reason, None);
    }

    #[test]
    fn test_single_negation_negative() {
        let text = "No user is required to pay the fee.";
        let ctx = polarity_of(text);
        assert_eq!(ctx.polarity, Polarity::Negative);
        assert_eq!(ctx.confidence, 0.95);
        assert_eq!(ctx.negation_spans[0].slice(text), "No");
    }

    #[test]
    fn test_contractions_count() {
        let ctx = polarity_of("The Tenant doesn't pay and won't leave.");
        assert_eq!(ctx.negation_count, 2);
        assert_eq!(ctx.polarity, Polarity::Positive);
        assert_eq!(ctx.confidence, 0.7);
        assert!(ctx.review_reason.is_some());
    }

    #[test]
    fn test_three_negations_suspicious() {
        let ctx = polarity_of("Never say no to nothing.");
        assert_eq!(ctx.polarity, Polarity::Negative);
        assert_eq!(ctx.confidence, 0.5);
    }

    #[test]
    fn test_double_negative_is_ambiguous() {
        let ctx = polarity_of("The Buyer cannot fail to notify the Seller.");
        assert_eq!(ctx.polarity, Polarity::Ambiguous);
        assert!(ctx.has_double_negative);
        assert_eq!(ctx.confidence, 0.6);
    }

    #[test]
    fn test_correlative_flags_review() {
        let ctx = polarity_of("Neither party may assign nor transfer the lease.");
        assert_eq!(ctx.polarity, Polarity::Positive);
        assert_eq!(ctx.confidence, 0.7);
        assert!(ctx.review_reason.unwrap().contains("neither"));
    }
}
