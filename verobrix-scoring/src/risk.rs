//! Deterministic risk assessment.
//!
//! The first matching rule sets the level:
//! 1. a contradiction with confidence ≥ 0.75 together with high urgency → high
//! 2. a high-severity risk term → high
//! 3. any contradiction, high urgency or a medium-severity risk term → medium
//! 4. concerning sentiment → medium
//! 5. otherwise → low
//!
//! Structural signals are checked before tone, so a favorable sentiment can
//! never lower a structurally risky document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use verobrix::{fold_case, matched_terms};
use verobrix_clauses::Contradiction;
use verobrix_situation::UrgencyLevel;

use crate::sentiment::{SentimentCategory, SentimentResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    Sentiment,
    Urgency,
    Contradictions,
    RiskTerms,
    Baseline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    /// Normalized contributions; the weights sum to 1
    pub factors: BTreeMap<RiskFactor, f64>,
    pub high_terms: Vec<String>,
    pub medium_terms: Vec<String>,
    /// Name of the rule that set the level
    pub rule: String,
}

impl RiskAssessment {
    pub fn baseline() -> Self {
        Self {
            level: RiskLevel::Low,
            factors: BTreeMap::from([(RiskFactor::Baseline, 1.0)]),
            high_terms: Vec::new(),
            medium_terms: Vec::new(),
            rule: "default_low".to_string(),
        }
    }

    pub fn weight(&self, factor: RiskFactor) -> f64 {
        self.factors.get(&factor).copied().unwrap_or(0.0)
    }
}

pub const HIGH_RISK_TERMS: &[&str] = &[
    "waiver", "indemnify", "liquidated damages", "arbitration", "non-compete",
    "personal guarantee", "seizure", "forfeiture",
];
pub const MEDIUM_RISK_TERMS: &[&str] = &[
    "penalty", "default", "termination", "modification", "lien", "late fee",
];

/// Contradiction confidence that counts as "high" for the first rule.
pub const HIGH_CONFIDENCE_CONTRADICTION: f64 = 0.75;

pub fn assess_risk(
    sentiment: &SentimentResult,
    urgency: UrgencyLevel,
    contradictions: &[Contradiction],
    text: &str,
) -> RiskAssessment {
    let folded = fold_case(text);
    let high_terms = matched_terms(&folded, HIGH_RISK_TERMS);
    let medium_terms = matched_terms(&folded, MEDIUM_RISK_TERMS);

    let strong_contradiction = contradictions
        .iter()
        .any(|c| c.confidence >= HIGH_CONFIDENCE_CONTRADICTION);
    let high_urgency = urgency == UrgencyLevel::High;

    let (level, rule) = if strong_contradiction && high_urgency {
        (RiskLevel::High, "contradiction_with_urgency")
    } else if !high_terms.is_empty() {
        (RiskLevel::High, "high_risk_term")
    } else if !contradictions.is_empty() || high_urgency || !medium_terms.is_empty() {
        (RiskLevel::Medium, "structural_signal")
    } else if sentiment.category == SentimentCategory::Concerning {
        (RiskLevel::Medium, "concerning_sentiment")
    } else {
        (RiskLevel::Low, "default_low")
    };

    let urgency_raw = match urgency {
        UrgencyLevel::High => 1.0,
        UrgencyLevel::Medium => 0.5,
        UrgencyLevel::Low => 0.0,
    };
    let raw = [
        (RiskFactor::Sentiment, (-sentiment.score).max(0.0)),
        (RiskFactor::Urgency, urgency_raw),
        (
            RiskFactor::Contradictions,
            contradictions.iter().map(|c| c.confidence).sum(),
        ),
        (
            RiskFactor::RiskTerms,
            high_terms.len() as f64 + 0.5 * medium_terms.len() as f64,
        ),
    ];

    RiskAssessment {
        level,
        factors: normalize_factors(&raw),
        high_terms: high_terms.iter().map(|t| t.to_string()).collect(),
        medium_terms: medium_terms.iter().map(|t| t.to_string()).collect(),
        rule: rule.to_string(),
    }
}

/// Scale positive contributions to sum to 1; baseline alone when none contribute.
fn normalize_factors(raw: &[(RiskFactor, f64)]) -> BTreeMap<RiskFactor, f64> {
    let total: f64 = raw
        .iter()
        .map(|(_, value)| value)
        .filter(|value| value.is_finite() && **value > 0.0)
        .sum();
    if total <= 0.0 {
        return BTreeMap::from([(RiskFactor::Baseline, 1.0)]);
    }
    raw.iter()
        .filter(|(_, value)| value.is_finite() && *value > 0.0)
        .map(|(factor, value)| (*factor, value / total))
        .collect()
}
