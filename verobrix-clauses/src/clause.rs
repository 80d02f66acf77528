//! Clause classification.
//!
//! Each rule is a phrase matched on word boundaries against the case-folded
//! clause. The highest-confidence match wins; on a tie the rule declared
//! first wins, which orders categories as definition, penalty, obligation,
//! right, procedure.

use serde::{Deserialize, Serialize};
use verobrix::{contains_term, fold_case, matched_terms, Entity, Scored, TextSpan};

use crate::polarity::{PolarityContext, PolarityTracker};
use crate::sentence_boundary::SentenceSplitter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseCategory {
    Definition,
    Obligation,
    Right,
    Procedure,
    Penalty,
    Unclassified,
}

impl ClauseCategory {
    /// Whether clauses of these two categories can contradict each other.
    pub fn comparable(self, other: ClauseCategory) -> bool {
        if self == ClauseCategory::Unclassified || other == ClauseCategory::Unclassified {
            return false;
        }
        self == other || (self.is_normative() && other.is_normative())
    }

    fn is_normative(self) -> bool {
        matches!(
            self,
            ClauseCategory::Obligation
                | ClauseCategory::Right
                | ClauseCategory::Procedure
                | ClauseCategory::Penalty
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClauseImportance {
    Low,
    Medium,
    High,
}

/// A classified span of the input document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub index: usize,
    pub span: TextSpan,
    pub text: String,
    pub category: ClauseCategory,
    pub confidence: f64,
    /// Name of the rule that produced the category
    pub rule: Option<String>,
    pub importance: ClauseImportance,
    /// Indices into the situation's entity list of entities inside this clause
    pub entity_refs: Vec<usize>,
    /// Negation reading of the clause; negation spans are document offsets
    pub polarity: PolarityContext,
}

struct ClauseRule {
    category: ClauseCategory,
    name: &'static str,
    phrases: &'static [&'static str],
    confidence: f64,
}

const RULES: &[ClauseRule] = &[
    ClauseRule {
        category: ClauseCategory::Definition,
        name: "definition_copula",
        phrases: &["means", "shall mean", "defined as"],
        confidence: 0.95,
    },
    ClauseRule {
        category: ClauseCategory::Definition,
        name: "definition_reference",
        phrases: &["refers to"],
        confidence: 0.7,
    },
    ClauseRule {
        category: ClauseCategory::Penalty,
        name: "penalty_marker",
        phrases: &[
            "penalty", "penalties", "fine", "fined", "forfeit", "forfeiture", "liquidated damages",
            "liable for", "result in penalties", "face penalties", "punishable",
        ],
        confidence: 0.9,
    },
    ClauseRule {
        category: ClauseCategory::Obligation,
        name: "obligation_modal",
        phrases: &["shall", "must"],
        confidence: 0.9,
    },
    ClauseRule {
        category: ClauseCategory::Obligation,
        name: "obligation_requirement",
        phrases: &["required", "obligated", "mandatory"],
        confidence: 0.85,
    },
    ClauseRule {
        category: ClauseCategory::Right,
        name: "right_entitlement",
        phrases: &["entitled to", "right to", "rights to"],
        confidence: 0.85,
    },
    ClauseRule {
        category: ClauseCategory::Right,
        name: "right_permission",
        phrases: &["may", "permitted to", "allowed to"],
        confidence: 0.7,
    },
    ClauseRule {
        category: ClauseCategory::Procedure,
        name: "procedure_sequence",
        phrases: &[
            "prior to", "upon receipt", "thereafter", "followed by", "following", "procedure",
            "in accordance with", "first", "then",
        ],
        confidence: 0.7,
    },
];

const HIGH_IMPORTANCE_TERMS: &[&str] = &[
    "constitutional", "fundamental", "essential", "critical", "mandatory", "shall", "must",
    "required", "penalty", "fine", "damages", "liable", "breach", "default", "violation",
    "jurisdiction", "court", "legal",
];
const MEDIUM_IMPORTANCE_TERMS: &[&str] = &[
    "should", "ought", "recommended", "advisable", "appropriate", "reasonable", "proper",
    "suitable", "necessary",
];
const PENALTY_PHRASES: &[&str] = &["face penalties", "result in penalties", "penalties including"];

#[derive(Debug, Clone)]
pub struct ClauseClassifier {
    /// Matches below this confidence leave the clause unclassified
    pub min_confidence: f64,
}

impl Default for ClauseClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ClauseClassifier {
    pub fn new() -> Self {
        Self {
            min_confidence: 0.5,
        }
    }

    pub fn with_min_confidence(min_confidence: f64) -> Self {
        Self { min_confidence }
    }

    /// Classify a single clause. `folded` must come from [`fold_case`].
    pub fn classify(&self, folded: &str) -> Scored<ClauseCategory> {
        let mut best: Option<&ClauseRule> = None;
        for rule in RULES {
            let matched = rule.phrases.iter().any(|phrase| contains_term(folded, phrase));
            if matched && best.map_or(true, |b| rule.confidence > b.confidence) {
                best = Some(rule);
            }
        }

        match best {
            Some(rule) if rule.confidence >= self.min_confidence => {
                Scored::rule_based(rule.category, rule.confidence, rule.name)
            }
            _ => Scored::derived(ClauseCategory::Unclassified, 0.0),
        }
    }

    pub fn importance(&self, folded: &str) -> ClauseImportance {
        let high_count = matched_terms(folded, HIGH_IMPORTANCE_TERMS).len();
        let medium_count = matched_terms(folded, MEDIUM_IMPORTANCE_TERMS).len();
        let has_penalty_phrase = !matched_terms(folded, PENALTY_PHRASES).is_empty();

        if high_count >= 2 || has_penalty_phrase {
            ClauseImportance::High
        } else if high_count >= 1 || medium_count >= 2 {
            ClauseImportance::Medium
        } else {
            ClauseImportance::Low
        }
    }
}

/// Segments text into sentences and classifies each one.
#[derive(Debug, Default)]
pub struct ClauseExtractor {
    splitter: SentenceSplitter,
    classifier: ClauseClassifier,
}

impl ClauseExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_splitter(mut self, splitter: SentenceSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    pub fn with_classifier(mut self, classifier: ClauseClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Extract clauses from `text`, linking each to the `entities` it contains.
    pub fn extract(&self, text: &str, entities: &[Entity]) -> Vec<Clause> {
        let folded = fold_case(text);

        self.splitter
            .split(text)
            .into_iter()
            .enumerate()
            .map(|(index, sentence)| {
                let span = sentence.span;
                let folded_clause = span.slice(&folded);
                let scored = self.classifier.classify(folded_clause);
                let entity_refs = entities
                    .iter()
                    .enumerate()
                    .filter(|(_, entity)| span.contains(&entity.span))
                    .map(|(idx, _)| idx)
                    .collect();
                let mut polarity = PolarityTracker::scan(span.slice(text)).polarity();
                for negation in &mut polarity.negation_spans {
                    *negation = negation.offset(span.start);
                }

                Clause {
                    index,
                    span,
                    text: span.slice(text).to_string(),
                    category: scored.value,
                    confidence: scored.confidence,
                    rule: scored.rule_name().map(str::to_string),
                    importance: self.classifier.importance(folded_clause),
                    entity_refs,
                    polarity,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Scored<ClauseCategory> {
        ClauseClassifier::new().classify(&fold_case(text))
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            classify("\"Fee\" means the amount stated in Schedule A.").value,
            ClauseCategory::Definition
        );
        assert_eq!(
            classify("The Tenant shall pay rent monthly.").value,
            ClauseCategory::Obligation
        );
        assert_eq!(
            classify("The Tenant is entitled to a refund.").value,
            ClauseCategory::Right
        );
        assert_eq!(
            classify("Thereafter the clerk schedules a hearing.").value,
            ClauseCategory::Procedure
        );
        assert_eq!(
            classify("Late payment results in a fine of $50.").value,
            ClauseCategory::Penalty
        );
    }

    #[test]
    fn test_highest_confidence_wins() {
        // "may" (0.7) loses to "required" (0.85)
        let scored = classify("You may be required to appear.");
        assert_eq!(scored.value, ClauseCategory::Obligation);
        assert_eq!(scored.rule_name(), Some("obligation_requirement"));
        assert_eq!(scored.confidence, 0.85);
    }

    #[test]
    fn test_ties_follow_declaration_order() {
        // penalty (0.9) and "must" (0.9) tie; penalty is declared first
        let scored = classify("You must pay the penalty.");
        assert_eq!(scored.value, ClauseCategory::Penalty);
    }

    #[test]
    fn test_no_match_or_low_confidence_is_unclassified() {
        let scored = classify("The weather was pleasant.");
        assert_eq!(scored.value, ClauseCategory::Unclassified);
        assert_eq!(scored.confidence, 0.0);
        assert_eq!(scored.rule_name(), None);

        let strict = ClauseClassifier::with_min_confidence(0.8);
        assert_eq!(
            strict.classify("you may leave").value,
            ClauseCategory::Unclassified
        );
    }

    #[test]
    fn test_importance() {
        let classifier = ClauseClassifier::new();
        assert_eq!(
            classifier.importance("the court shall impose a penalty"),
            ClauseImportance::High
        );
        assert_eq!(
            classifier.importance("the tenant must pay"),
            ClauseImportance::Medium
        );
        assert_eq!(
            classifier.importance("the sky is blue"),
            ClauseImportance::Low
        );
    }

    #[test]
    fn test_comparable_categories() {
        use ClauseCategory::*;
        assert!(Obligation.comparable(Right));
        assert!(Penalty.comparable(Procedure));
        assert!(Definition.comparable(Definition));
        assert!(!Definition.comparable(Obligation));
        assert!(!Unclassified.comparable(Unclassified));
    }
}
