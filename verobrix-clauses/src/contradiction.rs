//! Contradiction detection between clauses of one document.
//!
//! Two passes run over every pair of clauses in comparable categories:
//!
//! - **Pattern pass**: polarity mismatches on the same subject, opposing
//!   marker pairs ("all" vs "no"), conflicting definitions of one term, and
//!   one section referenced with opposing precedence
//! - **Semantic pass**: a swappable [`SemanticComparator`] scores pairs that
//!   share an entity or a subject
//!
//! Findings on the same clause pair are merged, keeping the strongest.
//!
//! # Example
//!
//! ```
//! use verobrix_clauses::{ClauseExtractor, ContradictionEngine, ContradictionKind};
//!
//! let text = "All users must pay the fee. No user is required to pay the fee.";
//! let clauses = ClauseExtractor::new().extract(text, &[]);
//! let found = ContradictionEngine::new().detect(&clauses);
//! assert_eq!(found[0].kind, ContradictionKind::Logical);
//! assert!(found[0].confidence >= 0.6);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use verobrix::{fold_case, matched_terms, Scored};

use crate::clause::Clause;
use crate::normalizer::{jaccard, ClauseFacts, ClauseNormalizer, Modality};
use crate::polarity::Polarity;

/// The type of conflict between two clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionKind {
    /// The clauses cannot both hold
    Logical,
    /// One term defined twice with different meanings
    Definitional,
    /// One section both deferred to and overridden
    CrossReference,
}

/// A detected conflict between two clauses, with `clause_a < clause_b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contradiction {
    pub clause_a: usize,
    pub clause_b: usize,
    pub kind: ContradictionKind,
    pub confidence: f64,
    pub rationale: String,
}

impl Contradiction {
    /// Creates a new contradiction with the clause indices in ascending order.
    pub fn new(
        clause_a: usize,
        clause_b: usize,
        kind: ContradictionKind,
        confidence: f64,
        rationale: impl Into<String>,
    ) -> Self {
        let (clause_a, clause_b) = if clause_a <= clause_b {
            (clause_a, clause_b)
        } else {
            (clause_b, clause_a)
        };
        Self {
            clause_a,
            clause_b,
            kind,
            confidence,
            rationale: rationale.into(),
        }
    }
}

/// Scores how strongly two normalized clauses conflict.
pub trait SemanticComparator: Send + Sync {
    fn name(&self) -> &str;

    /// Conflict confidence in `[0, 1]`; 0 when the clauses are compatible.
    fn compare(&self, a: &ClauseFacts, b: &ClauseFacts) -> f64;
}

/// Default comparator: action similarity × modality exclusivity × 0.85.
#[derive(Debug, Clone)]
pub struct PredicateComparator {
    /// Pairs whose actions are less similar than this are not compared
    pub min_similarity: f64,
    pub scale: f64,
}

impl Default for PredicateComparator {
    fn default() -> Self {
        Self {
            min_similarity: 0.4,
            scale: 0.85,
        }
    }
}

impl PredicateComparator {
    /// How mutually exclusive two (modality, polarity) readings are.
    pub fn exclusivity(a: (Modality, Polarity), b: (Modality, Polarity)) -> f64 {
        if a.1 == Polarity::Ambiguous || b.1 == Polarity::Ambiguous {
            return 0.0;
        }
        if a.0 == b.0 && a.0 != Modality::None && a.1 != b.1 {
            return 1.0;
        }

        let pair = |x: (Modality, Polarity), y: (Modality, Polarity)| {
            (a == x && b == y) || (a == y && b == x)
        };
        let obligation = (Modality::Obligation, Polarity::Positive);
        let permission = (Modality::Permission, Polarity::Positive);
        let prohibition = (Modality::Prohibition, Polarity::Positive);

        if pair(obligation, prohibition) {
            1.0
        } else if pair(permission, prohibition) {
            0.9
        } else if pair(obligation, permission) {
            0.6
        } else {
            0.0
        }
    }
}

impl SemanticComparator for PredicateComparator {
    fn name(&self) -> &str {
        "predicate"
    }

    fn compare(&self, a: &ClauseFacts, b: &ClauseFacts) -> f64 {
        let similarity = jaccard(&a.action, &b.action);
        if similarity < self.min_similarity {
            return 0.0;
        }
        let exclusivity = Self::exclusivity(
            (a.modality, a.polarity.polarity),
            (b.modality, b.polarity.polarity),
        );
        similarity * exclusivity * self.scale
    }
}

/// Opposing marker pairs: (left terms, right terms).
const MARKER_PAIRS: &[(&[&str], &[&str])] = &[
    (
        &["must", "shall", "required", "mandatory"],
        &["must not", "shall not", "not required", "optional"],
    ),
    (&["all", "every", "each"], &["no", "none", "not any"]),
    (&["include", "includes", "included"], &["exclude", "excludes", "excluded", "not include"]),
    (
        &["permit", "permits", "permitted", "allow", "allows", "allowed"],
        &["prohibit", "prohibits", "prohibited", "forbid", "forbidden"],
    ),
    (&["before", "prior to"], &["after", "following", "subsequent to"]),
    (&["immediate", "immediately", "forthwith"], &["delayed", "postponed", "deferred"]),
    (&["maximum", "at most", "no more than"], &["minimum", "at least", "no less than"]),
    (&["increase", "raise"], &["decrease", "lower", "reduce"]),
];

const POLARITY_WEIGHT: f64 = 0.8;
const MARKER_WEIGHT: f64 = 0.8;
const CROSS_REFERENCE_CONFIDENCE: f64 = 0.65;

/// Detects contradictions among extracted clauses.
pub struct ContradictionEngine {
    /// Findings below this confidence are discarded
    pub threshold: f64,
    /// Action (Jaccard) similarity needed to treat two clauses as "same action"
    pub similarity_threshold: f64,
    normalizer: ClauseNormalizer,
    comparator: Box<dyn SemanticComparator>,
}

impl fmt::Debug for ContradictionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContradictionEngine")
            .field("threshold", &self.threshold)
            .field("similarity_threshold", &self.similarity_threshold)
            .field("comparator", &self.comparator.name())
            .finish()
    }
}

impl Default for ContradictionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ContradictionEngine {
    pub fn new() -> Self {
        Self {
            threshold: 0.6,
            similarity_threshold: 0.5,
            normalizer: ClauseNormalizer::new(),
            comparator: Box::new(PredicateComparator::default()),
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_comparator(mut self, comparator: Box<dyn SemanticComparator>) -> Self {
        self.comparator = comparator;
        self
    }

    /// Contradictions sorted by descending confidence, then ascending clause index.
    pub fn detect(&self, clauses: &[Clause]) -> Vec<Contradiction> {
        self.detect_with_threshold(clauses, self.threshold)
    }

    /// Like [`detect`](Self::detect), with a per-call confidence cutoff.
    pub fn detect_with_threshold(&self, clauses: &[Clause], threshold: f64) -> Vec<Contradiction> {
        let facts: Vec<ClauseFacts> = clauses
            .iter()
            .map(|clause| self.normalizer.normalize(&clause.text))
            .collect();
        let folded: Vec<String> = clauses.iter().map(|clause| fold_case(&clause.text)).collect();

        let mut findings = Vec::new();
        for i in 0..clauses.len() {
            for j in (i + 1)..clauses.len() {
                let (a, b) = (&clauses[i], &clauses[j]);
                if !a.category.comparable(b.category) {
                    continue;
                }

                findings.extend(self.polarity_mismatch(a, b, &facts[i], &facts[j]));
                findings.extend(self.opposing_markers(a, b, &folded[i], &folded[j], &facts[i], &facts[j]));
                findings.extend(self.conflicting_definitions(a, b, &facts[i], &facts[j]));
                findings.extend(self.opposing_precedence(a, b, &facts[i], &facts[j]));
                findings.extend(self.semantic(a, b, &facts[i], &facts[j], threshold));
            }
        }

        merge_findings(findings, threshold)
    }

    fn polarity_mismatch(
        &self,
        a: &Clause,
        b: &Clause,
        fa: &ClauseFacts,
        fb: &ClauseFacts,
    ) -> Option<Scored<Contradiction>> {
        let subject = fa.subject.as_ref()?;
        if fb.subject.as_ref() != Some(subject) {
            return None;
        }
        let opposed = matches!(
            (fa.polarity.polarity, fb.polarity.polarity),
            (Polarity::Positive, Polarity::Negative) | (Polarity::Negative, Polarity::Positive)
        );
        if !opposed {
            return None;
        }

        let similarity = jaccard(&fa.action, &fb.action);
        if similarity < self.similarity_threshold {
            return None;
        }

        let confidence = POLARITY_WEIGHT
            * fa.polarity.confidence.min(fb.polarity.confidence)
            * (0.5 + 0.5 * similarity);
        let rationale = format!(
            "'{} {}' is {:?} in clause {} but {:?} in clause {}",
            subject,
            fa.action.join(" "),
            fa.polarity.polarity,
            a.index,
            fb.polarity.polarity,
            b.index
        );
        Some(Scored::rule_based(
            Contradiction::new(a.index, b.index, ContradictionKind::Logical, confidence, rationale),
            confidence,
            "polarity_mismatch",
        ))
    }

    fn opposing_markers(
        &self,
        a: &Clause,
        b: &Clause,
        folded_a: &str,
        folded_b: &str,
        fa: &ClauseFacts,
        fb: &ClauseFacts,
    ) -> Option<Scored<Contradiction>> {
        if !same_party(a, b, fa, fb) {
            return None;
        }
        let similarity = jaccard(&fa.action, &fb.action);
        if similarity < self.similarity_threshold {
            return None;
        }

        MARKER_PAIRS.iter().find_map(|(left, right)| {
            let side = |folded: &str| {
                let l = matched_terms(folded, left);
                let r = matched_terms(folded, right);
                (l.first().copied(), r.first().copied())
            };
            let (a_left, a_right) = side(folded_a);
            let (b_left, b_right) = side(folded_b);

            let (first, second) = match (a_left, a_right, b_left, b_right) {
                (Some(l), None, None, Some(r)) => (l, r),
                (None, Some(r), Some(l), None) => (r, l),
                _ => return None,
            };

            let confidence = MARKER_WEIGHT * (0.5 + 0.5 * similarity);
            let rationale = format!(
                "opposing markers '{}' (clause {}) and '{}' (clause {})",
                first, a.index, second, b.index
            );
            Some(Scored::rule_based(
                Contradiction::new(a.index, b.index, ContradictionKind::Logical, confidence, rationale),
                confidence,
                "opposing_markers",
            ))
        })
    }

    fn conflicting_definitions(
        &self,
        a: &Clause,
        b: &Clause,
        fa: &ClauseFacts,
        fb: &ClauseFacts,
    ) -> Option<Scored<Contradiction>> {
        let term = fa.defined_term.as_ref()?;
        if fb.defined_term.as_ref() != Some(term) {
            return None;
        }
        let similarity = jaccard(&fa.definiens, &fb.definiens);
        if similarity >= 0.5 {
            return None;
        }

        let confidence = 0.6 + 0.3 * (1.0 - similarity);
        let rationale = format!(
            "'{}' is defined differently in clauses {} and {}",
            term, a.index, b.index
        );
        Some(Scored::rule_based(
            Contradiction::new(
                a.index,
                b.index,
                ContradictionKind::Definitional,
                confidence,
                rationale,
            ),
            confidence,
            "conflicting_definitions",
        ))
    }

    fn opposing_precedence(
        &self,
        a: &Clause,
        b: &Clause,
        fa: &ClauseFacts,
        fb: &ClauseFacts,
    ) -> Option<Scored<Contradiction>> {
        let (ref_a, _) = fa
            .section_refs
            .iter()
            .flat_map(|ra| fb.section_refs.iter().map(move |rb| (ra, rb)))
            .find(|(ra, rb)| ra.section == rb.section && ra.precedence != rb.precedence)?;

        let rationale = format!(
            "section {} is given opposing precedence in clauses {} and {}",
            ref_a.section, a.index, b.index
        );
        Some(Scored::rule_based(
            Contradiction::new(
                a.index,
                b.index,
                ContradictionKind::CrossReference,
                CROSS_REFERENCE_CONFIDENCE,
                rationale,
            ),
            CROSS_REFERENCE_CONFIDENCE,
            "opposing_precedence",
        ))
    }

    fn semantic(
        &self,
        a: &Clause,
        b: &Clause,
        fa: &ClauseFacts,
        fb: &ClauseFacts,
        threshold: f64,
    ) -> Option<Scored<Contradiction>> {
        if !same_party(a, b, fa, fb) {
            return None;
        }

        let confidence = self.comparator.compare(fa, fb);
        if confidence < threshold {
            return None;
        }

        let name = self.comparator.name();
        let rationale = format!(
            "{} comparator: clauses {} and {} make conflicting claims about '{}'",
            name,
            a.index,
            b.index,
            fa.action.join(" ")
        );
        Some(Scored::from_comparator(
            Contradiction::new(a.index, b.index, ContradictionKind::Logical, confidence, rationale),
            confidence,
            name,
        ))
    }
}

/// Both clauses speak about one party: a shared normalized subject or a
/// shared entity.
fn same_party(a: &Clause, b: &Clause, fa: &ClauseFacts, fb: &ClauseFacts) -> bool {
    let shares_subject = fa.subject.is_some() && fa.subject == fb.subject;
    shares_subject || a.entity_refs.iter().any(|e| b.entity_refs.contains(e))
}

/// Merge findings per clause pair and order the result.
///
/// The strongest finding's kind and confidence are kept and distinct
/// rationales are joined with "; ".
fn merge_findings(findings: Vec<Scored<Contradiction>>, threshold: f64) -> Vec<Contradiction> {
    let mut merged: BTreeMap<(usize, usize), (Contradiction, Vec<String>)> = BTreeMap::new();

    for finding in findings {
        let Scored {
            value, confidence, ..
        } = finding;
        let key = (value.clause_a, value.clause_b);
        match merged.get_mut(&key) {
            Some((best, rationales)) => {
                if !rationales.contains(&value.rationale) {
                    rationales.push(value.rationale.clone());
                }
                if confidence > best.confidence {
                    best.kind = value.kind;
                    best.confidence = confidence;
                }
            }
            None => {
                let rationales = vec![value.rationale.clone()];
                let mut best = value;
                best.confidence = confidence;
                merged.insert(key, (best, rationales));
            }
        }
    }

    let mut contradictions: Vec<Contradiction> = merged
        .into_values()
        .filter(|(best, _)| best.confidence >= threshold)
        .map(|(mut best, rationales)| {
            best.rationale = rationales.join("; ");
            best
        })
        .collect();

    contradictions.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then(a.clause_a.cmp(&b.clause_a))
            .then(a.clause_b.cmp(&b.clause_b))
    });
    contradictions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(modality: Modality, polarity: Polarity, action: &[&str]) -> ClauseFacts {
        let mut polarity_ctx = crate::polarity::PolarityContext::positive();
        polarity_ctx.polarity = polarity;
        ClauseFacts {
            subject: Some("user".to_string()),
            modality,
            polarity: polarity_ctx,
            action: action.iter().map(|w| w.to_string()).collect(),
            defined_term: None,
            definiens: Vec::new(),
            section_refs: Vec::new(),
        }
    }

    #[test]
    fn test_exclusivity_table() {
        use Modality::*;
        use Polarity::*;
        let ex = PredicateComparator::exclusivity;
        assert_eq!(ex((Obligation, Positive), (Obligation, Negative)), 1.0);
        assert_eq!(ex((Prohibition, Positive), (Obligation, Positive)), 1.0);
        assert_eq!(ex((Permission, Positive), (Prohibition, Positive)), 0.9);
        assert_eq!(ex((Obligation, Positive), (Permission, Positive)), 0.6);
        assert_eq!(ex((Obligation, Positive), (Obligation, Positive)), 0.0);
        assert_eq!(ex((Obligation, Ambiguous), (Obligation, Negative)), 0.0);
    }

    #[test]
    fn test_predicate_comparator_skips_unrelated_actions() {
        let comparator = PredicateComparator::default();
        let a = facts(Modality::Obligation, Polarity::Positive, &["pay", "fee"]);
        let b = facts(Modality::Obligation, Polarity::Negative, &["pay", "fee"]);
        assert!((comparator.compare(&a, &b) - 0.85).abs() < 1e-12);

        let c = facts(Modality::Obligation, Polarity::Negative, &["renew", "license", "online"]);
        assert_eq!(comparator.compare(&a, &c), 0.0);
    }

    #[test]
    fn test_constructor_orders_indices() {
        let c = Contradiction::new(4, 1, ContradictionKind::Logical, 0.7, "x");
        assert_eq!((c.clause_a, c.clause_b), (1, 4));
    }

    #[test]
    fn test_merge_keeps_strongest_and_joins_rationales() {
        let findings = vec![
            Scored::rule_based(
                Contradiction::new(0, 1, ContradictionKind::CrossReference, 0.65, "first"),
                0.65,
                "a",
            ),
            Scored::rule_based(
                Contradiction::new(1, 0, ContradictionKind::Logical, 0.9, "second"),
                0.9,
                "b",
            ),
            Scored::rule_based(
                Contradiction::new(0, 1, ContradictionKind::Logical, 0.9, "second"),
                0.9,
                "c",
            ),
            Scored::rule_based(
                Contradiction::new(2, 3, ContradictionKind::Logical, 0.5, "weak"),
                0.5,
                "d",
            ),
        ];
        let merged = merge_findings(findings, 0.6);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].kind, ContradictionKind::Logical);
        assert_eq!(merged[0].confidence, 0.9);
        assert_eq!(merged[0].rationale, "first; second");
    }

    #[test]
    fn test_merge_order() {
        let finding = |a, b, confidence| {
            Scored::rule_based(
                Contradiction::new(a, b, ContradictionKind::Logical, confidence, "r"),
                confidence,
                "r",
            )
        };
        let merged = merge_findings(
            vec![finding(2, 3, 0.7), finding(0, 5, 0.9), finding(1, 2, 0.7)],
            0.6,
        );
        let pairs: Vec<_> = merged.iter().map(|c| (c.clause_a, c.clause_b)).collect();
        assert_eq!(pairs, vec![(0, 5), (1, 2), (2, 3)]);
    }
}
