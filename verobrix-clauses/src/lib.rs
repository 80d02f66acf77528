#![doc(
    html_logo_url = "https://raw.githubusercontent.com/verobrix/verobrix/main/assets/verobrix.svg",
    issue_tracker_base_url = "https://github.com/verobrix/verobrix/issues/"
)]

//! Clause extraction and contradiction detection for VeroBrix.
//!
//! - [`SentenceSplitter`] - sentence boundaries that respect legal abbreviations
//! - [`ClauseClassifier`] - rule-based clause categories with confidence and rule name
//! - [`ClauseExtractor`] - segments a document into indexed [`Clause`]s linked to entities
//! - [`ClauseNormalizer`] - subject, modality, polarity and action of a clause
//! - [`ContradictionEngine`] - pattern and semantic passes over clause pairs
//!
//! ## Example
//!
//! ```
//! use verobrix_clauses::{ClauseCategory, ClauseExtractor, ContradictionEngine};
//!
//! let text = "The Tenant shall pay the deposit. The Tenant shall not pay the deposit.";
//! let clauses = ClauseExtractor::new().extract(text, &[]);
//! assert_eq!(clauses.len(), 2);
//! assert_eq!(clauses[0].category, ClauseCategory::Obligation);
//!
//! let contradictions = ContradictionEngine::new().detect(&clauses);
//! assert_eq!((contradictions[0].clause_a, contradictions[0].clause_b), (0, 1));
//! ```

mod clause;
mod contradiction;
mod normalizer;
mod polarity;
mod sentence_boundary;

pub use clause::{Clause, ClauseCategory, ClauseClassifier, ClauseExtractor, ClauseImportance};
pub use contradiction::{
    Contradiction, ContradictionEngine, ContradictionKind, PredicateComparator,
    SemanticComparator,
};
pub use normalizer::{
    jaccard, singularize, ClauseFacts, ClauseNormalizer, Modality, Precedence, SectionRef,
};
pub use polarity::{
    is_negation_word, DoubleNegativePattern, Polarity, PolarityContext, PolarityTracker,
};
pub use sentence_boundary::{Sentence, SentenceConfidence, SentenceSplitter};
