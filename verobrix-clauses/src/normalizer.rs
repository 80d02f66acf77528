//! Clause normalization into comparable facts.
//!
//! Handles:
//! - Subject normalization (determiners and quantifiers stripped, singularized)
//! - Modality (obligation, permission, prohibition)
//! - Action lemmatization
//! - Defined terms and their definiens
//! - Section references with precedence ("subject to" / "notwithstanding")

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use verobrix::words;

use crate::polarity::{is_negation_word, PolarityContext, PolarityTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Obligation,
    Permission,
    Prohibition,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precedence {
    /// "subject to Section 4"
    Deferring,
    /// "notwithstanding Section 4"
    Overriding,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectionRef {
    /// Section number as written, e.g. "4.2"
    pub section: String,
    pub precedence: Precedence,
}

/// Normalized facts of one clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseFacts {
    pub subject: Option<String>,
    pub modality: Modality,
    pub polarity: PolarityContext,
    /// Lemmatized content words after the modal, in order, without repeats
    pub action: Vec<String>,
    pub defined_term: Option<String>,
    pub definiens: Vec<String>,
    pub section_refs: Vec<SectionRef>,
}

const MODALS: &[(&str, Modality)] = &[
    ("shall", Modality::Obligation),
    ("must", Modality::Obligation),
    ("required", Modality::Obligation),
    ("obligated", Modality::Obligation),
    ("need", Modality::Obligation),
    ("needs", Modality::Obligation),
    ("may", Modality::Permission),
    ("can", Modality::Permission),
    ("entitled", Modality::Permission),
    ("permitted", Modality::Permission),
    ("allowed", Modality::Permission),
    ("prohibited", Modality::Prohibition),
    ("forbidden", Modality::Prohibition),
];

/// Words dropped from subjects.
const SUBJECT_NOISE: &[&str] = &[
    "the", "a", "an", "all", "every", "each", "any", "some", "no", "none", "is", "are", "be",
    "was", "were", "will", "hereby", "such", "this", "that", "these", "those",
];

/// Words dropped from actions and definiens.
const STOP_WORDS: &[&str] = &[
    "to", "the", "a", "an", "of", "and", "or", "be", "is", "are", "was", "were", "been", "by",
    "for", "in", "on", "at", "with", "this", "that", "these", "those", "such", "its", "their",
    "his", "her", "it", "they", "any", "all", "each", "every", "as", "from", "under", "upon",
    "shall", "must", "may", "can", "will", "mean", "means", "defined", "refers",
];

static DEFINITION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^\s*(?:the\s+)?["\x{201C}]?(?P<term>[a-z][a-z0-9 \-]*?)["\x{201D}]?\s+(?:shall\s+mean|means|is\s+defined\s+as|refers\s+to)\s+(?P<definiens>.+)$"#,
    )
    .expect("Invalid definition regex")
});

static SECTION_REF_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?P<prec>subject\s+to|notwithstanding)\s+(?:section|sec\.|article|§)\s*(?P<num>\d+(?:\.\d+)*)",
    )
    .expect("Invalid section reference regex")
});

#[derive(Debug, Clone)]
pub struct ClauseNormalizer {
    /// Mapping from inflected forms to base lemma
    lemma_table: HashMap<String, String>,
}

impl Default for ClauseNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ClauseNormalizer {
    pub fn new() -> Self {
        let mut lemma_table = HashMap::new();

        let verbs = [
            ("deliver", &["delivers", "delivered", "delivering", "delivery"][..]),
            ("pay", &["pays", "paid", "paying", "payment"]),
            ("provide", &["provides", "provided", "providing", "provision"]),
            ("perform", &["performs", "performed", "performing", "performance"]),
            ("notify", &["notifies", "notified", "notifying", "notification"]),
            ("terminate", &["terminates", "terminated", "terminating", "termination"]),
            ("indemnify", &["indemnifies", "indemnified", "indemnifying", "indemnification"]),
            ("comply", &["complies", "complied", "complying", "compliance"]),
            ("submit", &["submits", "submitted", "submitting", "submission"]),
            ("disclose", &["discloses", "disclosed", "disclosing", "disclosure"]),
            ("remit", &["remits", "remitted", "remitting", "remittance"]),
            ("transfer", &["transfers", "transferred", "transferring"]),
            ("file", &["files", "filed", "filing"]),
            ("appear", &["appears", "appeared", "appearing", "appearance"]),
            ("register", &["registers", "registered", "registering", "registration"]),
            ("renew", &["renews", "renewed", "renewing", "renewal"]),
            ("include", &["includes", "included", "including", "inclusion"]),
            ("exclude", &["excludes", "excluded", "excluding", "exclusion"]),
            ("charge", &["charges", "charged", "charging"]),
            ("fee", &["fees"]),
            ("fine", &["fines", "fined"]),
            ("license", &["licenses", "licensed", "licensing"]),
            ("vehicle", &["vehicles"]),
        ];

        for (base, inflections) in verbs {
            lemma_table.insert(base.to_string(), base.to_string());
            for inflection in inflections {
                lemma_table.insert(inflection.to_string(), base.to_string());
            }
        }

        Self { lemma_table }
    }

    /// Base form of `word`, trying its singular when the word itself is unknown.
    pub fn lemma(&self, word: &str) -> String {
        let lower = word.to_lowercase();
        self.lemma_table
            .get(&lower)
            .or_else(|| self.lemma_table.get(&singularize(&lower)))
            .cloned()
            .unwrap_or(lower)
    }

    pub fn normalize(&self, text: &str) -> ClauseFacts {
        let tokens = tokens_of(text);
        let modal_at = tokens.iter().enumerate().find_map(|(idx, token)| {
            let lower = token.to_lowercase();
            MODALS
                .iter()
                .find(|(modal, _)| *modal == lower)
                .map(|(_, modality)| (idx, *modality))
        });

        let (subject, modality, action_tokens) = match modal_at {
            Some((idx, modality)) => (
                self.normalize_subject(&tokens[..idx]),
                modality,
                &tokens[idx + 1..],
            ),
            None => (None, Modality::None, &tokens[..]),
        };

        let definition = DEFINITION_REGEX.captures(text.trim());
        let defined_term = definition
            .as_ref()
            .and_then(|caps| caps.name("term"))
            .map(|term| term.as_str().trim().to_lowercase());
        let definiens = definition
            .as_ref()
            .and_then(|caps| caps.name("definiens"))
            .map(|definiens| self.content_lemmas(&tokens_of(definiens.as_str())))
            .unwrap_or_default();

        let section_refs = SECTION_REF_REGEX
            .captures_iter(text)
            .filter_map(|caps| {
                let prec = caps.name("prec")?.as_str().to_lowercase();
                let precedence = if prec.starts_with("subject") {
                    Precedence::Deferring
                } else {
                    Precedence::Overriding
                };
                Some(SectionRef {
                    section: caps.name("num")?.as_str().to_string(),
                    precedence,
                })
            })
            .collect();

        ClauseFacts {
            subject,
            modality,
            polarity: PolarityTracker::scan(text).polarity(),
            action: self.content_lemmas(action_tokens),
            defined_term,
            definiens,
            section_refs,
        }
    }

    /// Lowercase, lemmatized content words without repeats.
    fn content_lemmas(&self, tokens: &[&str]) -> Vec<String> {
        let mut seen = HashSet::new();
        tokens
            .iter()
            .filter(|t| !is_negation_word(t))
            .map(|t| self.lemma(t))
            .filter(|w| !STOP_WORDS.contains(&w.as_str()))
            .filter(|w| seen.insert(w.clone()))
            .collect()
    }

    fn normalize_subject(&self, tokens: &[&str]) -> Option<String> {
        let kept: Vec<String> = tokens
            .iter()
            .map(|t| t.to_lowercase())
            .filter(|t| !SUBJECT_NOISE.contains(&t.as_str()) && !is_negation_word(t))
            .map(|t| singularize(&t))
            .collect();
        (!kept.is_empty()).then(|| kept.join(" "))
    }
}

fn tokens_of(text: &str) -> Vec<&str> {
    words(text).into_iter().map(|w| w.text).collect()
}

/// Naive English singular form.
pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        if stem.len() > 1 {
            return format!("{}y", stem);
        }
    }
    if word.ends_with("sses") {
        return word[..word.len() - 2].to_string();
    }
    if word.len() > 3
        && word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
    {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Jaccard similarity of two word lists: |A ∩ B| / |A ∪ B|.
///
/// Returns 1.0 for two empty lists.
pub fn jaccard(a: &[String], b: &[String]) -> f64 {
    let words_a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let words_b: HashSet<&str> = b.iter().map(String::as_str).collect();

    if words_a.is_empty() && words_b.is_empty() {
        return 1.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    intersection as f64 / union as f64
}
