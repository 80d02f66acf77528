//! Lexicon-based sentiment for legal text.
//!
//! Legal terms weigh 2, generic terms weigh 1. The score is
//! `(pos - neg) / (pos + neg)`, or 0 when no lexicon phrase occurs.

use serde::{Deserialize, Serialize};
use verobrix::{find_term, fold_case, TextSpan};

/// Scores at or below this are concerning.
pub const CONCERNING_THRESHOLD: f64 = -0.2;
/// Scores at or above this are favorable.
pub const FAVORABLE_THRESHOLD: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentCategory {
    Concerning,
    Neutral,
    Favorable,
}

impl SentimentCategory {
    pub fn from_score(score: f64) -> Self {
        if score <= CONCERNING_THRESHOLD {
            SentimentCategory::Concerning
        } else if score >= FAVORABLE_THRESHOLD {
            SentimentCategory::Favorable
        } else {
            SentimentCategory::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Negative,
}

/// One lexicon phrase. `legal` phrases count double.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub phrase: String,
    pub tone: Tone,
    #[serde(default)]
    pub legal: bool,
}

impl LexiconEntry {
    pub fn weight(&self) -> f64 {
        if self.legal {
            2.0
        } else {
            1.0
        }
    }
}

/// A lexicon phrase found in the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentTrigger {
    pub phrase: String,
    pub span: TextSpan,
    /// Positive for favorable phrases, negative for concerning ones
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// In `[-1, 1]`
    pub score: f64,
    pub category: SentimentCategory,
    /// Ordered by position in the text
    pub triggers: Vec<SentimentTrigger>,
}

impl SentimentResult {
    pub fn neutral() -> Self {
        Self {
            score: 0.0,
            category: SentimentCategory::Neutral,
            triggers: Vec::new(),
        }
    }
}

impl Default for SentimentResult {
    fn default() -> Self {
        Self::neutral()
    }
}

const POSITIVE_GENERIC: &[&str] = &[
    "agree", "agreed", "consent", "approve", "approved", "accept", "accepted", "comply",
    "honor", "respect", "cooperate", "resolved", "thank you",
];
const POSITIVE_LEGAL: &[&str] = &[
    "entitled to", "right to", "due process", "without prejudice", "reserve all rights",
    "refund", "dismissed", "good standing",
];
const NEGATIVE_GENERIC: &[&str] = &[
    "deny", "denied", "refuse", "refused", "reject", "rejected", "fail", "failed", "failure",
    "threaten", "threatened", "unfortunately",
];
const NEGATIVE_LEGAL: &[&str] = &[
    "liable", "penalty", "penalties", "fine", "fines", "damages", "violation", "violate",
    "violated", "breach", "default", "arrest", "arrested", "seizure", "forfeiture", "warrant",
    "lien", "contempt", "demand", "demanded", "required by law", "late fee", "final notice",
    "collections",
];

fn builtin_lexicon() -> Vec<LexiconEntry> {
    let tables: [(&[&str], Tone, bool); 4] = [
        (POSITIVE_GENERIC, Tone::Positive, false),
        (POSITIVE_LEGAL, Tone::Positive, true),
        (NEGATIVE_GENERIC, Tone::Negative, false),
        (NEGATIVE_LEGAL, Tone::Negative, true),
    ];
    tables
        .iter()
        .flat_map(|(phrases, tone, legal)| {
            phrases.iter().map(move |phrase| LexiconEntry {
                phrase: phrase.to_string(),
                tone: *tone,
                legal: *legal,
            })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct SentimentAssessor {
    /// Longest phrase first, so "late fee" claims its span before "fee"
    lexicon: Vec<LexiconEntry>,
}

impl Default for SentimentAssessor {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentAssessor {
    pub fn new() -> Self {
        Self::with_lexicon(builtin_lexicon())
    }

    pub fn with_lexicon(mut lexicon: Vec<LexiconEntry>) -> Self {
        for entry in &mut lexicon {
            entry.phrase = fold_case(&entry.phrase);
        }
        lexicon.sort_by(|a, b| b.phrase.len().cmp(&a.phrase.len()));
        Self { lexicon }
    }

    pub fn assess(&self, text: &str) -> SentimentResult {
        let folded = fold_case(text);
        let mut triggers: Vec<SentimentTrigger> = Vec::new();

        for entry in &self.lexicon {
            for span in find_term(&folded, &entry.phrase) {
                if triggers.iter().any(|t| t.span.overlaps(&span)) {
                    continue;
                }
                let weight = match entry.tone {
                    Tone::Positive => entry.weight(),
                    Tone::Negative => -entry.weight(),
                };
                triggers.push(SentimentTrigger {
                    phrase: entry.phrase.clone(),
                    span,
                    weight,
                });
            }
        }
        triggers.sort_by_key(|t| t.span);

        let positive: f64 = triggers.iter().map(|t| t.weight.max(0.0)).sum();
        let negative: f64 = triggers.iter().map(|t| (-t.weight).max(0.0)).sum();
        let score = if positive + negative > 0.0 {
            (positive - negative) / (positive + negative)
        } else {
            0.0
        };

        SentimentResult {
            score,
            category: SentimentCategory::from_score(score),
            triggers,
        }
    }
}
