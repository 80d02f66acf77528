//! Rubric-driven sovereignty (alignment) scoring.
//!
//! A [`SovereigntyRubric`] lists servile and assertive marker phrases. Each
//! occurrence of a servile marker lowers the non-servility sub-score from 1, each
//! assertive marker raises the remedy-alignment sub-score from 0, and the
//! overall score is their weighted mean. Nothing is cached: every call
//! rescores the text it is given.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use verobrix::{find_term, fold_case, TextSpan};

use crate::errors::{ScoringError, ScoringResult};

pub const DEFAULT_MARKER_WEIGHT: f64 = 0.2;

fn default_marker_weight() -> f64 {
    DEFAULT_MARKER_WEIGHT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub phrase: String,
    pub category: String,
    #[serde(default = "default_marker_weight")]
    pub weight: f64,
}

/// Scoring configuration. Fields missing from a TOML file keep their
/// built-in values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SovereigntyRubric {
    pub servile: Vec<Marker>,
    pub assertive: Vec<Marker>,
    /// Weight of the non-servility sub-score in the overall score
    pub servility_weight: f64,
    pub alignment_weight: f64,
}

const SERVILE_MARKERS: &[(&str, &[&str])] = &[
    (
        "submission",
        &[
            "humbly request", "respectfully request", "respectfully ask", "if it pleases the court",
            "with all due respect", "i am just a", "i am only a",
        ],
    ),
    (
        "dependency",
        &[
            "need your permission", "need your approval", "can you please",
            "would it be possible", "i hope the court will",
        ],
    ),
    (
        "victim",
        &[
            "i can't afford", "i cannot afford", "i don't have money", "this is unfair to me",
            "why is this happening to me",
        ],
    ),
    (
        "fiction_acceptance",
        &[
            "under penalty of perjury", "i consent to jurisdiction", "i consent to this court",
            "my social security number is", "i understand that i am required",
        ],
    ),
];

const ASSERTIVE_MARKERS: &[(&str, &[&str])] = &[
    (
        "lawful_standing",
        &[
            "acting in my private capacity", "by special appearance", "reserving all rights",
            "reserve all rights", "without prejudice",
        ],
    ),
    (
        "authority_challenge",
        &[
            "what is your authority", "prove jurisdiction", "prove your jurisdiction",
            "prove your authority", "show me the law", "where is the injured party",
        ],
    ),
    (
        "constitutional",
        &[
            "constitutional right", "fourth amendment", "fifth amendment", "due process",
            "equal protection",
        ],
    ),
    (
        "non_consent",
        &["i do not consent", "without my consent", "under duress", "no contract exists"],
    ),
    (
        "remedy",
        &[
            "lawful remedy", "make me whole", "restitution", "specific performance",
            "injunctive relief",
        ],
    ),
];

fn markers(table: &[(&str, &[&str])]) -> Vec<Marker> {
    table
        .iter()
        .flat_map(|(category, phrases)| {
            phrases.iter().map(move |phrase| Marker {
                phrase: phrase.to_string(),
                category: category.to_string(),
                weight: DEFAULT_MARKER_WEIGHT,
            })
        })
        .collect()
}

impl Default for SovereigntyRubric {
    fn default() -> Self {
        Self {
            servile: markers(SERVILE_MARKERS),
            assertive: markers(ASSERTIVE_MARKERS),
            servility_weight: 0.5,
            alignment_weight: 0.5,
        }
    }
}

impl SovereigntyRubric {
    /// Load a rubric from a TOML file.
    pub fn load(path: &Path) -> ScoringResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ScoringError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a rubric.
    pub fn from_toml_str(content: &str) -> ScoringResult<Self> {
        let rubric: Self = toml::from_str(content)?;
        rubric.validate()?;
        Ok(rubric)
    }

    pub fn validate(&self) -> ScoringResult<()> {
        let usable = |w: f64| w.is_finite() && w >= 0.0;

        for marker in self.servile.iter().chain(&self.assertive) {
            if marker.phrase.trim().is_empty() {
                return Err(invalid(format!(
                    "empty phrase in category '{}'",
                    marker.category
                )));
            }
            if !usable(marker.weight) {
                return Err(invalid(format!(
                    "marker '{}' has weight {}",
                    marker.phrase, marker.weight
                )));
            }
        }

        if !usable(self.servility_weight) || !usable(self.alignment_weight) {
            return Err(invalid(format!(
                "sub-score weights must be finite and non-negative, got {} and {}",
                self.servility_weight, self.alignment_weight
            )));
        }
        if self.servility_weight + self.alignment_weight <= 0.0 {
            return Err(invalid("sub-score weights must not both be zero".to_string()));
        }
        Ok(())
    }
}

fn invalid(message: String) -> ScoringError {
    ScoringError::InvalidRubric { message }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    Servile,
    Assertive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SovereigntyFlag {
    pub kind: FlagKind,
    pub category: String,
    pub phrase: String,
    pub span: TextSpan,
}

pub const SOVEREIGN_LEVEL: f64 = 0.75;
pub const TRANSITIONAL_LEVEL: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SovereigntyLevel {
    Sovereign,
    Transitional,
    Servile,
}

impl SovereigntyLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= SOVEREIGN_LEVEL {
            SovereigntyLevel::Sovereign
        } else if score >= TRANSITIONAL_LEVEL {
            SovereigntyLevel::Transitional
        } else {
            SovereigntyLevel::Servile
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SovereigntyScore {
    pub overall: f64,
    /// 1 with no servile language, falling by each servile marker's weight
    pub non_servility: f64,
    pub remedy_alignment: f64,
    pub level: SovereigntyLevel,
    /// Ordered by position in the text
    pub flags: Vec<SovereigntyFlag>,
}

impl SovereigntyScore {
    pub fn neutral() -> Self {
        Self {
            overall: 0.5,
            non_servility: 0.5,
            remedy_alignment: 0.5,
            level: SovereigntyLevel::Transitional,
            flags: Vec::new(),
        }
    }
}

impl Default for SovereigntyScore {
    fn default() -> Self {
        Self::neutral()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SovereigntyScorer {
    rubric: SovereigntyRubric,
}

impl SovereigntyScorer {
    pub fn new(rubric: SovereigntyRubric) -> Self {
        Self { rubric }
    }

    pub fn rubric(&self) -> &SovereigntyRubric {
        &self.rubric
    }

    pub fn score(&self, text: &str) -> SovereigntyScore {
        let folded = fold_case(text);
        let mut flags = Vec::new();

        let servile_total = collect_flags(&folded, &self.rubric.servile, FlagKind::Servile, &mut flags);
        let assertive_total =
            collect_flags(&folded, &self.rubric.assertive, FlagKind::Assertive, &mut flags);
        flags.sort_by_key(|flag| flag.span);

        let non_servility = (1.0 - servile_total).clamp(0.0, 1.0);
        let remedy_alignment = assertive_total.clamp(0.0, 1.0);

        let total_weight = self.rubric.servility_weight + self.rubric.alignment_weight;
        let overall = if total_weight > 0.0 {
            ((self.rubric.servility_weight * non_servility
                + self.rubric.alignment_weight * remedy_alignment)
                / total_weight)
                .clamp(0.0, 1.0)
        } else {
            0.5
        };

        SovereigntyScore {
            overall,
            non_servility,
            remedy_alignment,
            level: SovereigntyLevel::from_score(overall),
            flags,
        }
    }
}

/// Push a flag for every marker occurrence and return the summed weight.
fn collect_flags(
    folded: &str,
    markers: &[Marker],
    kind: FlagKind,
    flags: &mut Vec<SovereigntyFlag>,
) -> f64 {
    let mut total = 0.0;
    for marker in markers {
        for span in find_term(folded, &fold_case(&marker.phrase)) {
            total += marker.weight;
            flags.push(SovereigntyFlag {
                kind,
                category: marker.category.clone(),
                phrase: marker.phrase.clone(),
                span,
            });
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_markers_is_transitional() {
        let score = SovereigntyScorer::default().score("The sky is blue.");
        assert_eq!(score.non_servility, 1.0);
        assert_eq!(score.remedy_alignment, 0.0);
        assert_eq!(score.overall, 0.5);
        assert_eq!(score.level, SovereigntyLevel::Transitional);
        assert!(score.flags.is_empty());
    }

    #[test]
    fn test_servile_language() {
        let text = "With all due respect, I humbly request more time.";
        let score = SovereigntyScorer::default().score(text);

        assert_eq!(score.flags.len(), 2);
        assert_eq!(score.flags[0].span.slice(text), "With all due respect");
        assert_eq!(score.flags[0].kind, FlagKind::Servile);
        assert_eq!(score.flags[1].category, "submission");
        assert!((score.non_servility - 0.6).abs() < 1e-9);
        assert!((score.overall - 0.3).abs() < 1e-9);
        assert_eq!(score.level, SovereigntyLevel::Servile);
    }

    #[test]
    fn test_assertive_language() {
        let score = SovereigntyScorer::default()
            .score("I reserve all rights and demand due process and restitution.");
        assert_eq!(score.flags.len(), 3);
        assert!(score.flags.iter().all(|f| f.kind == FlagKind::Assertive));
        assert!((score.remedy_alignment - 0.6).abs() < 1e-9);
        assert!((score.overall - 0.8).abs() < 1e-9);
        assert_eq!(score.level, SovereigntyLevel::Sovereign);
    }

    #[test]
    fn test_subscores_clamp() {
        let text = "I can't afford it. I cannot afford it. Can you please help? \
                    Would it be possible? I humbly request. I am just a driver.";
        let score = SovereigntyScorer::default().score(text);
        assert_eq!(score.non_servility, 0.0);
        assert_eq!(score.overall, 0.0);
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(SovereigntyLevel::from_score(0.75), SovereigntyLevel::Sovereign);
        assert_eq!(SovereigntyLevel::from_score(0.74), SovereigntyLevel::Transitional);
        assert_eq!(SovereigntyLevel::from_score(0.5), SovereigntyLevel::Transitional);
        assert_eq!(SovereigntyLevel::from_score(0.49), SovereigntyLevel::Servile);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let scorer = SovereigntyScorer::default();
        let text = "I do not consent. With all due respect, show me the law.";
        assert_eq!(scorer.score(text), scorer.score(text));
    }

    #[test]
    fn test_rubric_from_toml() {
        let rubric = SovereigntyRubric::from_toml_str(
            r#"
servility_weight = 0.25
alignment_weight = 0.75

[[servile]]
phrase = "sorry"
category = "apology"

[[assertive]]
phrase = "I object"
category = "objection"
weight = 0.5
"#,
        )
        .unwrap();

        assert_eq!(rubric.servile.len(), 1);
        assert_eq!(rubric.servile[0].weight, DEFAULT_MARKER_WEIGHT);

        let score = SovereigntyScorer::new(rubric).score("Sorry, but I object.");
        assert!((score.non_servility - 0.8).abs() < 1e-9);
        assert_eq!(score.remedy_alignment, 0.5);
        // 0.25 * 0.8 + 0.75 * 0.5
        assert!((score.overall - 0.575).abs() < 1e-9);
    }

    #[test]
    fn test_missing_fields_keep_defaults() {
        let rubric = SovereigntyRubric::from_toml_str("alignment_weight = 1.0").unwrap();
        assert_eq!(rubric.servility_weight, 0.5);
        assert_eq!(rubric.servile, SovereigntyRubric::default().servile);
    }

    #[test]
    fn test_invalid_rubrics() {
        let negative = SovereigntyRubric::from_toml_str(
            "[[servile]]\nphrase = \"sorry\"\ncategory = \"apology\"\nweight = -1.0\n",
        );
        assert!(matches!(negative, Err(ScoringError::InvalidRubric { .. })));

        let zero = SovereigntyRubric::from_toml_str("servility_weight = 0.0\nalignment_weight = 0.0");
        assert!(matches!(zero, Err(ScoringError::InvalidRubric { .. })));

        let malformed = SovereigntyRubric::from_toml_str("servility_weight = \"high\"");
        assert!(matches!(malformed, Err(ScoringError::Parse(_))));
    }
}
