#![doc(
    html_logo_url = "https://raw.githubusercontent.com/verobrix/verobrix/main/assets/verobrix.svg",
    issue_tracker_base_url = "https://github.com/verobrix/verobrix/issues/"
)]

//! Sentiment, risk and sovereignty scoring for VeroBrix.
//!
//! - [`SentimentAssessor`] - lexicon sentiment with weighted, located triggers
//! - [`assess_risk`] - rule-ordered risk level with normalized factor weights
//! - [`SovereigntyScorer`] - servile/assertive marker rubric, loadable from TOML
//!
//! ## Example
//!
//! ```
//! use verobrix_scoring::{assess_risk, RiskLevel, SentimentAssessor, SentimentCategory};
//! use verobrix_situation::UrgencyLevel;
//!
//! let text = "Officer Smith demanded my license. I am required by law to comply.";
//! let sentiment = SentimentAssessor::new().assess(text);
//! assert_eq!(sentiment.category, SentimentCategory::Concerning);
//!
//! let risk = assess_risk(&sentiment, UrgencyLevel::Low, &[], text);
//! assert_eq!(risk.level, RiskLevel::Medium);
//! ```

mod errors;
mod risk;
mod sentiment;
mod sovereignty;

pub use errors::{ScoringError, ScoringResult};
pub use risk::{
    assess_risk, RiskAssessment, RiskFactor, RiskLevel, HIGH_CONFIDENCE_CONTRADICTION,
    HIGH_RISK_TERMS, MEDIUM_RISK_TERMS,
};
pub use sentiment::{
    LexiconEntry, SentimentAssessor, SentimentCategory, SentimentResult, SentimentTrigger, Tone,
    CONCERNING_THRESHOLD, FAVORABLE_THRESHOLD,
};
pub use sovereignty::{
    FlagKind, Marker, SovereigntyFlag, SovereigntyLevel, SovereigntyRubric, SovereigntyScore,
    SovereigntyScorer, DEFAULT_MARKER_WEIGHT,
};
