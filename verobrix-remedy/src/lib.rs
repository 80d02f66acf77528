#![doc(
    html_logo_url = "https://raw.githubusercontent.com/verobrix/verobrix/main/assets/verobrix.svg",
    issue_tracker_base_url = "https://github.com/verobrix/verobrix/issues/"
)]

//! Remedy synthesis for VeroBrix.
//!
//! - [`synthesize`] - ranks the catalog candidates for a situation type
//! - [`score_remedies`] - sovereignty score of each remedy's own text
//! - [`candidates_for`] - the ordered base set per [`SituationType`](verobrix_situation::SituationType)
//! - [`RemedyTemplate`] - document templates rendered with `[PLACEHOLDER]` substitution
//!
//! ## Example
//!
//! ```
//! use verobrix_remedy::synthesize;
//! use verobrix_scoring::{RiskAssessment, SovereigntyScore};
//! use verobrix_situation::SituationType;
//!
//! let remedies = synthesize(
//!     SituationType::Unclassified,
//!     &[],
//!     &RiskAssessment::baseline(),
//!     &SovereigntyScore::neutral(),
//! );
//! assert_eq!(remedies[0].rank, 1);
//! assert_eq!(remedies[0].title, "Consult qualified counsel");
//! ```

mod synthesizer;
mod templates;

pub use synthesizer::{
    candidates_for, score_remedies, synthesize, Candidate, Justification, Remedy,
    ASSERTIVE_THRESHOLD,
};
pub use templates::{RemedyTemplate, TemplateId};
