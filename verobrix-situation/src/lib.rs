#![doc(
    html_logo_url = "https://raw.githubusercontent.com/verobrix/verobrix/main/assets/verobrix.svg",
    issue_tracker_base_url = "https://github.com/verobrix/verobrix/issues/"
)]

//! Situation interpretation for VeroBrix.
//!
//! - [`SituationClassifier`] - weighted keyword/phrase scoring over the fixed [`SituationType`] set
//! - [`EntityExtractor`] - people, organizations, dates, amounts, statute citations and identifiers
//! - [`assess_urgency`] - deadlines and pressure language
//! - [`jurisdiction_hint`] - federal/state/local/commercial indicators
//! - [`SituationInterpreter`] - runs all of the above and returns a [`Situation`]
//!
//! ## Example
//!
//! ```
//! use verobrix_situation::{SituationInterpreter, SituationType, UrgencyLevel};
//!
//! let situation = SituationInterpreter::new()
//!     .interpret("Officer Smith demanded my license. Pay the fee immediately.");
//! assert_eq!(situation.situation_type, SituationType::TrafficStop);
//! assert_eq!(situation.urgency.level, UrgencyLevel::High);
//! assert_eq!(situation.entities[0].text, "Officer Smith");
//! ```

mod entities;
mod interpreter;
mod jurisdiction;
mod situation_type;
mod urgency;

pub use entities::{merge_overlapping, EntityExtractor};
pub use interpreter::{PotentialIssue, Situation, SituationInterpreter};
pub use jurisdiction::{jurisdiction_hint, JurisdictionHint, JurisdictionKind};
pub use situation_type::{SituationClassifier, SituationType};
pub use urgency::{
    assess_urgency, assess_urgency_at, dated_deadlines, find_deadlines, Deadline, Urgency,
    UrgencyLevel,
};
