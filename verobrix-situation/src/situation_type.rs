//! Situation classification by weighted trigger terms.
//!
//! Each category owns a list of keywords (weight 1) and phrases (weight 3).
//! A category's score is the summed weight of the distinct triggers present.
//! The highest score wins; a shared top score or no score at all yields
//! [`SituationType::Unclassified`] instead of a guess.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use verobrix::matched_terms;

/// The fixed set of situations the interpreter recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SituationType {
    TrafficStop,
    FeeDemand,
    CourtSummons,
    ContractDispute,
    AdministrativeAction,
    PropertyDispute,
    Unclassified,
}

impl SituationType {
    /// Every classifiable category, in declaration order.
    pub const CATEGORIES: [SituationType; 6] = [
        SituationType::TrafficStop,
        SituationType::FeeDemand,
        SituationType::CourtSummons,
        SituationType::ContractDispute,
        SituationType::AdministrativeAction,
        SituationType::PropertyDispute,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SituationType::TrafficStop => "traffic-stop",
            SituationType::FeeDemand => "fee-demand",
            SituationType::CourtSummons => "court-summons",
            SituationType::ContractDispute => "contract-dispute",
            SituationType::AdministrativeAction => "administrative-action",
            SituationType::PropertyDispute => "property-dispute",
            SituationType::Unclassified => "unclassified",
        }
    }

    fn triggers(&self) -> (&'static [&'static str], &'static [&'static str]) {
        match self {
            SituationType::TrafficStop => (TRAFFIC_KEYWORDS, TRAFFIC_PHRASES),
            SituationType::FeeDemand => (FEE_KEYWORDS, FEE_PHRASES),
            SituationType::CourtSummons => (COURT_KEYWORDS, COURT_PHRASES),
            SituationType::ContractDispute => (CONTRACT_KEYWORDS, CONTRACT_PHRASES),
            SituationType::AdministrativeAction => (ADMIN_KEYWORDS, ADMIN_PHRASES),
            SituationType::PropertyDispute => (PROPERTY_KEYWORDS, PROPERTY_PHRASES),
            SituationType::Unclassified => (&[], &[]),
        }
    }
}

impl fmt::Display for SituationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const KEYWORD_WEIGHT: u32 = 1;
const PHRASE_WEIGHT: u32 = 3;

const TRAFFIC_KEYWORDS: &[&str] = &[
    "traffic", "driving", "vehicle", "license", "registration", "insurance", "speeding",
    "violation", "citation", "ticket", "officer", "police", "patrol", "stop",
];
const TRAFFIC_PHRASES: &[&str] = &[
    "pulled over", "traffic stop", "speeding ticket", "license and registration",
    "proof of insurance", "vehicle inspection", "moving violation",
];

const FEE_KEYWORDS: &[&str] = &[
    "fee", "fees", "fine", "penalty", "charge", "payment", "bill", "invoice", "assessment",
    "tax", "levy", "collection", "demand",
];
const FEE_PHRASES: &[&str] = &[
    "payment due", "fee schedule", "penalty assessment", "collection notice", "final demand",
    "administrative fee", "processing charge",
];

const COURT_KEYWORDS: &[&str] = &[
    "court", "summons", "complaint", "lawsuit", "litigation", "hearing", "appearance",
    "defendant", "plaintiff", "docket", "judge",
];
const COURT_PHRASES: &[&str] = &[
    "court appearance", "legal proceeding", "civil action", "court order",
    "summons and complaint", "hearing date", "case number",
];

const CONTRACT_KEYWORDS: &[&str] = &[
    "contract", "agreement", "breach", "default", "terms", "conditions", "obligation",
    "performance", "consideration", "party", "parties", "dispute",
];
const CONTRACT_PHRASES: &[&str] = &[
    "breach of contract", "contract dispute", "terms and conditions", "failure to perform",
    "contract violation", "agreement terms",
];

const ADMIN_KEYWORDS: &[&str] = &[
    "agency", "department", "administrative", "regulation", "compliance", "enforcement",
    "investigation", "audit", "inspection", "permit",
];
const ADMIN_PHRASES: &[&str] = &[
    "administrative action", "regulatory compliance", "agency investigation",
    "permit application", "inspection notice", "compliance order",
];

const PROPERTY_KEYWORDS: &[&str] = &[
    "property", "real estate", "land", "title", "deed", "ownership", "boundary", "easement",
    "lien", "mortgage", "foreclosure",
];
const PROPERTY_PHRASES: &[&str] = &[
    "property dispute", "title issue", "boundary dispute", "property rights",
    "real estate matter", "land ownership", "property claim",
];

/// Scores text against every category's trigger terms.
#[derive(Debug, Clone, Default)]
pub struct SituationClassifier;

impl SituationClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Weighted trigger score per category. `folded` must come from [`verobrix::fold_case`].
    pub fn category_scores(&self, folded: &str) -> BTreeMap<SituationType, u32> {
        SituationType::CATEGORIES
            .iter()
            .map(|category| {
                let (keywords, phrases) = category.triggers();
                let score = matched_terms(folded, keywords).len() as u32 * KEYWORD_WEIGHT
                    + matched_terms(folded, phrases).len() as u32 * PHRASE_WEIGHT;
                (*category, score)
            })
            .collect()
    }

    /// Pick the winning category, or `Unclassified` on a tie or when nothing matched.
    ///
    /// The returned confidence is the winner's share of the total trigger weight.
    pub fn classify(&self, scores: &BTreeMap<SituationType, u32>) -> (SituationType, f64) {
        let top = scores.values().copied().max().unwrap_or(0);
        if top == 0 {
            return (SituationType::Unclassified, 0.0);
        }

        let mut leaders = scores.iter().filter(|(_, score)| **score == top);
        match (leaders.next(), leaders.next()) {
            (Some((category, _)), None) => {
                let total: u32 = scores.values().sum();
                (*category, f64::from(top) / f64::from(total))
            }
            _ => (SituationType::Unclassified, 0.0),
        }
    }
}
