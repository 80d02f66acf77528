use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use verobrix::{fold_case, matched_terms, Entity};

use crate::{
    assess_urgency_at, jurisdiction_hint, EntityExtractor, JurisdictionHint, SituationClassifier,
    SituationType, Urgency,
};

/// Red-flag language worth surfacing alongside the classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PotentialIssue {
    Waiver,
    Consent,
    Jurisdiction,
    Authority,
    DueProcess,
    Notice,
    Deadline,
    Penalty,
    Default,
}

impl PotentialIssue {
    const ALL: [PotentialIssue; 9] = [
        PotentialIssue::Waiver,
        PotentialIssue::Consent,
        PotentialIssue::Jurisdiction,
        PotentialIssue::Authority,
        PotentialIssue::DueProcess,
        PotentialIssue::Notice,
        PotentialIssue::Deadline,
        PotentialIssue::Penalty,
        PotentialIssue::Default,
    ];

    fn trigger(&self) -> &'static [&'static str] {
        match self {
            PotentialIssue::Waiver => &["waiver", "waive", "waives"],
            PotentialIssue::Consent => &["consent", "consents"],
            PotentialIssue::Jurisdiction => &["jurisdiction"],
            PotentialIssue::Authority => &["authority"],
            PotentialIssue::DueProcess => &["due process"],
            PotentialIssue::Notice => &["notice"],
            PotentialIssue::Deadline => &["deadline"],
            PotentialIssue::Penalty => &["penalty", "penalties"],
            PotentialIssue::Default => &["default"],
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PotentialIssue::Waiver => "Potential rights waiver",
            PotentialIssue::Consent => "Consent issues",
            PotentialIssue::Jurisdiction => "Jurisdictional questions",
            PotentialIssue::Authority => "Authority challenges",
            PotentialIssue::DueProcess => "Due process concerns",
            PotentialIssue::Notice => "Notice requirements",
            PotentialIssue::Deadline => "Time-sensitive requirements",
            PotentialIssue::Penalty => "Penalty provisions",
            PotentialIssue::Default => "Default consequences",
        }
    }
}

/// The interpreted situation for one input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Situation {
    pub situation_type: SituationType,
    /// Winner's share of the total trigger weight, 0 when unclassified
    pub confidence: f64,
    pub category_scores: BTreeMap<SituationType, u32>,
    pub entities: Vec<Entity>,
    pub urgency: Urgency,
    pub jurisdiction_hint: Option<JurisdictionHint>,
    pub potential_issues: Vec<PotentialIssue>,
}

/// Classifies a situation and extracts its entities, urgency and jurisdiction.
///
/// Interpretation never fails: empty or non-linguistic input comes back
/// unclassified with no entities.
#[derive(Debug, Clone, Default)]
pub struct SituationInterpreter {
    classifier: SituationClassifier,
    extractor: EntityExtractor,
}

impl SituationInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interpret(&self, text: &str) -> Situation {
        self.interpret_at(text, None)
    }

    /// Like [`interpret`](Self::interpret); dated deadlines are measured from
    /// `reference` when one is given.
    pub fn interpret_at(&self, text: &str, reference: Option<NaiveDate>) -> Situation {
        let folded = fold_case(text);
        let category_scores = self.classifier.category_scores(&folded);
        let (situation_type, confidence) = self.classifier.classify(&category_scores);

        let potential_issues = PotentialIssue::ALL
            .iter()
            .copied()
            .filter(|issue| !matched_terms(&folded, issue.trigger()).is_empty())
            .collect();

        let entities = self.extractor.extract(text);
        let urgency = assess_urgency_at(text, &entities, reference);

        Situation {
            situation_type,
            confidence,
            category_scores,
            entities,
            urgency,
            jurisdiction_hint: jurisdiction_hint(&folded),
            potential_issues,
        }
    }
}
