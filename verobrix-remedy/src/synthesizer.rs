//! Ranked remedy synthesis.
//!
//! Every situation type owns an ordered base set of candidates. A candidate's
//! priority is its base value plus the boosts it responds to:
//!
//! - contradictions: `min(Σ confidence × 0.5, 1)`
//! - risk: 0 / 0.25 / 0.5 for low / medium / high
//! - assertive candidates: 0.2 while the sovereignty score is below 0.4
//!
//! Candidates are then stable-sorted by priority, so ties keep catalog order.

use serde::{Deserialize, Serialize};
use verobrix_clauses::Contradiction;
use verobrix_scoring::{
    RiskAssessment, RiskFactor, RiskLevel, SovereigntyScore, SovereigntyScorer,
};
use verobrix_situation::SituationType;

use crate::templates::TemplateId;

const CONTRADICTION_BOOST_FACTOR: f64 = 0.5;
const MAX_CONTRADICTION_BOOST: f64 = 1.0;
const ASSERTIVE_BOOST: f64 = 0.2;
/// Sovereignty scores below this boost assertive candidates.
pub const ASSERTIVE_THRESHOLD: f64 = 0.4;

/// Why a remedy was ranked where it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Justification {
    Contradiction {
        clause_a: usize,
        clause_b: usize,
        confidence: f64,
    },
    RiskFactor {
        factor: RiskFactor,
        weight: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remedy {
    /// 1-based
    pub rank: usize,
    pub title: String,
    pub template: Option<TemplateId>,
    pub priority: f64,
    pub justifications: Vec<Justification>,
    /// Score of the remedy's own text, set by [`score_remedies`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sovereignty: Option<SovereigntyScore>,
}

impl Remedy {
    /// The text this remedy puts in front of a reader: its title, then the
    /// unrendered template body when it has one.
    pub fn text(&self) -> String {
        match self.template {
            Some(id) => format!("{}\n\n{}", self.title, id.template().body),
            None => self.title.clone(),
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub title: &'static str,
    pub base: f64,
    pub template: Option<TemplateId>,
    pub responds_to_contradictions: bool,
    pub responds_to_risk: bool,
    pub assertive: bool,
    /// Only emitted when at least one contradiction exists
    pub requires_contradictions: bool,
}

impl Candidate {
    const fn action(title: &'static str, base: f64) -> Self {
        Self {
            title,
            base,
            template: None,
            responds_to_contradictions: false,
            responds_to_risk: false,
            assertive: false,
            requires_contradictions: false,
        }
    }

    const fn document(id: TemplateId, title: &'static str, base: f64) -> Self {
        Self {
            template: Some(id),
            ..Self::action(title, base)
        }
    }

    const fn contradictions(self) -> Self {
        Self {
            responds_to_contradictions: true,
            ..self
        }
    }

    const fn risk(self) -> Self {
        Self {
            responds_to_risk: true,
            ..self
        }
    }

    const fn assertive(self) -> Self {
        Self {
            assertive: true,
            ..self
        }
    }

    const fn only_with_contradictions(self) -> Self {
        Self {
            requires_contradictions: true,
            responds_to_contradictions: true,
            ..self
        }
    }
}

const CHALLENGE_CONTRADICTIONS: Candidate =
    Candidate::action("Challenge contradictory provisions", 0.4).only_with_contradictions();

const TRAFFIC_STOP: &[Candidate] = &[
    Candidate::action("Document the encounter", 0.6).risk(),
    Candidate::action("Request proof of jurisdiction and authority", 0.55)
        .assertive()
        .risk(),
    Candidate::action("Review the citation for errors", 0.5).contradictions(),
    Candidate::document(
        TemplateId::NoticeOfLawfulTravel,
        "Serve a Notice of Lawful Travel",
        0.45,
    )
    .assertive(),
    CHALLENGE_CONTRADICTIONS,
];

const FEE_DEMAND: &[Candidate] = &[
    Candidate::action("Challenge the authority for the fee", 0.6)
        .assertive()
        .contradictions(),
    Candidate::action("Request the fee schedule and its authorization", 0.55).risk(),
    Candidate::document(
        TemplateId::FeeScheduleChallenge,
        "Send a Fee Schedule Challenge",
        0.5,
    )
    .assertive()
    .risk(),
    Candidate::action("Demand a due process hearing", 0.45)
        .assertive()
        .risk(),
    CHALLENGE_CONTRADICTIONS,
    Candidate::action("Preserve the payment deadline", 0.35).risk(),
];

const COURT_SUMMONS: &[Candidate] = &[
    Candidate::action("File a timely response", 0.65).risk(),
    Candidate::action("Challenge jurisdiction if applicable", 0.55).assertive(),
    Candidate::action("Demand a bill of particulars", 0.5).contradictions(),
    Candidate::document(
        TemplateId::ReservationOfRights,
        "Serve a Reservation of Rights",
        0.45,
    )
    .assertive(),
    CHALLENGE_CONTRADICTIONS,
];

const CONTRACT_DISPUTE: &[Candidate] = &[
    Candidate::action("Review the contract terms", 0.6).contradictions(),
    Candidate::action("Document any breach", 0.5).risk(),
    Candidate::action("Consider mediation", 0.5),
    CHALLENGE_CONTRADICTIONS,
    Candidate::document(
        TemplateId::ReservationOfRights,
        "Serve a Reservation of Rights",
        0.35,
    )
    .assertive(),
];

const ADMINISTRATIVE_ACTION: &[Candidate] = &[
    Candidate::action("Request the agency's written authority", 0.55).assertive(),
    Candidate::action("Request an administrative hearing", 0.5).risk(),
    Candidate::document(
        TemplateId::RequestForWrittenClarification,
        "Request written clarification",
        0.45,
    )
    .contradictions(),
    CHALLENGE_CONTRADICTIONS,
];

const PROPERTY_DISPUTE: &[Candidate] = &[
    Candidate::action("Gather title and ownership records", 0.55).risk(),
    Candidate::action("Document the property condition", 0.5),
    Candidate::document(
        TemplateId::ReservationOfRights,
        "Serve a Reservation of Rights",
        0.4,
    )
    .assertive(),
    CHALLENGE_CONTRADICTIONS,
];

const GENERIC: &[Candidate] = &[
    Candidate::action("Consult qualified counsel", 0.5).risk(),
    Candidate::document(
        TemplateId::RequestForWrittenClarification,
        "Request written clarification",
        0.45,
    )
    .contradictions(),
];

/// The ordered base set for a situation type.
pub fn candidates_for(situation_type: SituationType) -> &'static [Candidate] {
    match situation_type {
        SituationType::TrafficStop => TRAFFIC_STOP,
        SituationType::FeeDemand => FEE_DEMAND,
        SituationType::CourtSummons => COURT_SUMMONS,
        SituationType::ContractDispute => CONTRACT_DISPUTE,
        SituationType::AdministrativeAction => ADMINISTRATIVE_ACTION,
        SituationType::PropertyDispute => PROPERTY_DISPUTE,
        SituationType::Unclassified => GENERIC,
    }
}

fn risk_boost(level: RiskLevel) -> f64 {
    match level {
        RiskLevel::Low => 0.0,
        RiskLevel::Medium => 0.25,
        RiskLevel::High => 0.5,
    }
}

/// Rank the catalog candidates for `situation_type`.
pub fn synthesize(
    situation_type: SituationType,
    contradictions: &[Contradiction],
    risk: &RiskAssessment,
    sovereignty: &SovereigntyScore,
) -> Vec<Remedy> {
    let contradiction_boost = (contradictions.iter().map(|c| c.confidence).sum::<f64>()
        * CONTRADICTION_BOOST_FACTOR)
        .min(MAX_CONTRADICTION_BOOST);
    let risk_boost = risk_boost(risk.level);
    let assertive_boost = if sovereignty.overall < ASSERTIVE_THRESHOLD {
        ASSERTIVE_BOOST
    } else {
        0.0
    };

    let mut remedies: Vec<Remedy> = candidates_for(situation_type)
        .iter()
        .filter(|candidate| !candidate.requires_contradictions || !contradictions.is_empty())
        .map(|candidate| {
            let mut priority = candidate.base;
            let mut justifications = Vec::new();

            if candidate.responds_to_contradictions && contradiction_boost > 0.0 {
                priority += contradiction_boost;
                justifications.extend(contradictions.iter().map(|c| Justification::Contradiction {
                    clause_a: c.clause_a,
                    clause_b: c.clause_b,
                    confidence: c.confidence,
                }));
            }
            if candidate.responds_to_risk && risk_boost > 0.0 {
                priority += risk_boost;
                justifications.extend(risk.factors.iter().map(|(factor, weight)| {
                    Justification::RiskFactor {
                        factor: *factor,
                        weight: *weight,
                    }
                }));
            }
            if candidate.assertive {
                priority += assertive_boost;
            }

            Remedy {
                rank: 0,
                title: candidate.title.to_string(),
                template: candidate.template,
                priority,
                justifications,
                sovereignty: None,
            }
        })
        .collect();

    remedies.sort_by(|a, b| b.priority.total_cmp(&a.priority));
    for (idx, remedy) in remedies.iter_mut().enumerate() {
        remedy.rank = idx + 1;
    }
    remedies
}

/// Score every remedy's text with `scorer`, replacing any earlier score.
pub fn score_remedies(remedies: &mut [Remedy], scorer: &SovereigntyScorer) {
    for remedy in remedies {
        remedy.sovereignty = Some(scorer.score(&remedy.text()));
    }
}
