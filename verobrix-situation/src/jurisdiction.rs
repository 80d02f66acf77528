//! Jurisdiction hints from indicator terms.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use verobrix::matched_terms;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JurisdictionKind {
    Federal,
    State,
    Local,
    Commercial,
}

impl JurisdictionKind {
    pub const ALL: [JurisdictionKind; 4] = [
        JurisdictionKind::Federal,
        JurisdictionKind::State,
        JurisdictionKind::Local,
        JurisdictionKind::Commercial,
    ];

    fn indicators(&self) -> &'static [&'static str] {
        match self {
            JurisdictionKind::Federal => &[
                "federal", "united states", "u.s.", "irs", "fbi", "dea", "atf", "customs",
                "immigration", "social security", "medicare",
            ],
            JurisdictionKind::State => &[
                "state", "commonwealth", "dmv", "department of", "state police", "state court",
                "state agency", "governor", "legislature",
            ],
            JurisdictionKind::Local => &[
                "city", "county", "municipal", "town", "village", "parish", "local", "mayor",
                "council", "commissioner",
            ],
            JurisdictionKind::Commercial => &[
                "commercial", "business", "trade", "commerce", "ucc", "contract", "agreement",
                "transaction", "sale", "purchase",
            ],
        }
    }
}

/// The most likely jurisdiction and the indicators behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JurisdictionHint {
    pub kind: JurisdictionKind,
    /// `min(indicator count / 5, 1)`
    pub confidence: f64,
    pub indicators: Vec<String>,
    /// Other jurisdictions with at least one indicator
    pub secondary: Vec<JurisdictionKind>,
}

const FULL_CONFIDENCE_COUNT: f64 = 5.0;

/// Hint from case-folded text. Returns `None` when nothing matches or the top count is shared.
pub fn jurisdiction_hint(folded: &str) -> Option<JurisdictionHint> {
    let found: BTreeMap<JurisdictionKind, Vec<&str>> = JurisdictionKind::ALL
        .iter()
        .map(|kind| (*kind, matched_terms(folded, kind.indicators())))
        .collect();

    let top = found.values().map(Vec::len).max().unwrap_or(0);
    if top == 0 {
        return None;
    }
    let mut leaders = found.iter().filter(|(_, terms)| terms.len() == top);
    let (kind, terms) = match (leaders.next(), leaders.next()) {
        (Some(leader), None) => leader,
        _ => return None,
    };

    Some(JurisdictionHint {
        kind: *kind,
        confidence: (top as f64 / FULL_CONFIDENCE_COUNT).min(1.0),
        indicators: terms.iter().map(|t| t.to_string()).collect(),
        secondary: found
            .iter()
            .filter(|(other, terms)| *other != kind && !terms.is_empty())
            .map(|(other, _)| *other)
            .collect(),
    })
}
