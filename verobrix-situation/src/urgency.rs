//! Urgency from explicit deadlines and pressure language.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use verobrix::{fold_case, matched_terms, words, Entity, EntityKind, TextSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
}

/// A deadline stated in the text, converted to days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
    pub span: TextSpan,
    pub text: String,
    pub days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Urgency {
    pub level: UrgencyLevel,
    pub deadlines: Vec<Deadline>,
    /// Pressure terms found, high-pressure terms first
    pub signals: Vec<String>,
}

impl Urgency {
    /// The shortest stated deadline, if any.
    pub fn nearest_deadline(&self) -> Option<&Deadline> {
        self.deadlines.iter().min_by_key(|d| d.days)
    }
}

const HIGH_DEADLINE_DAYS: u32 = 7;
const MEDIUM_DEADLINE_DAYS: u32 = 30;

const HIGH_PRESSURE_TERMS: &[&str] = &[
    "immediately",
    "immediate",
    "urgent",
    "emergency",
    "deadline",
    "final notice",
    "court date",
    "forthwith",
    "without delay",
];

// plain "due", "by" and "within" are too common to signal anything alone
const MEDIUM_PRESSURE_TERMS: &[&str] = &[
    "soon",
    "promptly",
    "payment due",
    "is due",
    "are due",
    "due date",
    "past due",
    "overdue",
    "as soon as possible",
];

/// Words just before a date that make it a deadline.
const DATE_CUES: &[&str] = &[
    "by",
    "before",
    "due",
    "deadline",
    "until",
    "no later than",
    "on or before",
    "expires",
];

/// How many words before a date are searched for a cue.
const CUE_WINDOW: usize = 4;

static DEADLINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:within|by|before|in|no later than)\s+(?P<count>\d+|one|two|three|four|five|six|seven|eight|nine|ten|fourteen|fifteen|twenty|thirty|sixty|ninety)(?:\s*\(\d+\))?\s+(?:(?:business|calendar|working)\s+)?(?P<unit>days?|weeks?|months?)\b",
    )
    .expect("Invalid deadline regex")
});

fn written_number(word: &str) -> Option<u32> {
    let n = match word {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "fourteen" => 14,
        "fifteen" => 15,
        "twenty" => 20,
        "thirty" => 30,
        "sixty" => 60,
        "ninety" => 90,
        _ => return None,
    };
    Some(n)
}

/// Every "within N days" style deadline in `text`.
pub fn find_deadlines(text: &str) -> Vec<Deadline> {
    DEADLINE_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let count = caps.name("count")?.as_str().to_lowercase();
            let count = count.parse::<u32>().ok().or_else(|| written_number(&count))?;
            let unit = caps.name("unit")?.as_str().to_lowercase();
            let per_unit = if unit.starts_with("week") {
                7
            } else if unit.starts_with("month") {
                30
            } else {
                1
            };
            Some(Deadline {
                span: TextSpan::new(whole.start(), whole.end()),
                text: whole.as_str().to_string(),
                days: count.saturating_mul(per_unit),
            })
        })
        .collect()
}

/// Extracted [`EntityKind::Date`] entities that follow a deadline cue
/// ("by", "due", "no later than", ...), measured in days from `reference`.
///
/// Dates before `reference` are not pending deadlines and are skipped.
pub fn dated_deadlines(text: &str, entities: &[Entity], reference: NaiveDate) -> Vec<Deadline> {
    entities
        .iter()
        .filter(|entity| entity.kind == EntityKind::Date)
        .filter_map(|entity| {
            let date = NaiveDate::parse_from_str(&entity.normalized, "%Y-%m-%d").ok()?;
            let before = text.get(..entity.span.start)?;
            let preceding = words(before);
            let window: Vec<&str> = preceding
                .iter()
                .skip(preceding.len().saturating_sub(CUE_WINDOW))
                .map(|word| word.text)
                .collect();
            if matched_terms(&fold_case(&window.join(" ")), DATE_CUES).is_empty() {
                return None;
            }
            let days = u32::try_from((date - reference).num_days()).ok()?;
            Some(Deadline {
                span: entity.span,
                text: entity.text.clone(),
                days,
            })
        })
        .collect()
}

/// Assess urgency from pressure terms and relative deadlines only.
pub fn assess_urgency(text: &str) -> Urgency {
    assess_urgency_at(text, &[], None)
}

/// Assess urgency.
///
/// High when a deadline is at most a week away or a high-pressure term
/// appears; medium for deadlines within 30 days or medium-pressure terms.
/// With a `reference` date, dated deadlines among `entities` count too.
pub fn assess_urgency_at(text: &str, entities: &[Entity], reference: Option<NaiveDate>) -> Urgency {
    let folded = fold_case(text);
    let high = matched_terms(&folded, HIGH_PRESSURE_TERMS);
    let medium = matched_terms(&folded, MEDIUM_PRESSURE_TERMS);
    let mut deadlines = find_deadlines(text);
    if let Some(reference) = reference {
        deadlines.extend(dated_deadlines(text, entities, reference));
        deadlines.sort_by_key(|deadline| deadline.span.start);
    }
    let nearest = deadlines.iter().map(|d| d.days).min();

    let level = if !high.is_empty() || nearest.map_or(false, |days| days <= HIGH_DEADLINE_DAYS) {
        UrgencyLevel::High
    } else if !medium.is_empty() || nearest.map_or(false, |days| days <= MEDIUM_DEADLINE_DAYS) {
        UrgencyLevel::Medium
    } else {
        UrgencyLevel::Low
    };

    Urgency {
        level,
        deadlines,
        signals: high.into_iter().chain(medium).map(str::to_string).collect(),
    }
}
