//! Regex-driven entity extraction.
//!
//! Each [`EntityKind`] has one or more patterns. Matches are trimmed,
//! normalized, and then overlapping mentions of the same kind are merged by
//! keeping the longer span.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use verobrix::{Entity, EntityKind, TextSpan};

/// Capitalized words that start or end a "First Last" pair without naming a person.
const NON_NAME_WORDS: &[&str] = &[
    "The", "This", "That", "These", "Those", "All", "No", "Any", "Each", "Every", "Some", "I",
    "If", "When", "On", "In", "At", "By", "For", "To", "From", "Your", "My", "Our", "Their",
    "His", "Her", "Its", "A", "An", "We", "You", "He", "She", "They", "It", "Notice", "Section",
    "Article", "Dear", "Please", "Pay", "Final", "Date", "Case", "Title", "Officer", "Deputy",
    "Trooper", "Sergeant", "Detective", "Judge", "Justice", "Magistrate", "Police", "Sheriff",
    "County", "City", "State", "Court", "Department", "Agency", "Bureau", "Commission", "Board",
    "Authority", "Office", "Division", "Corporation", "Company", "Bank", "United", "States",
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday",
    "Saturday", "Sunday",
];

static TITLED_PERSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:Officer|Deputy|Trooper|Sergeant|Detective|Judge|Justice|Magistrate|Mr\.|Mrs\.|Ms\.|Dr\.)\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?",
    )
    .expect("Invalid titled person regex")
});

static CAPITALIZED_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)+\b").expect("Invalid capitalized run regex")
});

static CAPITALIZED_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z][a-z]+").expect("Invalid capitalized word regex"));

// Up to four capitalized words before an institutional head noun,
// optionally followed by "of Motor Vehicles" style complements.
static ORGANIZATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:[A-Z][A-Za-z&']*\s+){0,4}(?:Department|Agency|Court|Bureau|Commission|Board|Authority|Office|Division|Corporation|Company|Bank|Inc\.|LLC|Ltd\.)(?:\s+of(?:\s+[A-Z][a-z]+)+)?",
    )
    .expect("Invalid organization regex")
});

static DATES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\b\d{1,2}/\d{1,2}/\d{2,4}\b").expect("Invalid numeric date regex"),
        Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").expect("Invalid ISO date regex"),
        Regex::new(
            r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)\.?\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}\b",
        )
        .expect("Invalid long date regex"),
    ]
});

static AMOUNTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\$\s?\d+(?:,\d{3})*(?:\.\d+)?").expect("Invalid dollar amount regex"),
        Regex::new(r"(?i)\b\d+(?:,\d{3})*(?:\.\d+)?\s+(?:dollars|usd)\b")
            .expect("Invalid worded amount regex"),
    ]
});

static STATUTES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\b\d+\s+U\.S\.C\.?\s*(?:§+\s*)?\d+[a-z]?(?:\([a-z0-9]+\))*")
            .expect("Invalid U.S.C. citation regex"),
        Regex::new(r"\b\d+\s+C\.F\.R\.?\s*(?:§+\s*)?\d+(?:\.\d+)*")
            .expect("Invalid C.F.R. citation regex"),
        Regex::new(r"§+\s*\d+(?:\.\d+)*(?:\([a-z0-9]+\))*").expect("Invalid section sign regex"),
    ]
});

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:case|citation|docket|account|ticket)\s*(?:no\.?|number|#)\s*:?\s*(?P<id>[A-Z0-9][A-Z0-9-]*)",
    )
    .expect("Invalid identifier regex")
});

static ORDINAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d)(?:st|nd|rd|th)\b").expect("Invalid ordinal regex"));

/// Extracts typed entities from raw text.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityExtractor;

impl EntityExtractor {
    pub fn new() -> Self {
        Self
    }

    /// All entities in `text`, merged and sorted by start offset.
    pub fn extract(&self, text: &str) -> Vec<Entity> {
        let mut found = Vec::new();

        for m in TITLED_PERSON.find_iter(text) {
            found.push(self.entity(EntityKind::Person, text, m.start(), m.end()));
        }
        for run in CAPITALIZED_RUN.find_iter(text) {
            if let Some(span) = self.plain_name(run.as_str()) {
                let span = span.offset(run.start());
                found.push(self.entity(EntityKind::Person, text, span.start, span.end));
            }
        }
        for m in ORGANIZATION.find_iter(text) {
            let start = if m.as_str().starts_with("The ") {
                m.start() + 4
            } else {
                m.start()
            };
            found.push(self.entity(EntityKind::Organization, text, start, m.end()));
        }
        for (kind, patterns) in [
            (EntityKind::Date, &*DATES),
            (EntityKind::Amount, &*AMOUNTS),
            (EntityKind::StatuteCitation, &*STATUTES),
        ] {
            for pattern in patterns.iter() {
                for m in pattern.find_iter(text) {
                    found.push(self.entity(kind, text, m.start(), m.end()));
                }
            }
        }
        for caps in IDENTIFIER.captures_iter(text) {
            if let (Some(whole), Some(id)) = (caps.get(0), caps.name("id")) {
                let id = id.as_str().trim_end_matches('-');
                let span = TextSpan::new(whole.start(), whole.start() + whole.as_str().trim_end_matches('-').len());
                found.push(Entity::new(
                    EntityKind::Identifier,
                    span,
                    span.slice(text),
                    id.to_uppercase(),
                ));
            }
        }

        merge_overlapping(found)
    }

    /// A two or three word name inside a run of capitalized words, once
    /// titles and function words are trimmed from both ends.
    fn plain_name(&self, run: &str) -> Option<TextSpan> {
        let words: Vec<_> = CAPITALIZED_WORD.find_iter(run).collect();
        let is_name_word = |m: &regex::Match<'_>| !NON_NAME_WORDS.contains(&m.as_str());

        let first = words.iter().position(is_name_word)?;
        let last = words.iter().rposition(is_name_word)?;
        let kept = &words[first..=last];
        if !(2..=3).contains(&kept.len()) || !kept.iter().all(is_name_word) {
            return None;
        }
        Some(TextSpan::new(kept[0].start(), kept[kept.len() - 1].end()))
    }

    fn entity(&self, kind: EntityKind, text: &str, start: usize, end: usize) -> Entity {
        let span = TextSpan::new(start, end);
        let raw = span.slice(text);
        let normalized = match kind {
            EntityKind::Date => self.normalize_date(raw),
            EntityKind::Amount => normalize_amount(raw),
            _ => collapse_whitespace(raw),
        };
        Entity::new(kind, span, raw, normalized)
    }

    /// ISO `YYYY-MM-DD` when the date parses, otherwise the collapsed text.
    fn normalize_date(&self, raw: &str) -> String {
        let cleaned = ORDINAL_SUFFIX
            .replace_all(&collapse_whitespace(raw), "$1")
            .replace('.', "");

        let formats: &[&str] = if cleaned.contains('/') {
            let short_year = cleaned.rsplit('/').next().map_or(false, |y| y.len() == 2);
            if short_year {
                &["%m/%d/%y"]
            } else {
                &["%m/%d/%Y"]
            }
        } else if cleaned.contains('-') {
            &["%Y-%m-%d"]
        } else {
            &["%B %d, %Y", "%B %d %Y", "%b %d, %Y", "%b %d %Y"]
        };

        formats
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or(cleaned)
    }
}

fn normalize_amount(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Merge overlapping entities of the same kind, keeping the longer span.
///
/// Equal-length overlaps keep the earlier mention. The result is sorted by
/// start offset, then kind.
pub fn merge_overlapping(mut entities: Vec<Entity>) -> Vec<Entity> {
    entities.sort_by(|a, b| {
        (a.kind, a.span.start, std::cmp::Reverse(a.span.len()))
            .cmp(&(b.kind, b.span.start, std::cmp::Reverse(b.span.len())))
    });

    let mut merged: Vec<Entity> = Vec::with_capacity(entities.len());
    for entity in entities {
        match merged.last_mut() {
            Some(last) if last.kind == entity.kind && last.span.overlaps(&entity.span) => {
                if entity.span.len() > last.span.len() {
                    *last = entity;
                }
            }
            _ => merged.push(entity),
        }
    }

    merged.sort_by_key(|entity| (entity.span.start, entity.kind));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_text(text: &str) -> Vec<(EntityKind, String, String)> {
        EntityExtractor::new()
            .extract(text)
            .into_iter()
            .map(|e| (e.kind, e.text, e.normalized))
            .collect()
    }

    #[test]
    fn test_titled_person() {
        assert_eq!(
            kinds_and_text("Officer Smith demanded my license."),
            vec![(
                EntityKind::Person,
                "Officer Smith".to_string(),
                "Officer Smith".to_string()
            )]
        );
    }

    #[test]
    fn test_plain_name_skips_function_words() {
        let entities = kinds_and_text("Signed by Jane Doe for the tenant. The Company replied.");
        assert!(entities.contains(&(
            EntityKind::Person,
            "Jane Doe".to_string(),
            "Jane Doe".to_string()
        )));
        assert!(!entities
            .iter()
            .any(|(kind, text, _)| *kind == EntityKind::Person && text.starts_with("The")));
    }

    #[test]
    fn test_organization_drops_leading_article() {
        let entities = kinds_and_text("Notice from The Springfield Police Department arrived.");
        assert!(entities.contains(&(
            EntityKind::Organization,
            "Springfield Police Department".to_string(),
            "Springfield Police Department".to_string()
        )));
        assert!(!entities.iter().any(|(kind, _, _)| *kind == EntityKind::Person));

        let entities = kinds_and_text("Please contact the Department of Motor Vehicles today.");
        assert!(entities.contains(&(
            EntityKind::Organization,
            "Department of Motor Vehicles".to_string(),
            "Department of Motor Vehicles".to_string()
        )));
    }

    #[test]
    fn test_dates_normalize_to_iso() {
        let entities = kinds_and_text("Due 03/15/2024, hearing on March 5th, 2024 or 2024-04-01.");
        let dates: Vec<String> = entities
            .into_iter()
            .filter(|(kind, _, _)| *kind == EntityKind::Date)
            .map(|(_, _, normalized)| normalized)
            .collect();
        assert_eq!(dates, vec!["2024-03-15", "2024-03-05", "2024-04-01"]);
    }

    #[test]
    fn test_amounts_normalize_to_plain_decimal() {
        let entities = kinds_and_text("Pay $1,250.00 now or 300 dollars later.");
        let amounts: Vec<String> = entities
            .into_iter()
            .filter(|(kind, _, _)| *kind == EntityKind::Amount)
            .map(|(_, _, normalized)| normalized)
            .collect();
        assert_eq!(amounts, vec!["1250.00", "300"]);
    }

    #[test]
    fn test_statute_citation_keeps_longest_span() {
        let entities = kinds_and_text("Rights under 42 U.S.C. § 1983 apply.");
        let statutes: Vec<String> = entities
            .into_iter()
            .filter(|(kind, _, _)| *kind == EntityKind::StatuteCitation)
            .map(|(_, text, _)| text)
            .collect();
        assert_eq!(statutes, vec!["42 U.S.C. § 1983"]);
    }

    #[test]
    fn test_identifier() {
        let entities = kinds_and_text("Re: Case No. 2024-cv-118 filed today");
        assert!(entities.contains(&(
            EntityKind::Identifier,
            "Case No. 2024-cv-118".to_string(),
            "2024-CV-118".to_string()
        )));
    }

    #[test]
    fn test_merge_keeps_longer_and_earlier() {
        let long = Entity::new(EntityKind::Person, TextSpan::new(0, 13), "Officer Smith", "x");
        let short = Entity::new(EntityKind::Person, TextSpan::new(8, 13), "Smith", "x");
        let other_kind = Entity::new(EntityKind::Organization, TextSpan::new(8, 13), "Smith", "x");
        let merged = merge_overlapping(vec![short, other_kind.clone(), long.clone()]);
        assert_eq!(merged, vec![long, other_kind]);

        let first = Entity::new(EntityKind::Date, TextSpan::new(0, 4), "aaaa", "a");
        let second = Entity::new(EntityKind::Date, TextSpan::new(2, 6), "bbbb", "b");
        assert_eq!(merge_overlapping(vec![second, first.clone()]), vec![first]);
    }

    #[test]
    fn test_non_linguistic_input_yields_nothing() {
        assert!(EntityExtractor::new().extract("%%% ^^^ ***").is_empty());
    }

    #[test]
    fn test_extractors_share_compiled_patterns() {
        let text = "Officer Smith cited case no. 24-CV-118 on 03/04/2024 for $150.00.";
        let first = EntityExtractor::new();
        let copied = first;
        assert_eq!(first.extract(text), EntityExtractor::default().extract(text));
        assert_eq!(copied.extract(text).len(), 4);
    }
}
