//! Document templates with `[PLACEHOLDER]` fields.

use std::fmt;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

static PLACEHOLDER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([A-Z][A-Z0-9_/ ]*)\]").expect("Invalid placeholder regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    NoticeOfLawfulTravel,
    FeeScheduleChallenge,
    ReservationOfRights,
    RequestForWrittenClarification,
}

impl TemplateId {
    pub const ALL: [TemplateId; 4] = [
        TemplateId::NoticeOfLawfulTravel,
        TemplateId::FeeScheduleChallenge,
        TemplateId::ReservationOfRights,
        TemplateId::RequestForWrittenClarification,
    ];

    pub fn template(self) -> &'static RemedyTemplate {
        match self {
            TemplateId::NoticeOfLawfulTravel => &NOTICE_OF_LAWFUL_TRAVEL,
            TemplateId::FeeScheduleChallenge => &FEE_SCHEDULE_CHALLENGE,
            TemplateId::ReservationOfRights => &RESERVATION_OF_RIGHTS,
            TemplateId::RequestForWrittenClarification => &REQUEST_FOR_CLARIFICATION,
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.template().title)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct RemedyTemplate {
    pub id: TemplateId,
    pub title: &'static str,
    pub body: &'static str,
    pub legal_basis: &'static [&'static str],
}

impl RemedyTemplate {
    /// Placeholder names in order of first appearance, without repeats.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for caps in PLACEHOLDER_REGEX.captures_iter(self.body) {
            if let Some(name) = caps.get(1).map(|m| m.as_str()) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Substitute `[NAME]` placeholders from `fields`.
    ///
    /// Field names match case-insensitively. Placeholders without a field
    /// are left in place.
    pub fn render(&self, fields: &[(&str, &str)]) -> String {
        PLACEHOLDER_REGEX
            .replace_all(self.body, |caps: &Captures| {
                let name = &caps[1];
                fields
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value.to_string())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

static NOTICE_OF_LAWFUL_TRAVEL: RemedyTemplate = RemedyTemplate {
    id: TemplateId::NoticeOfLawfulTravel,
    title: "Notice of Lawful Travel",
    body: "NOTICE OF LAWFUL TRAVEL

To: [OFFICER/AGENCY]
From: [NAME]
Date: [DATE]

I give notice that I was travelling in my private conveyance and do not consent \
to any presumption of commercial activity. I request the lawful authority and \
the specific statute relied upon for the stop of [DATE OF STOP].

I reserve all rights.

[SIGNATURE]
[NAME]
",
    legal_basis: &["Right to travel", "Due process"],
};

static FEE_SCHEDULE_CHALLENGE: RemedyTemplate = RemedyTemplate {
    id: TemplateId::FeeScheduleChallenge,
    title: "Fee Schedule Challenge",
    body: "FEE SCHEDULE CHALLENGE

To: [AGENCY]
From: [NAME]
Date: [DATE]
Reference: [REFERENCE]

I challenge the authority for the fee of [AMOUNT] and request:
1. The law or regulation that authorizes the fee
2. The published fee schedule and its approval
3. A hearing before any collection action

I reserve all rights.

[SIGNATURE]
[NAME]
",
    legal_basis: &["Due process", "Administrative law", "Fee authority limits"],
};

static RESERVATION_OF_RIGHTS: RemedyTemplate = RemedyTemplate {
    id: TemplateId::ReservationOfRights,
    title: "Reservation of Rights",
    body: "RESERVATION OF RIGHTS

To: [RECIPIENT]
From: [NAME]
Date: [DATE]

Any participation by me in [MATTER] is without prejudice. I reserve all rights \
and waive none.

[SIGNATURE]
[NAME]
",
    legal_basis: &["Common law", "Without prejudice doctrine"],
};

static REQUEST_FOR_CLARIFICATION: RemedyTemplate = RemedyTemplate {
    id: TemplateId::RequestForWrittenClarification,
    title: "Request for Written Clarification",
    body: "REQUEST FOR WRITTEN CLARIFICATION

To: [RECIPIENT]
From: [NAME]
Date: [DATE]
Reference: [REFERENCE]

The provisions of [DOCUMENT] appear to conflict. Please state in writing which \
provision governs and the authority for it.

[SIGNATURE]
[NAME]
",
    legal_basis: &["Contra proferentem", "Notice and opportunity to cure"],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_in_order() {
        assert_eq!(
            TemplateId::FeeScheduleChallenge.template().placeholders(),
            vec!["AGENCY", "NAME", "DATE", "REFERENCE", "AMOUNT", "SIGNATURE"]
        );
        assert_eq!(
            TemplateId::NoticeOfLawfulTravel.template().placeholders(),
            vec!["OFFICER/AGENCY", "NAME", "DATE", "DATE OF STOP", "SIGNATURE"]
        );
    }

    #[test]
    fn test_render_substitutes_known_fields() {
        let rendered = TemplateId::FeeScheduleChallenge
            .template()
            .render(&[("agency", "Springfield DMV"), ("NAME", "Jane Doe"), ("amount", "$150")]);

        assert!(rendered.contains("To: Springfield DMV"));
        assert!(rendered.contains("the fee of $150 and"));
        assert!(rendered.ends_with("[SIGNATURE]\nJane Doe\n"));
        // no field supplied
        assert!(rendered.contains("Date: [DATE]"));
        assert!(rendered.contains("Reference: [REFERENCE]"));
    }

    #[test]
    fn test_every_template_resolves() {
        for id in TemplateId::ALL {
            let template = id.template();
            assert_eq!(template.id, id);
            assert!(template.body.starts_with(&template.title.to_uppercase()));
            assert!(!template.legal_basis.is_empty());
        }
    }

    #[test]
    fn test_render_without_fields_is_identity() {
        let template = TemplateId::ReservationOfRights.template();
        assert_eq!(template.render(&[]), template.body);
    }
}
