//! Sentence boundary detection.
//!
//! Splits text on:
//! - Period, question mark, exclamation point
//! - Semicolons (on by default, medium confidence; see [`SentenceSplitter::without_semicolons`])
//! - Blank lines
//!
//! Abbreviations ("U.S.C.", "Inc.", "e.g."), single-letter initials and
//! leading list numbers ("1.") do not end a sentence.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use verobrix::TextSpan;

/// Confidence level for a detected sentence boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentenceConfidence {
    /// Clear sentence boundary (terminal punctuation + capital letter follows, or a blank line)
    High,
    /// Probable boundary (semicolon, or punctuation at the end of the text)
    Medium,
    /// Possible boundary (lowercase continues after the punctuation)
    Low,
}

/// A trimmed, non-empty segment and the confidence of the boundary that closed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentence {
    pub span: TextSpan,
    pub confidence: SentenceConfidence,
}

#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    abbreviations: HashSet<String>,
    include_semicolons: bool,
}

const CLOSERS: &[char] = &['"', '\'', ')', ']', '\u{201d}', '\u{2019}'];

impl SentenceSplitter {
    pub fn new() -> Self {
        let common_abbrevs = [
            "dr", "mr", "mrs", "ms", "prof", "sr", "jr",
            "inc", "ltd", "corp", "co", "llc",
            "e.g", "i.e", "vs", "v", "etc", "approx", "cf",
            "u.s", "u.k", "p.m", "a.m",
            "st", "ave", "blvd", "dept", "fig",
            "u.s.c", "c.f.r", "fed", "reg", "sec", "art", "para", "no",
        ];

        SentenceSplitter {
            abbreviations: common_abbrevs.iter().map(|a| a.to_string()).collect(),
            include_semicolons: true,
        }
    }

    /// Stop treating semicolons as boundaries.
    pub fn without_semicolons(mut self) -> Self {
        self.include_semicolons = false;
        self
    }

    pub fn with_custom_abbreviations(mut self, abbreviations: &[&str]) -> Self {
        for abbrev in abbreviations {
            self.abbreviations
                .insert(abbrev.trim_end_matches('.').to_lowercase());
        }
        self
    }

    fn is_sentence_ending_punctuation(&self, c: char) -> bool {
        matches!(c, '.' | '?' | '!') || (self.include_semicolons && c == ';')
    }

    fn is_abbreviation(&self, word: &str) -> bool {
        self.abbreviations.contains(&word.to_lowercase())
    }

    /// Split `text` into trimmed sentence spans.
    pub fn split(&self, text: &str) -> Vec<Sentence> {
        let mut sentences = Vec::new();
        let mut seg_start = 0;
        let mut pos = 0;

        while let Some(c) = text[pos..].chars().next() {
            let next = pos + c.len_utf8();

            if c == '\n' {
                if let Some(end) = blank_line_end(text, next) {
                    push_trimmed(&mut sentences, text, seg_start, pos, SentenceConfidence::High);
                    seg_start = end;
                    pos = end;
                    continue;
                }
            } else if self.is_sentence_ending_punctuation(c) {
                let end = self.consume_trailing(text, next);
                if self.ends_sentence(text, seg_start, pos, c, end) {
                    let confidence = boundary_confidence(text, c, end);
                    push_trimmed(&mut sentences, text, seg_start, end, confidence);
                    seg_start = end;
                    pos = end;
                    continue;
                }
            }

            pos = next;
        }

        push_trimmed(&mut sentences, text, seg_start, text.len(), SentenceConfidence::Medium);
        sentences
    }

    /// Skip repeated terminal punctuation and closing quotes/brackets.
    fn consume_trailing(&self, text: &str, mut pos: usize) -> usize {
        while let Some(c) = text[pos..].chars().next() {
            if matches!(c, '.' | '?' | '!') || CLOSERS.contains(&c) {
                pos += c.len_utf8();
            } else {
                break;
            }
        }
        pos
    }

    fn ends_sentence(&self, text: &str, seg_start: usize, punc: usize, c: char, end: usize) -> bool {
        // "1.5", "U.S" and "example.com" continue without whitespace
        if text[end..].chars().next().map_or(false, |n| !n.is_whitespace()) {
            return false;
        }
        if c != '.' {
            return true;
        }

        let before = &text[seg_start..punc];
        let word_start = before
            .rfind(|ch: char| !(ch.is_alphanumeric() || ch == '.'))
            .map_or(0, |idx| idx + before[idx..].chars().next().map_or(1, char::len_utf8));
        let word = &before[word_start..];

        if word.is_empty() {
            return true;
        }
        if self.is_abbreviation(word) {
            return false;
        }
        // single-letter initial, "J. Smith"
        let mut chars = word.chars();
        if let (Some(first), None) = (chars.next(), chars.next()) {
            if first.is_alphabetic() {
                return false;
            }
        }
        // leading list number, "1. The Tenant shall..."
        if word.chars().all(|ch| ch.is_ascii_digit()) && before[..word_start].trim().is_empty() {
            return false;
        }
        true
    }
}

impl Default for SentenceSplitter {
    fn default() -> Self {
        Self::new()
    }
}

/// If the line break at `from - 1` is followed by a whitespace-only line, the offset after it.
fn blank_line_end(text: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    for c in text[from..].chars() {
        match c {
            '\n' => return Some(pos + 1),
            ' ' | '\t' | '\r' => pos += c.len_utf8(),
            _ => return None,
        }
    }
    None
}

fn boundary_confidence(text: &str, c: char, end: usize) -> SentenceConfidence {
    if c == ';' {
        return SentenceConfidence::Medium;
    }
    match text[end..].chars().find(|n| !n.is_whitespace()) {
        Some(n) if n.is_uppercase() => SentenceConfidence::High,
        Some(_) => SentenceConfidence::Low,
        None => SentenceConfidence::Medium,
    }
}

fn push_trimmed(
    sentences: &mut Vec<Sentence>,
    text: &str,
    start: usize,
    end: usize,
    confidence: SentenceConfidence,
) {
    let raw = &text[start..end];
    let leading = raw.len() - raw.trim_start().len();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let span = TextSpan::new(start + leading, start + leading + trimmed.len());
    sentences.push(Sentence { span, confidence });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> Vec<&str> {
        SentenceSplitter::new()
            .split(text)
            .into_iter()
            .map(|s| s.span.slice(text))
            .collect()
    }

    #[test]
    fn test_simple_period() {
        let text = "Hello world. Goodbye.";
        let sentences = SentenceSplitter::new().split(text);
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].confidence, SentenceConfidence::High);
        assert_eq!(sentences[1].confidence, SentenceConfidence::Medium);
        assert_eq!(sentences[1].span.slice(text), "Goodbye.");
    }

    #[test]
    fn test_question_and_exclamation() {
        assert_eq!(
            split("How are you? I am fine! Thanks."),
            vec!["How are you?", "I am fine!", "Thanks."]
        );
    }

    #[test]
    fn test_legal_abbreviations_do_not_split() {
        assert_eq!(
            split("Claims arise under 42 U.S.C. 1983 and 12 C.F.R. 1026. Smith v. Jones applies."),
            vec![
                "Claims arise under 42 U.S.C. 1983 and 12 C.F.R. 1026.",
                "Smith v. Jones applies."
            ]
        );
        assert_eq!(
            split("Acme Inc. agrees, e.g. by contract. Done."),
            vec!["Acme Inc. agrees, e.g. by contract.", "Done."]
        );
    }

    #[test]
    fn test_initials_and_list_numbers() {
        assert_eq!(
            split("1. J. Smith shall pay. 2. The Bank may audit."),
            vec!["1. J. Smith shall pay.", "2. The Bank may audit."]
        );
    }

    #[test]
    fn test_decimals_stay_together() {
        assert_eq!(split("Pay 1.5 percent. Now."), vec!["Pay 1.5 percent.", "Now."]);
    }

    #[test]
    fn test_semicolons_are_medium_and_optional() {
        let text = "The Tenant shall pay rent; the Landlord shall repair";
        let sentences = SentenceSplitter::new().split(text);
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].confidence, SentenceConfidence::Medium);
        assert_eq!(sentences[0].span.slice(text), "The Tenant shall pay rent;");

        let sentences = SentenceSplitter::new().without_semicolons().split(text);
        assert_eq!(sentences.len(), 1);
    }

    #[test]
    fn test_blank_lines_split() {
        assert_eq!(
            split("Section heading\n\n  The fee is due\nwithin ten days"),
            vec!["Section heading", "The fee is due\nwithin ten days"]
        );
    }

    #[test]
    fn test_lowercase_continuation_is_low_confidence() {
        let sentences = SentenceSplitter::new().split("It ended. then more");
        assert_eq!(sentences[0].confidence, SentenceConfidence::Low);
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert!(split("").is_empty());
        assert!(split("  \n\n ").is_empty());
        assert_eq!(split(". ; !"), vec![".", ";", "!"]);
    }

    #[test]
    fn test_custom_abbreviations() {
        let splitter = SentenceSplitter::new().with_custom_abbreviations(&["Ord."]);
        let text = "Per Ord. 12 the fee applies.";
        assert_eq!(splitter.split(text).len(), 1);
    }
}
