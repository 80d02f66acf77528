//! Word-boundary phrase matching over case-folded text.
//!
//! Analyzers keep their vocabularies as `const &[&str]` lists of lowercase
//! phrases and match them against the output of [`fold_case`], which lowercases
//! without moving any byte offsets. Spans found in the folded text are therefore
//! valid spans into the original text.

use crate::TextSpan;

/// Lowercase `text` while keeping every byte offset stable.
///
/// Characters whose lowercase form has a different UTF-8 length (or expands
/// to several characters) are left as they are.
pub fn fold_case(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars() {
        let mut lower = c.to_lowercase();
        match (lower.next(), lower.next()) {
            (Some(l), None) if l.len_utf8() == c.len_utf8() => folded.push(l),
            _ => folded.push(c),
        }
    }
    folded
}

/// Every non-overlapping occurrence of `term` in `haystack` that sits on word boundaries.
///
/// A word boundary is the start or end of the string, or a character that is
/// not alphanumeric. This keeps "fee" from matching inside "feel".
pub fn find_term(haystack: &str, term: &str) -> Vec<TextSpan> {
    let mut found = Vec::new();
    if term.is_empty() {
        return found;
    }

    let mut search_start = 0;
    while let Some(pos) = haystack[search_start..].find(term) {
        let abs_pos = search_start + pos;
        let end_pos = abs_pos + term.len();

        let boundary_before = haystack[..abs_pos]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let boundary_after = haystack[end_pos..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());

        if boundary_before && boundary_after {
            found.push(TextSpan::new(abs_pos, end_pos));
            search_start = end_pos;
        } else {
            // step over one whole char so the next slice stays on a boundary
            let step = haystack[abs_pos..].chars().next().map_or(1, char::len_utf8);
            search_start = abs_pos + step;
        }
    }

    found
}

pub fn contains_term(haystack: &str, term: &str) -> bool {
    !find_term(haystack, term).is_empty()
}

pub fn contains_any(haystack: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| contains_term(haystack, term))
}

/// The subset of `terms` present in `haystack`, in list order.
pub fn matched_terms<'t>(haystack: &str, terms: &[&'t str]) -> Vec<&'t str> {
    terms
        .iter()
        .copied()
        .filter(|term| contains_term(haystack, term))
        .collect()
}
