#![doc(
    html_logo_url = "https://raw.githubusercontent.com/verobrix/verobrix/main/assets/verobrix.svg",
    issue_tracker_base_url = "https://github.com/verobrix/verobrix/issues/"
)]

//! Core data model shared by every VeroBrix analyzer.
//!
//! - [`Document`] - the immutable input text plus optional [`SourceMetadata`]
//! - [`TextSpan`] - half-open byte ranges into a document
//! - [`Entity`] - typed mentions produced by the situation interpreter
//! - [`Scored<T>`] - values carrying a confidence and the rule that produced them
//! - [`find_term`] / [`contains_term`] - case-folded, word-boundary phrase matching
//! - [`SpanDisplay`] - renders labelled spans under a line of text for snapshot tests
//!
//! ## Example
//!
//! ```
//! use verobrix::{Document, SpanDisplay, find_term, fold_case};
//!
//! let doc = Document::new("The Tenant shall pay rent.").unwrap();
//! let folded = fold_case(doc.text());
//! let spans = find_term(&folded, "shall");
//! assert_eq!(spans[0].slice(doc.text()), "shall");
//!
//! let mut display = SpanDisplay::new(doc.text());
//! display.include(spans[0], "Obligation");
//! assert!(display.to_string().contains("╰───╯Obligation"));
//! ```

mod display;
mod document;
mod entity;
mod matching;
mod scored;

pub use display::SpanDisplay;
pub use document::{
    words, Document, DocumentError, DocumentRef, SourceMetadata, TextSpan, Word,
    DEFAULT_MAX_INPUT_BYTES,
};
pub use entity::{Entity, EntityKind};
pub use matching::{contains_any, contains_term, find_term, fold_case, matched_terms};
pub use scored::{ScoreSource, Scored};
