//! The immutable input document.
//!
//! A [`Document`] is created once per analysis request and never mutated.
//! Every derived record (entities, clauses, triggers) points back into it
//! through byte-offset [`TextSpan`]s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

/// Default upper bound on accepted input, in bytes.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 1024 * 1024;

/// Reasons a piece of text cannot become a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The text is empty or contains only whitespace.
    #[error("input text is empty")]
    Empty,

    /// The text exceeds the configured size limit.
    #[error("input is {len} bytes, limit is {limit}")]
    TooLarge { len: usize, limit: usize },
}

/// A half-open byte range `[start, end)` into a document's text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {} after end {}", start, end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when `other` lies entirely within this span.
    pub fn contains(&self, other: &TextSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True when the two spans share at least one byte.
    pub fn overlaps(&self, other: &TextSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Shift both ends by `by` bytes.
    pub fn offset(self, by: usize) -> Self {
        Self::new(self.start + by, self.end + by)
    }

    /// The covered text, or `""` when the span does not fall on char boundaries of `text`.
    pub fn slice<'t>(&self, text: &'t str) -> &'t str {
        text.get(self.start..self.end).unwrap_or("")
    }
}

/// Optional information about where the text came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Immutable analysis input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    metadata: SourceMetadata,
}

impl Document {
    /// Create a document, rejecting empty input and input above [`DEFAULT_MAX_INPUT_BYTES`].
    pub fn new(text: impl Into<String>) -> Result<Self, DocumentError> {
        Self::with_limit(text, DEFAULT_MAX_INPUT_BYTES)
    }

    /// Create a document with an explicit size limit.
    pub fn with_limit(text: impl Into<String>, limit: usize) -> Result<Self, DocumentError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DocumentError::Empty);
        }
        if text.len() > limit {
            return Err(DocumentError::TooLarge {
                len: text.len(),
                limit,
            });
        }
        Ok(Self {
            text,
            metadata: SourceMetadata::default(),
        })
    }

    pub fn with_metadata(mut self, metadata: SourceMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Hex-encoded SHA-256 of the raw text.
    pub fn content_hash(&self) -> String {
        hex::encode(Sha256::digest(self.text.as_bytes()))
    }

    /// Word tokens of the text, per Unicode word segmentation.
    pub fn words(&self) -> Vec<Word<'_>> {
        words(&self.text)
    }

    /// A lightweight, serializable reference to this document for reports.
    pub fn reference(&self) -> DocumentRef {
        DocumentRef {
            length: self.text.len(),
            content_hash: self.content_hash(),
            metadata: self.metadata.clone(),
        }
    }
}

/// What a report keeps of the document it was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub length: usize,
    pub content_hash: String,
    pub metadata: SourceMetadata,
}

/// A word token and where it sits in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word<'a> {
    pub text: &'a str,
    pub span: TextSpan,
}

/// Split `text` into word tokens, dropping whitespace and punctuation.
pub fn words(text: &str) -> Vec<Word<'_>> {
    text.unicode_word_indices()
        .map(|(start, word)| Word {
            text: word,
            span: TextSpan::new(start, start + word.len()),
        })
        .collect()
}
