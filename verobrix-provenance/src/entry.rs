use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{ProvenanceError, ProvenanceResult};

/// Link hash carried by the first entry of a chain.
pub const GENESIS_LINK: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Hex-encoded SHA-256 of arbitrary content.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// One immutable record in the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    /// Monotonic, gapless, starting at 1
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Acting component name
    pub component: String,
    pub description: String,
    pub input_hash: String,
    pub output_hash: String,
    /// SHA-256 of the previous entry's full serialized record
    pub link_hash: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scores: BTreeMap<String, f64>,
    /// SHA-256 of this record without the `entry_hash` field
    pub entry_hash: String,
}

/// The fields covered by `entry_hash`, in serialization order.
#[derive(Serialize)]
struct SealedFields<'a> {
    sequence: u64,
    timestamp: &'a DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
    component: &'a str,
    description: &'a str,
    input_hash: &'a str,
    output_hash: &'a str,
    link_hash: &'a str,
    #[serde(skip_serializing_if = "no_scores")]
    scores: &'a BTreeMap<String, f64>,
}

fn no_scores(scores: &&BTreeMap<String, f64>) -> bool {
    scores.is_empty()
}

impl ProvenanceEntry {
    /// Recompute the hash this entry should carry in `entry_hash`.
    pub fn compute_entry_hash(&self) -> ProvenanceResult<String> {
        let fields = SealedFields {
            sequence: self.sequence,
            timestamp: &self.timestamp,
            session_id: self.session_id.as_deref(),
            component: &self.component,
            description: &self.description,
            input_hash: &self.input_hash,
            output_hash: &self.output_hash,
            link_hash: &self.link_hash,
            scores: &self.scores,
        };
        Ok(content_hash(&serde_json::to_vec(&fields)?))
    }

    /// Hash of the full serialized record, as stored in the next entry's `link_hash`.
    pub fn record_hash(&self) -> ProvenanceResult<String> {
        Ok(content_hash(&serde_json::to_vec(self)?))
    }
}

/// An entry before it is sealed into the chain.
///
/// ```
/// use verobrix_provenance::{NewEntry, ProvenanceLog};
///
/// let log = ProvenanceLog::in_memory();
/// let entry = log
///     .append_entry(
///         NewEntry::new("sovereignty_scorer", "scored text")
///             .input(b"I do not consent")
///             .output(b"0.7")
///             .session("run-1")
///             .score("sovereignty", 0.7),
///     )
///     .unwrap();
/// assert_eq!(entry.sequence, 1);
/// assert_eq!(entry.session_id.as_deref(), Some("run-1"));
/// ```
#[derive(Debug, Clone)]
pub struct NewEntry<'a> {
    pub(crate) component: &'a str,
    pub(crate) description: String,
    pub(crate) input: &'a [u8],
    pub(crate) output: &'a [u8],
    pub(crate) session_id: Option<String>,
    pub(crate) scores: BTreeMap<String, f64>,
}

impl<'a> NewEntry<'a> {
    pub fn new(component: &'a str, description: impl Into<String>) -> Self {
        Self {
            component,
            description: description.into(),
            input: &[],
            output: &[],
            session_id: None,
            scores: BTreeMap::new(),
        }
    }

    pub fn input(mut self, input: &'a [u8]) -> Self {
        self.input = input;
        self
    }

    pub fn output(mut self, output: &'a [u8]) -> Self {
        self.output = output;
        self
    }

    pub fn session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn score(mut self, name: impl Into<String>, value: f64) -> Self {
        self.scores.insert(name.into(), value);
        self
    }

    /// Seal into a full entry following `previous`.
    pub(crate) fn seal(
        self,
        previous: Option<&ProvenanceEntry>,
        timestamp: DateTime<Utc>,
    ) -> ProvenanceResult<ProvenanceEntry> {
        if let Some((name, _)) = self.scores.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ProvenanceError::InvalidScore { name: name.clone() });
        }

        let (sequence, link_hash) = match previous {
            Some(prev) => (prev.sequence + 1, prev.record_hash()?),
            None => (1, GENESIS_LINK.to_string()),
        };

        let mut entry = ProvenanceEntry {
            sequence,
            timestamp,
            session_id: self.session_id,
            component: self.component.to_string(),
            description: self.description,
            input_hash: content_hash(self.input),
            output_hash: content_hash(self.output),
            link_hash,
            scores: self.scores,
            entry_hash: String::new(),
        };
        entry.entry_hash = entry.compute_entry_hash()?;
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_known_value() {
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_first_entry_links_to_genesis() {
        let entry = NewEntry::new("test", "first").seal(None, Utc::now()).unwrap();
        assert_eq!(entry.sequence, 1);
        assert_eq!(entry.link_hash, GENESIS_LINK);
        assert_eq!(entry.entry_hash, entry.compute_entry_hash().unwrap());
    }

    #[test]
    fn test_second_entry_links_to_first_record() {
        let first = NewEntry::new("test", "first").seal(None, Utc::now()).unwrap();
        let second = NewEntry::new("test", "second")
            .seal(Some(&first), Utc::now())
            .unwrap();
        assert_eq!(second.sequence, 2);
        assert_eq!(second.link_hash, first.record_hash().unwrap());
    }

    #[test]
    fn test_non_finite_score_rejected() {
        let err = NewEntry::new("test", "bad")
            .score("confidence", f64::NAN)
            .seal(None, Utc::now())
            .unwrap_err();
        assert!(matches!(err, ProvenanceError::InvalidScore { name } if name == "confidence"));
    }

    #[test]
    fn test_serialization_round_trip_preserves_hashes() {
        let entry = NewEntry::new("test", "round trip")
            .input(b"in")
            .output(b"out")
            .score("confidence", 0.1 + 0.2)
            .seal(None, Utc::now())
            .unwrap();
        let json = serde_json::to_string(&entry).unwrap();
        let back: ProvenanceEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
        assert_eq!(back.record_hash().unwrap(), entry.record_hash().unwrap());
        assert_eq!(back.compute_entry_hash().unwrap(), entry.entry_hash);
    }
}
