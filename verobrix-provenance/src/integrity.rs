//! Chain verification.
//!
//! Verification walks entries forward and checks, for each one:
//! - its `entry_hash` matches the recomputed hash of its own fields
//! - its `link_hash` matches the hash of the previous full record
//! - its sequence number follows the previous one without a gap
//!
//! The first entry of a live log must additionally link to [`GENESIS_LINK`]
//! with sequence 1. An exported slice has no predecessor, so its first link
//! is taken on trust.

use serde::{Deserialize, Serialize};

use crate::{ProvenanceEntry, GENESIS_LINK};

/// Outcome of replaying a hash chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub valid: bool,
    /// Share of entries that verified, 0.0 - 100.0
    pub percentage: f64,
    /// Sequence number of the first entry that diverges
    pub first_break: Option<u64>,
    pub checked: usize,
    pub broken: usize,
}

impl IntegrityReport {
    fn from_counts(checked: usize, broken: usize, first_break: Option<u64>) -> Self {
        let percentage = if checked == 0 {
            100.0
        } else {
            (checked - broken) as f64 * 100.0 / checked as f64
        };
        Self {
            valid: broken == 0,
            percentage,
            first_break,
            checked,
            broken,
        }
    }
}

/// Replay the chain of an exported slice of entries.
pub fn verify_chain(entries: &[ProvenanceEntry]) -> IntegrityReport {
    verify(entries, false)
}

pub(crate) fn verify(entries: &[ProvenanceEntry], from_genesis: bool) -> IntegrityReport {
    let mut broken = 0;
    let mut first_break = None;

    for (idx, entry) in entries.iter().enumerate() {
        let sealed = entry
            .compute_entry_hash()
            .map_or(false, |hash| hash == entry.entry_hash);

        let linked = match idx.checked_sub(1).map(|prev| &entries[prev]) {
            Some(prev) => {
                entry.sequence == prev.sequence + 1
                    && prev
                        .record_hash()
                        .map_or(false, |hash| hash == entry.link_hash)
            }
            None if from_genesis => entry.sequence == 1 && entry.link_hash == GENESIS_LINK,
            None => true,
        };

        if !(sealed && linked) {
            broken += 1;
            first_break.get_or_insert(entry.sequence);
        }
    }

    IntegrityReport::from_counts(entries.len(), broken, first_break)
}
