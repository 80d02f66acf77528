#![doc(
    html_logo_url = "https://raw.githubusercontent.com/verobrix/verobrix/main/assets/verobrix.svg",
    issue_tracker_base_url = "https://github.com/verobrix/verobrix/issues/"
)]

//! Append-only, hash-chained provenance log.
//!
//! Every pipeline action is recorded as a [`ProvenanceEntry`] holding SHA-256
//! hashes of the action's input and output, plus a `link_hash` over the full
//! serialized previous entry. Editing or removing any entry breaks the chain,
//! which [`ProvenanceLog::verify_integrity`] reports without repairing.
//!
//! - [`ProvenanceLog`] - the single-writer log, in memory or backed by a JSONL file
//! - [`NewEntry`] - builder for an entry before it is sealed into the chain
//! - [`verify_chain`] - replays the chain of an exported slice of entries
//!
//! ## Example
//!
//! ```
//! use verobrix_provenance::{verify_chain, ProvenanceLog};
//!
//! let log = ProvenanceLog::in_memory();
//! log.append("situation_interpreter", "classified input", b"raw", b"traffic_stop", &[("confidence", 0.8)])
//!     .unwrap();
//! log.append("clause_extractor", "extracted clauses", b"raw", b"[]", &[]).unwrap();
//!
//! assert!(log.verify_integrity().valid);
//! assert!(verify_chain(&log.export(1..=2)).valid);
//! ```

mod entry;
mod errors;
mod integrity;
mod log;
mod sink;

pub use entry::{content_hash, NewEntry, ProvenanceEntry, GENESIS_LINK};
pub use errors::{ProvenanceError, ProvenanceResult};
pub use integrity::{verify_chain, IntegrityReport};
pub use log::{ProvenanceLog, SessionSummary};
pub use sink::{EntrySink, JsonlSink};

#[cfg(test)]
mod tests {
    mod log;
    mod persistence;
}
