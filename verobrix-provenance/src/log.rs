use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::integrity::verify;
use crate::{
    EntrySink, IntegrityReport, JsonlSink, NewEntry, ProvenanceEntry, ProvenanceError,
    ProvenanceResult,
};

struct LogState {
    entries: Vec<ProvenanceEntry>,
    sink: Option<Box<dyn EntrySink>>,
}

/// The process-wide, append-only record of pipeline actions.
///
/// Writers are serialized through a single mutex. Readers copy out a
/// consistent prefix of the chain and never observe a half-written entry.
/// Create one per process and share it by `Arc`.
pub struct ProvenanceLog {
    state: Mutex<LogState>,
}

impl std::fmt::Debug for ProvenanceLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvenanceLog")
            .field("len", &self.len())
            .finish()
    }
}

impl ProvenanceLog {
    /// A log kept only in memory.
    pub fn in_memory() -> Self {
        Self {
            state: Mutex::new(LogState {
                entries: Vec::new(),
                sink: None,
            }),
        }
    }

    /// Open a JSONL-backed log, continuing any chain already stored at `path`.
    ///
    /// Loaded entries are not repaired; call [`verify_integrity`](Self::verify_integrity)
    /// to find out whether the stored chain is intact.
    pub fn open(path: impl AsRef<Path>) -> ProvenanceResult<Self> {
        let entries = JsonlSink::load(&path)?;
        let sink = JsonlSink::open(&path)?;
        debug!(
            path = %path.as_ref().display(),
            entries = entries.len(),
            "opened provenance log"
        );
        Ok(Self::with_sink(Box::new(sink), entries))
    }

    /// A log continuing `existing` and writing new entries to `sink`.
    pub fn with_sink(sink: Box<dyn EntrySink>, existing: Vec<ProvenanceEntry>) -> Self {
        Self {
            state: Mutex::new(LogState {
                entries: existing,
                sink: Some(sink),
            }),
        }
    }

    /// Append an entry for `component` with hashed `input`/`output` and optional named scores.
    pub fn append(
        &self,
        component: &str,
        description: &str,
        input: &[u8],
        output: &[u8],
        scores: &[(&str, f64)],
    ) -> ProvenanceResult<ProvenanceEntry> {
        let entry = scores.iter().fold(
            NewEntry::new(component, description)
                .input(input)
                .output(output),
            |entry, (name, value)| entry.score(*name, *value),
        );
        self.append_entry(entry)
    }

    /// Seal `new` into the chain and persist it.
    pub fn append_entry(&self, new: NewEntry<'_>) -> ProvenanceResult<ProvenanceEntry> {
        let mut state = self.state.lock().map_err(|_| ProvenanceError::Poisoned)?;

        let entry = new.seal(state.entries.last(), Utc::now())?;
        if let Some(sink) = state.sink.as_mut() {
            sink.write(&entry)?;
        }
        state.entries.push(entry.clone());

        debug!(
            sequence = entry.sequence,
            component = %entry.component,
            "provenance entry appended"
        );
        Ok(entry)
    }

    /// Readers recover from poisoning: entries are only pushed once fully sealed.
    fn read(&self) -> MutexGuard<'_, LogState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last_sequence(&self) -> Option<u64> {
        self.read().entries.last().map(|entry| entry.sequence)
    }

    /// Copy of the whole chain as it stands now.
    pub fn snapshot(&self) -> Vec<ProvenanceEntry> {
        self.read().entries.clone()
    }

    /// Ordered copy of the entries whose sequence numbers fall in `range`.
    pub fn export(&self, range: RangeInclusive<u64>) -> Vec<ProvenanceEntry> {
        self.read()
            .entries
            .iter()
            .filter(|entry| range.contains(&entry.sequence))
            .cloned()
            .collect()
    }

    pub fn entries_by_component(&self, component: &str) -> Vec<ProvenanceEntry> {
        self.read()
            .entries
            .iter()
            .filter(|entry| entry.component == component)
            .cloned()
            .collect()
    }

    /// Recompute every link from the start of the chain.
    pub fn verify_integrity(&self) -> IntegrityReport {
        let snapshot = self.snapshot();
        let report = verify(&snapshot, true);
        if let Some(first_break) = report.first_break {
            warn!(
                first_break,
                broken = report.broken,
                checked = report.checked,
                "provenance chain integrity violation"
            );
        }
        report
    }

    /// Like [`verify_integrity`](Self::verify_integrity), but a break is an error.
    pub fn ensure_integrity(&self) -> ProvenanceResult<IntegrityReport> {
        let report = self.verify_integrity();
        match report.first_break {
            Some(first_break) => Err(ProvenanceError::ChainIntegrity { first_break }),
            None => Ok(report),
        }
    }

    /// Aggregate view of the entries written under `session_id`.
    pub fn session_summary(&self, session_id: &str) -> SessionSummary {
        let state = self.read();
        let session: Vec<&ProvenanceEntry> = state
            .entries
            .iter()
            .filter(|entry| entry.session_id.as_deref() == Some(session_id))
            .collect();

        let components: BTreeSet<String> =
            session.iter().map(|entry| entry.component.clone()).collect();

        let mut totals: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        for entry in &session {
            for (name, value) in &entry.scores {
                let total = totals.entry(name.clone()).or_insert((0.0, 0));
                total.0 += value;
                total.1 += 1;
            }
        }

        SessionSummary {
            session_id: session_id.to_string(),
            entries: session.len(),
            components: components.into_iter().collect(),
            first_sequence: session.first().map(|entry| entry.sequence),
            last_sequence: session.last().map(|entry| entry.sequence),
            average_scores: totals
                .into_iter()
                .map(|(name, (sum, count))| (name, sum / count as f64))
                .collect(),
        }
    }
}

/// Per-session rollup of the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub entries: usize,
    /// Distinct component names, sorted
    pub components: Vec<String>,
    pub first_sequence: Option<u64>,
    pub last_sequence: Option<u64>,
    pub average_scores: BTreeMap<String, f64>,
}
