//! The serializable result of one analysis run.

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use verobrix::DocumentRef;
use verobrix_clauses::{Clause, Contradiction};
use verobrix_remedy::Remedy;
use verobrix_scoring::{RiskAssessment, SentimentResult, SovereigntyScore};
use verobrix_situation::Situation;

use crate::stage::Stage;
use crate::state::RunState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    Error,
}

/// A non-fatal stage failure that was replaced by the stage's default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub document: DocumentRef,
    pub situation: Situation,
    pub clauses: Vec<Clause>,
    pub contradictions: Vec<Contradiction>,
    pub sentiment: SentimentResult,
    pub risk: RiskAssessment,
    pub sovereignty: SovereigntyScore,
    pub remedies: Vec<Remedy>,
    /// `[first_seq, last_seq]` of the entries this run wrote. Entries from
    /// concurrent runs on the same log may fall inside the range.
    pub provenance_range: [u64; 2],
    /// True when any enabled stage failed and its default was used
    pub degraded: bool,
    /// Stages replaced by their defaults, in stage order; empty unless degraded
    pub failed_stages: Vec<Stage>,
    pub stage_failures: Vec<StageFailure>,
    pub skipped_stages: Vec<Stage>,
    pub state_history: Vec<RunState>,
}

impl AnalysisReport {
    pub fn provenance_range(&self) -> RangeInclusive<u64> {
        self.provenance_range[0]..=self.provenance_range[1]
    }

    pub fn final_state(&self) -> Option<RunState> {
        self.state_history.last().copied()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
