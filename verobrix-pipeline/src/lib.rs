#![doc(
    html_logo_url = "https://raw.githubusercontent.com/verobrix/verobrix/main/assets/verobrix.svg",
    issue_tracker_base_url = "https://github.com/verobrix/verobrix/issues/"
)]

//! Staged analysis runs over the VeroBrix analyzers.
//!
//! - [`Orchestrator`] - runs interpret, clauses and sentiment, risk and
//!   sovereignty, then remedy, recording each step in a shared
//!   [`ProvenanceLog`](verobrix_provenance::ProvenanceLog)
//! - [`Analyzer`] - the capability trait behind every [`Stage`]
//! - [`AnalysisConfig`] - per-run settings loaded from TOML with environment overrides
//! - [`AnalysisReport`] - the serializable result, marked `degraded` when a stage fell back to its default
//! - [`init_logging`] - installs a `tracing` subscriber
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use verobrix_pipeline::{AnalysisConfig, Orchestrator};
//! use verobrix_provenance::ProvenanceLog;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let orchestrator = Orchestrator::new(Arc::new(ProvenanceLog::in_memory()));
//! let report = orchestrator
//!     .analyze(
//!         "The Tenant shall pay the deposit. The Tenant shall not pay the deposit.",
//!         &AnalysisConfig::default(),
//!     )
//!     .await
//!     .unwrap();
//!
//! assert!(!report.degraded);
//! assert_eq!(report.contradictions.len(), 1);
//! assert!(orchestrator.log().verify_integrity().valid);
//! # }
//! ```

mod analyzers;
mod cancel;
mod config;
mod errors;
mod logging;
mod orchestrator;
mod report;
mod stage;
mod state;

pub use analyzers::{
    ClauseAnalysis, ClauseAnalyzer, ClauseInput, InterpretAnalyzer, RemedyAnalyzer, RemedyInput,
    SentimentAnalyzer, SovereigntyAnalyzer, SovereigntyInput,
};
pub use cancel::CancellationToken;
pub use config::{
    AnalysisConfig, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_TIMEOUT_MS, ENV_CONFIDENCE_THRESHOLD,
    ENV_ENABLED_STAGES, ENV_TIMEOUT_MS, MAX_TIMEOUT_MS,
};
pub use errors::{AnalysisError, AnalysisResult, ConfigResult, ConfigurationError, StageError};
pub use logging::init_logging;
pub use orchestrator::Orchestrator;
pub use report::{AnalysisReport, FailureKind, StageFailure};
pub use stage::{Analyzer, Stage};
pub use state::{InvalidTransition, RunState, RunStateMachine};
