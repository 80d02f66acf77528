//! Runs the analyzers in stage order and records every step in the
//! provenance log.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{NaiveTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;
use verobrix::{Document, DocumentError, SourceMetadata};
use verobrix_provenance::{verify_chain, NewEntry, ProvenanceError, ProvenanceLog};
use verobrix_remedy::Remedy;
use verobrix_scoring::{assess_risk, SentimentResult, SovereigntyScore};
use verobrix_situation::Situation;

use crate::analyzers::{
    ClauseAnalysis, ClauseAnalyzer, ClauseInput, InterpretAnalyzer, RemedyAnalyzer, RemedyInput,
    SentimentAnalyzer, SovereigntyAnalyzer, SovereigntyInput,
};
use crate::cancel::CancellationToken;
use crate::config::AnalysisConfig;
use crate::errors::{AnalysisError, AnalysisResult, StageError};
use crate::report::{AnalysisReport, FailureKind, StageFailure};
use crate::stage::{Analyzer, Stage};
use crate::state::{RunState, RunStateMachine};

const ORCHESTRATOR: &str = "orchestrator";
const RISK_ASSESSOR: &str = "risk_assessor";

type Shared<I, O> = Arc<dyn Analyzer<I, O>>;

/// Drives analysis runs against a shared provenance log.
///
/// Runs share nothing but the log; the orchestrator itself is immutable and
/// can serve concurrent runs.
pub struct Orchestrator {
    log: Arc<ProvenanceLog>,
    interpreter: Shared<Document, Situation>,
    clauses: Shared<ClauseInput, ClauseAnalysis>,
    sentiment: Shared<Document, SentimentResult>,
    sovereignty: Shared<SovereigntyInput, SovereigntyScore>,
    remedy: Shared<RemedyInput, Vec<Remedy>>,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("entries", &self.log.len())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// An orchestrator with the built-in analyzers.
    pub fn new(log: Arc<ProvenanceLog>) -> Self {
        Self {
            log,
            interpreter: Arc::new(InterpretAnalyzer::default()),
            clauses: Arc::new(ClauseAnalyzer::default()),
            sentiment: Arc::new(SentimentAnalyzer::default()),
            sovereignty: Arc::new(SovereigntyAnalyzer),
            remedy: Arc::new(RemedyAnalyzer),
        }
    }

    pub fn with_interpreter(
        mut self,
        analyzer: impl Analyzer<Document, Situation> + 'static,
    ) -> Self {
        self.interpreter = Arc::new(analyzer);
        self
    }

    pub fn with_clause_analyzer(
        mut self,
        analyzer: impl Analyzer<ClauseInput, ClauseAnalysis> + 'static,
    ) -> Self {
        self.clauses = Arc::new(analyzer);
        self
    }

    pub fn with_sentiment_analyzer(
        mut self,
        analyzer: impl Analyzer<Document, SentimentResult> + 'static,
    ) -> Self {
        self.sentiment = Arc::new(analyzer);
        self
    }

    pub fn with_sovereignty_analyzer(
        mut self,
        analyzer: impl Analyzer<SovereigntyInput, SovereigntyScore> + 'static,
    ) -> Self {
        self.sovereignty = Arc::new(analyzer);
        self
    }

    pub fn with_remedy_analyzer(
        mut self,
        analyzer: impl Analyzer<RemedyInput, Vec<Remedy>> + 'static,
    ) -> Self {
        self.remedy = Arc::new(analyzer);
        self
    }

    pub fn log(&self) -> &Arc<ProvenanceLog> {
        &self.log
    }

    /// Analyze raw text.
    ///
    /// Invalid configuration and rejected input fail before any provenance
    /// entry is written.
    pub async fn analyze(
        &self,
        text: &str,
        config: &AnalysisConfig,
    ) -> AnalysisResult<AnalysisReport> {
        config.validate()?;
        let mut document = Document::with_limit(text, config.max_input_bytes)?;
        if let Some(date) = config.reference_date {
            document = document.with_metadata(SourceMetadata {
                timestamp: Some(date.and_time(NaiveTime::MIN).and_utc()),
                ..SourceMetadata::default()
            });
        }
        self.analyze_document(document, config, &CancellationToken::new())
            .await
    }

    /// Analyze a prepared document, stopping at the next stage boundary once
    /// `cancel` is triggered.
    pub async fn analyze_document(
        &self,
        document: Document,
        config: &AnalysisConfig,
        cancel: &CancellationToken,
    ) -> AnalysisResult<AnalysisReport> {
        config.validate()?;
        if document.len() > config.max_input_bytes {
            return Err(DocumentError::TooLarge {
                len: document.len(),
                limit: config.max_input_bytes,
            }
            .into());
        }

        let run_id = Uuid::new_v4();
        let span = info_span!("analysis", run_id = %run_id);
        self.execute(run_id, Arc::new(document), config, cancel)
            .instrument(span)
            .await
    }

    async fn execute(
        &self,
        run_id: Uuid,
        document: Arc<Document>,
        config: &AnalysisConfig,
        cancel: &CancellationToken,
    ) -> AnalysisResult<AnalysisReport> {
        let started_at = Utc::now();
        let started = Instant::now();
        let text = document.text().as_bytes();
        let mut run = Run::new(&self.log, run_id);

        info!(bytes = document.len(), "analysis started");
        run.record(
            NewEntry::new(ORCHESTRATOR, "run started")
                .input(text)
                .output(&to_bytes(config)?)
                .score("confidence_threshold", config.confidence_threshold)
                .score("timeout_ms", config.timeout_ms as f64),
        )?;

        run.enter(RunState::Interpreting, Stage::Interpret, cancel)?;
        let situation = match run_analyzer(
            Stage::Interpret,
            self.interpreter.clone(),
            document.clone(),
            config.timeout_ms,
        )
        .await
        {
            Ok(situation) => situation,
            Err(failure) => return Err(run.abort(failure, text, config.timeout_ms)),
        };
        run.record(
            NewEntry::new(
                Stage::Interpret.component(),
                format!("classified as {}", situation.situation_type),
            )
            .input(text)
            .output(&to_bytes(&situation)?)
            .score("confidence", situation.confidence),
        )?;

        run.enter(RunState::Analyzing, Stage::Clauses, cancel)?;
        let clause_input = Arc::new(ClauseInput {
            document: (*document).clone(),
            entities: situation.entities.clone(),
            confidence_threshold: config.confidence_threshold,
        });
        let (clauses_outcome, sentiment_outcome) = tokio::join!(
            run_enabled(Stage::Clauses, config, &self.clauses, clause_input),
            run_enabled(Stage::Sentiment, config, &self.sentiment, document.clone()),
        );

        let clause_analysis = match clauses_outcome {
            Some(Ok(analysis)) => {
                run.record(
                    NewEntry::new(
                        Stage::Clauses.component(),
                        format!(
                            "extracted {} clauses, found {} contradictions",
                            analysis.clauses.len(),
                            analysis.contradictions.len()
                        ),
                    )
                    .input(text)
                    .output(&to_bytes(&analysis)?)
                    .score("clauses", analysis.clauses.len() as f64)
                    .score("contradictions", analysis.contradictions.len() as f64),
                )?;
                analysis
            }
            other => {
                run.fall_back(Stage::Clauses, other.and_then(Result::err), text)?;
                ClauseAnalysis::default()
            }
        };

        let sentiment = match sentiment_outcome {
            Some(Ok(sentiment)) => {
                run.record(
                    NewEntry::new(
                        Stage::Sentiment.component(),
                        format!("{} triggers", sentiment.triggers.len()),
                    )
                    .input(text)
                    .output(&to_bytes(&sentiment)?)
                    .score("sentiment", sentiment.score),
                )?;
                sentiment
            }
            other => {
                run.fall_back(Stage::Sentiment, other.and_then(Result::err), text)?;
                SentimentResult::neutral()
            }
        };

        run.enter(RunState::Scoring, Stage::Sovereignty, cancel)?;
        let risk = assess_risk(
            &sentiment,
            situation.urgency.level,
            &clause_analysis.contradictions,
            document.text(),
        );
        run.record(
            NewEntry::new(RISK_ASSESSOR, format!("rule {}", risk.rule))
                .input(text)
                .output(&to_bytes(&risk)?)
                .score("sentiment", sentiment.score)
                .score("contradictions", clause_analysis.contradictions.len() as f64),
        )?;

        let sovereignty_input = Arc::new(SovereigntyInput {
            document: (*document).clone(),
            rubric: config.sovereignty.clone(),
        });
        let sovereignty = match run_enabled(
            Stage::Sovereignty,
            config,
            &self.sovereignty,
            sovereignty_input,
        )
        .await
        {
            Some(Ok(score)) => {
                run.record(
                    NewEntry::new(
                        Stage::Sovereignty.component(),
                        format!("{} flags", score.flags.len()),
                    )
                    .input(text)
                    .output(&to_bytes(&score)?)
                    .score("overall", score.overall)
                    .score("non_servility", score.non_servility)
                    .score("remedy_alignment", score.remedy_alignment),
                )?;
                score
            }
            other => {
                run.fall_back(Stage::Sovereignty, other.and_then(Result::err), text)?;
                SovereigntyScore::neutral()
            }
        };

        run.enter(RunState::Synthesizing, Stage::Remedy, cancel)?;
        let remedy_input = Arc::new(RemedyInput {
            situation_type: situation.situation_type,
            contradictions: clause_analysis.contradictions.clone(),
            risk: risk.clone(),
            sovereignty: sovereignty.clone(),
            rubric: config.sovereignty.clone(),
        });
        let remedy_bytes = to_bytes(&remedy_input.contradictions)?;
        let remedies = match run_enabled(Stage::Remedy, config, &self.remedy, remedy_input).await {
            Some(Ok(remedies)) => {
                run.record(
                    NewEntry::new(
                        Stage::Remedy.component(),
                        format!("synthesized {} remedies", remedies.len()),
                    )
                    .input(&remedy_bytes)
                    .output(&to_bytes(&remedies)?)
                    .score("remedies", remedies.len() as f64)
                    .score("remedy_sovereignty", mean_sovereignty(&remedies)),
                )?;
                remedies
            }
            other => {
                run.fall_back(Stage::Remedy, other.and_then(Result::err), &remedy_bytes)?;
                Vec::new()
            }
        };

        run.machine.transition(RunState::Done)?;
        let degraded = !run.failures.is_empty();
        run.record(
            NewEntry::new(
                ORCHESTRATOR,
                if degraded {
                    "run completed (degraded)"
                } else {
                    "run completed"
                },
            )
            .input(text)
            .score("degraded", if degraded { 1.0 } else { 0.0 }),
        )?;

        let range = run.range();
        let integrity = verify_chain(&self.log.export(range[0]..=range[1]));
        if !integrity.valid {
            let first_break = integrity.first_break.unwrap_or(range[0]);
            warn!(first_break, "provenance chain broken");
            return Err(AnalysisError::ChainIntegrity { first_break });
        }

        info!(
            degraded,
            situation = %situation.situation_type,
            contradictions = clause_analysis.contradictions.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis finished"
        );

        Ok(AnalysisReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            document: document.reference(),
            situation,
            clauses: clause_analysis.clauses,
            contradictions: clause_analysis.contradictions,
            sentiment,
            risk,
            sovereignty,
            remedies,
            provenance_range: range,
            degraded,
            failed_stages: run.failures.iter().map(|failure| failure.stage).collect(),
            stage_failures: run.failures,
            skipped_stages: run.skipped,
            state_history: run.machine.history().to_vec(),
        })
    }
}

/// Bookkeeping for one run.
struct Run<'a> {
    log: &'a ProvenanceLog,
    session: String,
    machine: RunStateMachine,
    first: Option<u64>,
    last: Option<u64>,
    failures: Vec<StageFailure>,
    skipped: Vec<Stage>,
}

impl<'a> Run<'a> {
    fn new(log: &'a ProvenanceLog, run_id: Uuid) -> Self {
        Self {
            log,
            session: run_id.to_string(),
            machine: RunStateMachine::new(),
            first: None,
            last: None,
            failures: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn record(&mut self, entry: NewEntry<'_>) -> AnalysisResult<()> {
        let entry = self.log.append_entry(entry.session(self.session.as_str()))?;
        self.first.get_or_insert(entry.sequence);
        self.last = Some(entry.sequence);
        Ok(())
    }

    fn range(&self) -> [u64; 2] {
        let first = self.first.unwrap_or_default();
        [first, self.last.unwrap_or(first)]
    }

    /// Stage boundary: stop here if cancelled, otherwise move to `state`.
    fn enter(
        &mut self,
        state: RunState,
        stage: Stage,
        cancel: &CancellationToken,
    ) -> AnalysisResult<()> {
        if cancel.is_cancelled() {
            warn!(stage = %stage, "run cancelled");
            self.machine.fail(stage)?;
            self.record(NewEntry::new(
                ORCHESTRATOR,
                format!("run cancelled before {}", stage),
            ))?;
            return Err(AnalysisError::Cancelled { stage });
        }
        self.machine.transition(state)?;
        Ok(())
    }

    /// Record why a stage produced no output. `None` means it was disabled.
    fn fall_back(
        &mut self,
        stage: Stage,
        failure: Option<StageFailure>,
        input: &[u8],
    ) -> AnalysisResult<()> {
        match failure {
            None => {
                debug!(stage = %stage, "stage disabled");
                self.record(NewEntry::new(stage.component(), "skipped (disabled)").input(input))?;
                self.skipped.push(stage);
            }
            Some(failure) => {
                warn!(stage = %stage, reason = %failure.message, "stage degraded to default");
                self.record(
                    NewEntry::new(
                        stage.component(),
                        format!("stage failed, default used: {}", failure.message),
                    )
                    .input(input),
                )?;
                self.failures.push(failure);
            }
        }
        Ok(())
    }

    /// A fatal failure: mark the run failed and turn the failure into an error.
    fn abort(&mut self, failure: StageFailure, input: &[u8], timeout_ms: u64) -> AnalysisError {
        error!(stage = %failure.stage, reason = %failure.message, "analysis failed");
        if let Err(e) = self.machine.fail(failure.stage) {
            return e.into();
        }
        if let Err(e) = self.record(
            NewEntry::new(
                failure.stage.component(),
                format!("stage failed, run aborted: {}", failure.message),
            )
            .input(input),
        ) {
            return e;
        }
        match failure.kind {
            FailureKind::Timeout => AnalysisError::StageTimeout {
                stage: failure.stage,
                timeout_ms,
            },
            FailureKind::Error => AnalysisError::StageFailure {
                stage: failure.stage,
                message: failure.message,
            },
        }
    }
}

/// Mean overall score of the scored remedies; neutral when none is scored.
fn mean_sovereignty(remedies: &[Remedy]) -> f64 {
    let scores: Vec<f64> = remedies
        .iter()
        .filter_map(|remedy| remedy.sovereignty.as_ref())
        .map(|score| score.overall)
        .collect();
    if scores.is_empty() {
        SovereigntyScore::neutral().overall
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

/// Run `analyzer` if `stage` is enabled; `None` when it is not.
async fn run_enabled<I, O>(
    stage: Stage,
    config: &AnalysisConfig,
    analyzer: &Shared<I, O>,
    input: Arc<I>,
) -> Option<Result<O, StageFailure>>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    if !config.is_enabled(stage) {
        return None;
    }
    Some(run_analyzer(stage, analyzer.clone(), input, config.timeout_ms).await)
}

/// One analyzer call on the blocking pool, bounded by `timeout_ms`.
///
/// A call that times out keeps its blocking thread until it returns; its
/// result is discarded.
async fn run_analyzer<I, O>(
    stage: Stage,
    analyzer: Shared<I, O>,
    input: Arc<I>,
    timeout_ms: u64,
) -> Result<O, StageFailure>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    let started = Instant::now();
    let task = tokio::task::spawn_blocking(move || analyzer.analyze(&input));

    let outcome = match tokio::time::timeout(Duration::from_millis(timeout_ms), task).await {
        Ok(Ok(Ok(output))) => Ok(output),
        Ok(Ok(Err(stage_error))) => Err(StageFailure {
            stage,
            kind: FailureKind::Error,
            message: stage_error.to_string(),
        }),
        Ok(Err(join_error)) => Err(StageFailure {
            stage,
            kind: FailureKind::Error,
            message: StageError::Panicked {
                message: join_error.to_string(),
            }
            .to_string(),
        }),
        Err(_) => Err(StageFailure {
            stage,
            kind: FailureKind::Timeout,
            message: format!("no result within {} ms", timeout_ms),
        }),
    };

    debug!(
        stage = %stage,
        elapsed_ms = started.elapsed().as_millis() as u64,
        ok = outcome.is_ok(),
        "stage finished"
    );
    outcome
}

fn to_bytes<T: Serialize + ?Sized>(value: &T) -> AnalysisResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| AnalysisError::from(ProvenanceError::from(e)))
}
