use std::sync::Arc;
use std::thread;
use std::time::Duration;

use verobrix::Document;
use verobrix_provenance::ProvenanceLog;
use verobrix_scoring::{SentimentCategory, SentimentResult, SovereigntyScore};
use verobrix_situation::Situation;

use crate::{
    AnalysisConfig, AnalysisError, Analyzer, CancellationToken, FailureKind, InterpretAnalyzer,
    Orchestrator, RunState, SentimentAnalyzer, Stage, StageError,
};

const TRAFFIC_STOP: &str = "Officer Smith demanded my license. I am required by law to comply.";

struct Failing;

impl<I, O> Analyzer<I, O> for Failing {
    fn analyze(&self, _input: &I) -> Result<O, StageError> {
        Err(StageError::failed("model unavailable"))
    }
}

/// Sleeps before delegating to `inner`.
struct Delayed<A> {
    delay: Duration,
    inner: A,
}

impl<A> Delayed<A> {
    fn by_millis(millis: u64, inner: A) -> Self {
        Self {
            delay: Duration::from_millis(millis),
            inner,
        }
    }
}

impl<I, O, A: Analyzer<I, O>> Analyzer<I, O> for Delayed<A> {
    fn analyze(&self, input: &I) -> Result<O, StageError> {
        thread::sleep(self.delay);
        self.inner.analyze(input)
    }
}

struct Panicking;

impl<I, O> Analyzer<I, O> for Panicking {
    fn analyze(&self, _input: &I) -> Result<O, StageError> {
        panic!("analyzer bug")
    }
}

/// Interprets normally, then cancels the run it belongs to.
struct CancelAfterInterpret {
    token: CancellationToken,
    inner: InterpretAnalyzer,
}

impl Analyzer<Document, Situation> for CancelAfterInterpret {
    fn analyze(&self, document: &Document) -> Result<Situation, StageError> {
        let situation = self.inner.analyze(document);
        self.token.cancel();
        situation
    }
}

fn orchestrator() -> Orchestrator {
    Orchestrator::new(Arc::new(ProvenanceLog::in_memory()))
}

fn short_timeout() -> AnalysisConfig {
    AnalysisConfig {
        timeout_ms: 50,
        ..AnalysisConfig::default()
    }
}

#[tokio::test]
async fn test_failing_clause_stage_degrades() {
    let orchestrator = orchestrator().with_clause_analyzer(Failing);
    let report = orchestrator
        .analyze(TRAFFIC_STOP, &AnalysisConfig::default())
        .await
        .unwrap();

    assert!(report.degraded);
    assert_eq!(report.failed_stages, vec![Stage::Clauses]);
    assert_eq!(report.stage_failures[0].kind, FailureKind::Error);
    assert_eq!(report.stage_failures[0].message, "model unavailable");
    assert!(report.clauses.is_empty());
    assert!(report.contradictions.is_empty());

    // the rest of the run is unaffected
    assert_eq!(report.sentiment.category, SentimentCategory::Concerning);
    assert!(!report.remedies.is_empty());
    assert_eq!(report.final_state(), Some(RunState::Done));

    let entries = orchestrator.log().entries_by_component("clause_extractor");
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].description,
        "stage failed, default used: model unavailable"
    );
    assert!(orchestrator.log().verify_integrity().valid);
}

#[tokio::test]
async fn test_degraded_report_lists_failed_stages_in_json() {
    let orchestrator = orchestrator().with_clause_analyzer(Failing);
    let report = orchestrator
        .analyze(TRAFFIC_STOP, &AnalysisConfig::default())
        .await
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["degraded"], true);
    assert_eq!(json["failed_stages"], serde_json::json!(["clauses"]));
    assert_eq!(json["stage_failures"][0]["kind"], "error");
}

#[tokio::test]
async fn test_slow_sentiment_stage_times_out() {
    let orchestrator = orchestrator()
        .with_sentiment_analyzer(Delayed::by_millis(500, SentimentAnalyzer::default()));
    let report = orchestrator
        .analyze(TRAFFIC_STOP, &short_timeout())
        .await
        .unwrap();

    assert!(report.degraded);
    assert_eq!(report.failed_stages, vec![Stage::Sentiment]);
    assert_eq!(report.stage_failures[0].kind, FailureKind::Timeout);
    assert_eq!(report.sentiment, SentimentResult::neutral());
    // clauses ran alongside and still finished
    assert!(!report.clauses.is_empty());
}

#[tokio::test]
async fn test_panicking_remedy_stage_degrades() {
    let orchestrator = orchestrator().with_remedy_analyzer(Panicking);
    let report = orchestrator
        .analyze(TRAFFIC_STOP, &AnalysisConfig::default())
        .await
        .unwrap();

    assert!(report.degraded);
    assert_eq!(report.failed_stages, vec![Stage::Remedy]);
    assert!(report.stage_failures[0]
        .message
        .starts_with("analyzer panicked:"));
    assert!(report.remedies.is_empty());
}

#[tokio::test]
async fn test_failing_sovereignty_stage_uses_neutral_score() {
    let orchestrator = orchestrator().with_sovereignty_analyzer(Failing);
    let report = orchestrator
        .analyze(TRAFFIC_STOP, &AnalysisConfig::default())
        .await
        .unwrap();

    assert!(report.degraded);
    assert_eq!(report.sovereignty, SovereigntyScore::neutral());
    assert_eq!(report.sovereignty.overall, 0.5);

    let last = orchestrator.log().snapshot().pop().unwrap();
    assert_eq!(last.description, "run completed (degraded)");
    assert_eq!(last.scores.get("degraded"), Some(&1.0));
}

#[tokio::test]
async fn test_several_failures_are_all_listed() {
    let orchestrator = orchestrator()
        .with_clause_analyzer(Failing)
        .with_sentiment_analyzer(Failing)
        .with_remedy_analyzer(Failing);
    let report = orchestrator
        .analyze(TRAFFIC_STOP, &AnalysisConfig::default())
        .await
        .unwrap();

    assert_eq!(
        report.failed_stages,
        vec![Stage::Clauses, Stage::Sentiment, Stage::Remedy]
    );
}

#[tokio::test]
async fn test_interpret_failure_is_fatal() {
    let orchestrator = orchestrator().with_interpreter(Failing);
    let err = orchestrator
        .analyze(TRAFFIC_STOP, &AnalysisConfig::default())
        .await
        .unwrap_err();

    match err {
        AnalysisError::StageFailure { stage, message } => {
            assert_eq!(stage, Stage::Interpret);
            assert_eq!(message, "model unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }

    let entries = orchestrator.log().snapshot();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].component, "situation_interpreter");
    assert_eq!(
        entries[1].description,
        "stage failed, run aborted: model unavailable"
    );
    assert!(orchestrator.log().verify_integrity().valid);
}

#[tokio::test]
async fn test_interpret_timeout_is_fatal() {
    let orchestrator =
        orchestrator().with_interpreter(Delayed::by_millis(500, InterpretAnalyzer::default()));
    let err = orchestrator
        .analyze(TRAFFIC_STOP, &short_timeout())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AnalysisError::StageTimeout {
            stage: Stage::Interpret,
            timeout_ms: 50
        }
    ));
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let orchestrator = orchestrator();
    let token = CancellationToken::new();
    token.cancel();

    let document = Document::new(TRAFFIC_STOP).unwrap();
    let err = orchestrator
        .analyze_document(document, &AnalysisConfig::default(), &token)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AnalysisError::Cancelled {
            stage: Stage::Interpret
        }
    ));
    let entries = orchestrator.log().snapshot();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].description, "run cancelled before interpret");
}

#[tokio::test]
async fn test_cancelled_between_stages() {
    let token = CancellationToken::new();
    let orchestrator = orchestrator().with_interpreter(CancelAfterInterpret {
        token: token.clone(),
        inner: InterpretAnalyzer::default(),
    });

    let document = Document::new(TRAFFIC_STOP).unwrap();
    let err = orchestrator
        .analyze_document(document, &AnalysisConfig::default(), &token)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AnalysisError::Cancelled {
            stage: Stage::Clauses
        }
    ));
    let components: Vec<String> = orchestrator
        .log()
        .snapshot()
        .into_iter()
        .map(|entry| entry.component)
        .collect();
    assert_eq!(
        components,
        vec!["orchestrator", "situation_interpreter", "orchestrator"]
    );
    assert!(orchestrator.log().verify_integrity().valid);
}
