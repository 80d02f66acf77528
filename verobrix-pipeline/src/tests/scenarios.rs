use std::sync::Arc;

use verobrix::DocumentError;
use verobrix_clauses::{ClauseCategory, ContradictionKind};
use verobrix_provenance::{verify_chain, ProvenanceLog};
use verobrix_scoring::{RiskLevel, SentimentCategory, SovereigntyScore};
use verobrix_situation::{SituationType, UrgencyLevel};

use crate::{AnalysisConfig, AnalysisError, AnalysisReport, Orchestrator, RunState, Stage};

const TRAFFIC_STOP: &str = "Officer Smith demanded my license. I am required by law to comply.";
const FEE_PAIR: &str = "All users must pay the fee. No user is required to pay the fee.";

/// run started, interpret, clauses, sentiment, risk, sovereignty, remedy, run completed
const ENTRIES_PER_RUN: usize = 8;

fn orchestrator() -> Orchestrator {
    Orchestrator::new(Arc::new(ProvenanceLog::in_memory()))
}

async fn analyze(orchestrator: &Orchestrator, text: &str) -> AnalysisReport {
    orchestrator
        .analyze(text, &AnalysisConfig::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_traffic_stop_end_to_end() {
    let orchestrator = orchestrator();
    let report = analyze(&orchestrator, TRAFFIC_STOP).await;

    assert_eq!(report.situation.situation_type, SituationType::TrafficStop);
    assert!(report
        .clauses
        .iter()
        .any(|c| c.category == ClauseCategory::Obligation));
    assert_eq!(report.sentiment.category, SentimentCategory::Concerning);
    assert!(report.risk.level >= RiskLevel::Medium);
    assert!(!report.remedies.is_empty());

    assert!(!report.degraded);
    assert!(report.stage_failures.is_empty());
    assert!(report.skipped_stages.is_empty());
    assert_eq!(
        report.state_history,
        vec![
            RunState::Pending,
            RunState::Interpreting,
            RunState::Analyzing,
            RunState::Scoring,
            RunState::Synthesizing,
            RunState::Done,
        ]
    );
    assert_eq!(report.provenance_range, [1, ENTRIES_PER_RUN as u64]);
    assert_eq!(report.document.length, TRAFFIC_STOP.len());
}

#[tokio::test]
async fn test_every_component_is_recorded_once() {
    let orchestrator = orchestrator();
    let report = analyze(&orchestrator, TRAFFIC_STOP).await;

    let components: Vec<String> = orchestrator
        .log()
        .export(report.provenance_range())
        .into_iter()
        .map(|entry| entry.component)
        .collect();
    // clauses and sentiment run concurrently but are recorded in stage order
    assert_eq!(
        components,
        vec![
            "orchestrator",
            "situation_interpreter",
            "clause_extractor",
            "sentiment_assessor",
            "risk_assessor",
            "sovereignty_scorer",
            "remedy_synthesizer",
            "orchestrator",
        ]
    );
}

#[tokio::test]
async fn test_empty_input_is_rejected_before_recording() {
    let orchestrator = orchestrator();

    for text in ["", "   \n\t"] {
        let err = orchestrator
            .analyze(text, &AnalysisConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Input(DocumentError::Empty)));
    }
    assert!(orchestrator.log().is_empty());
}

#[tokio::test]
async fn test_oversized_input_is_rejected_before_recording() {
    let orchestrator = orchestrator();
    let config = AnalysisConfig {
        max_input_bytes: 16,
        ..AnalysisConfig::default()
    };

    let err = orchestrator.analyze(TRAFFIC_STOP, &config).await.unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Input(DocumentError::TooLarge { limit: 16, .. })
    ));
    assert!(orchestrator.log().is_empty());
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_recording() {
    let orchestrator = orchestrator();
    let config = AnalysisConfig {
        confidence_threshold: f64::NAN,
        ..AnalysisConfig::default()
    };

    let err = orchestrator.analyze(TRAFFIC_STOP, &config).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Configuration(_)));
    assert!(orchestrator.log().is_empty());
}

#[tokio::test]
async fn test_fee_contradiction_is_reported() {
    let orchestrator = orchestrator();
    let report = analyze(&orchestrator, FEE_PAIR).await;

    assert_eq!(report.clauses.len(), 2);
    assert_eq!(report.contradictions.len(), 1);
    let contradiction = &report.contradictions[0];
    assert_eq!((contradiction.clause_a, contradiction.clause_b), (0, 1));
    assert_eq!(contradiction.kind, ContradictionKind::Logical);
    assert!(contradiction.confidence >= 0.6);

    assert!(report
        .remedies
        .iter()
        .any(|r| r.title == "Challenge contradictory provisions"));
}

#[tokio::test]
async fn test_confidence_threshold_reaches_the_contradiction_engine() {
    let orchestrator = orchestrator();
    let config = AnalysisConfig {
        confidence_threshold: 0.95,
        ..AnalysisConfig::default()
    };

    let report = orchestrator.analyze(FEE_PAIR, &config).await.unwrap();
    assert_eq!(report.clauses.len(), 2);
    assert!(report.contradictions.is_empty());
}

#[tokio::test]
async fn test_repeated_runs_agree() {
    let orchestrator = orchestrator();
    let first = analyze(&orchestrator, FEE_PAIR).await;
    let second = analyze(&orchestrator, FEE_PAIR).await;

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.situation, second.situation);
    assert_eq!(first.clauses, second.clauses);
    assert_eq!(first.contradictions, second.contradictions);
    assert_eq!(first.sentiment, second.sentiment);
    assert_eq!(first.risk, second.risk);
    assert_eq!(first.sovereignty, second.sovereignty);
    assert_eq!(first.remedies, second.remedies);
    assert_eq!(first.document, second.document);

    let log = orchestrator.log();
    let a = log.export(first.provenance_range());
    let b = log.export(second.provenance_range());
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.component, y.component);
        assert_eq!(x.input_hash, y.input_hash);
        assert_eq!(x.output_hash, y.output_hash);
    }
}

#[tokio::test]
async fn test_exported_run_replays() {
    let orchestrator = orchestrator();
    analyze(&orchestrator, TRAFFIC_STOP).await;
    let report = analyze(&orchestrator, FEE_PAIR).await;

    assert_eq!(
        report.provenance_range,
        [ENTRIES_PER_RUN as u64 + 1, 2 * ENTRIES_PER_RUN as u64]
    );
    let mut exported = orchestrator.log().export(report.provenance_range());
    assert_eq!(exported.len(), ENTRIES_PER_RUN);
    let session = report.run_id.to_string();
    assert!(exported
        .iter()
        .all(|entry| entry.session_id.as_deref() == Some(session.as_str())));
    assert!(verify_chain(&exported).valid);

    let summary = orchestrator.log().session_summary(&session);
    assert_eq!(summary.entries, ENTRIES_PER_RUN);
    assert_eq!(summary.first_sequence, Some(report.provenance_range[0]));

    // tampering with the exported copy is detected; the log is untouched
    exported[3].description = "edited".to_string();
    let replay = verify_chain(&exported);
    assert!(!replay.valid);
    assert_eq!(replay.first_break, Some(exported[3].sequence));
    assert!(orchestrator.log().verify_integrity().valid);
}

#[tokio::test]
async fn test_fresh_log_is_fully_valid() {
    let orchestrator = orchestrator();
    analyze(&orchestrator, TRAFFIC_STOP).await;

    let integrity = orchestrator.log().verify_integrity();
    assert!(integrity.valid);
    assert_eq!(integrity.percentage, 100.0);
    assert_eq!(integrity.checked, ENTRIES_PER_RUN);
}

#[tokio::test]
async fn test_concurrent_runs_share_one_chain() {
    let orchestrator = orchestrator();
    let config = AnalysisConfig::default();

    let (a, b) = tokio::join!(
        orchestrator.analyze(TRAFFIC_STOP, &config),
        orchestrator.analyze(FEE_PAIR, &config),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(orchestrator.log().len(), 2 * ENTRIES_PER_RUN);
    assert!(orchestrator.log().verify_integrity().valid);
    for report in [&a, &b] {
        let summary = orchestrator.log().session_summary(&report.run_id.to_string());
        assert_eq!(summary.entries, ENTRIES_PER_RUN);
    }
}

#[tokio::test]
async fn test_persisted_log_reopens_intact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("provenance.jsonl");

    {
        let orchestrator = Orchestrator::new(Arc::new(ProvenanceLog::open(&path).unwrap()));
        analyze(&orchestrator, TRAFFIC_STOP).await;
    }

    let reopened = ProvenanceLog::open(&path).unwrap();
    assert_eq!(reopened.len(), ENTRIES_PER_RUN);
    assert!(reopened.verify_integrity().valid);

    let orchestrator = Orchestrator::new(Arc::new(reopened));
    let report = analyze(&orchestrator, FEE_PAIR).await;
    assert_eq!(report.provenance_range[0], ENTRIES_PER_RUN as u64 + 1);
    assert!(orchestrator.log().verify_integrity().valid);
}

#[tokio::test]
async fn test_disabled_stages_are_skipped_not_degraded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("verobrix.toml");
    std::fs::write(
        &path,
        r#"
timeout_ms = 2000
enabled_stages = ["interpret", "sentiment"]
"#,
    )
    .unwrap();
    let config = AnalysisConfig::load(&path).unwrap();

    let orchestrator = orchestrator();
    let report = orchestrator.analyze(FEE_PAIR, &config).await.unwrap();

    assert!(!report.degraded);
    assert_eq!(
        report.skipped_stages,
        vec![Stage::Clauses, Stage::Sovereignty, Stage::Remedy]
    );
    assert!(report.clauses.is_empty());
    assert!(report.contradictions.is_empty());
    assert_eq!(report.sovereignty, SovereigntyScore::neutral());
    assert!(report.remedies.is_empty());
    // skipped stages still leave an entry
    assert_eq!(orchestrator.log().len(), ENTRIES_PER_RUN);
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    let orchestrator = orchestrator();
    let report = analyze(&orchestrator, TRAFFIC_STOP).await;

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["provenance_range"], serde_json::json!([1, 8]));
    assert_eq!(json["situation"]["situation_type"], "traffic-stop");
    assert_eq!(json["degraded"], false);
    assert_eq!(json["failed_stages"], serde_json::json!([]));
    assert_eq!(json["state_history"][5], serde_json::json!({ "state": "done" }));
    assert_eq!(json["run_id"], report.run_id.to_string());

    let back: AnalysisReport = serde_json::from_value(json).unwrap();
    assert_eq!(back.run_id, report.run_id);
    assert_eq!(back.state_history, report.state_history);
    assert_eq!(back.clauses.len(), report.clauses.len());
}

#[tokio::test]
async fn test_reference_date_measures_dated_deadlines() {
    let text = "Payment must be received by 10/18/2026.";
    let orchestrator = orchestrator();

    let undated = analyze(&orchestrator, text).await;
    assert_eq!(undated.situation.urgency.level, UrgencyLevel::Low);
    assert!(undated.situation.urgency.deadlines.is_empty());

    let config = AnalysisConfig::from_toml_str(r#"reference_date = "2026-10-16""#).unwrap();
    let report = orchestrator.analyze(text, &config).await.unwrap();
    assert_eq!(report.situation.urgency.level, UrgencyLevel::High);
    assert_eq!(report.situation.urgency.deadlines[0].days, 2);
    assert_eq!(
        report.document.metadata.timestamp.map(|at| at.date_naive().to_string()),
        Some("2026-10-16".to_string())
    );
}

#[tokio::test]
async fn test_remedies_are_scored_and_recorded() {
    let orchestrator = orchestrator();
    let report = analyze(&orchestrator, TRAFFIC_STOP).await;

    assert!(!report.remedies.is_empty());
    assert!(report.remedies.iter().all(|r| r.sovereignty.is_some()));

    let entries = orchestrator.log().entries_by_component("remedy_synthesizer");
    assert_eq!(entries.len(), 1);
    let recorded = entries[0].scores.get("remedy_sovereignty").copied().unwrap();
    let mean = report
        .remedies
        .iter()
        .filter_map(|r| r.sovereignty.as_ref())
        .map(|score| score.overall)
        .sum::<f64>()
        / report.remedies.len() as f64;
    assert!((recorded - mean).abs() < 1e-9);
}
