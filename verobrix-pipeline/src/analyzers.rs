//! Built-in analyzers, one per [`Stage`](crate::Stage).
//!
//! Inputs carry the per-run settings they need, so one orchestrator can serve
//! runs with different configurations.

use serde::{Deserialize, Serialize};
use verobrix::{Document, Entity};
use verobrix_clauses::{Clause, ClauseExtractor, Contradiction, ContradictionEngine};
use verobrix_remedy::{score_remedies, synthesize, Remedy};
use verobrix_scoring::{
    RiskAssessment, SentimentAssessor, SentimentResult, SovereigntyRubric, SovereigntyScore,
    SovereigntyScorer,
};
use verobrix_situation::{Situation, SituationInterpreter, SituationType};

use crate::errors::StageError;
use crate::stage::Analyzer;

/// Wraps [`SituationInterpreter`].
#[derive(Debug, Default)]
pub struct InterpretAnalyzer {
    interpreter: SituationInterpreter,
}

impl Analyzer<Document, Situation> for InterpretAnalyzer {
    fn analyze(&self, document: &Document) -> Result<Situation, StageError> {
        let reference = document.metadata().timestamp.map(|at| at.date_naive());
        Ok(self.interpreter.interpret_at(document.text(), reference))
    }
}

#[derive(Debug, Clone)]
pub struct ClauseInput {
    pub document: Document,
    pub entities: Vec<Entity>,
    pub confidence_threshold: f64,
}

/// Output of the clauses stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClauseAnalysis {
    pub clauses: Vec<Clause>,
    pub contradictions: Vec<Contradiction>,
}

/// Wraps [`ClauseExtractor`] and [`ContradictionEngine`].
#[derive(Debug, Default)]
pub struct ClauseAnalyzer {
    extractor: ClauseExtractor,
    engine: ContradictionEngine,
}

impl ClauseAnalyzer {
    pub fn with_engine(engine: ContradictionEngine) -> Self {
        Self {
            extractor: ClauseExtractor::new(),
            engine,
        }
    }
}

impl Analyzer<ClauseInput, ClauseAnalysis> for ClauseAnalyzer {
    fn analyze(&self, input: &ClauseInput) -> Result<ClauseAnalysis, StageError> {
        let clauses = self
            .extractor
            .extract(input.document.text(), &input.entities);
        let contradictions = self
            .engine
            .detect_with_threshold(&clauses, input.confidence_threshold);
        Ok(ClauseAnalysis {
            clauses,
            contradictions,
        })
    }
}

/// Wraps [`SentimentAssessor`].
#[derive(Debug, Default)]
pub struct SentimentAnalyzer {
    assessor: SentimentAssessor,
}

impl Analyzer<Document, SentimentResult> for SentimentAnalyzer {
    fn analyze(&self, document: &Document) -> Result<SentimentResult, StageError> {
        Ok(self.assessor.assess(document.text()))
    }
}

#[derive(Debug, Clone)]
pub struct SovereigntyInput {
    pub document: Document,
    pub rubric: SovereigntyRubric,
}

/// Scores with the rubric supplied by the run's configuration.
#[derive(Debug, Default)]
pub struct SovereigntyAnalyzer;

impl Analyzer<SovereigntyInput, SovereigntyScore> for SovereigntyAnalyzer {
    fn analyze(&self, input: &SovereigntyInput) -> Result<SovereigntyScore, StageError> {
        input
            .rubric
            .validate()
            .map_err(|e| StageError::failed(e.to_string()))?;
        Ok(SovereigntyScorer::new(input.rubric.clone()).score(input.document.text()))
    }
}

#[derive(Debug, Clone)]
pub struct RemedyInput {
    pub situation_type: SituationType,
    pub contradictions: Vec<Contradiction>,
    pub risk: RiskAssessment,
    pub sovereignty: SovereigntyScore,
    /// Rubric each synthesized remedy is scored with
    pub rubric: SovereigntyRubric,
}

/// Wraps [`synthesize`], then scores every remedy's text.
#[derive(Debug, Default)]
pub struct RemedyAnalyzer;

impl Analyzer<RemedyInput, Vec<Remedy>> for RemedyAnalyzer {
    fn analyze(&self, input: &RemedyInput) -> Result<Vec<Remedy>, StageError> {
        let mut remedies = synthesize(
            input.situation_type,
            &input.contradictions,
            &input.risk,
            &input.sovereignty,
        );
        score_remedies(&mut remedies, &SovereigntyScorer::new(input.rubric.clone()));
        Ok(remedies)
    }
}
