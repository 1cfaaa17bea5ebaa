//! Scorer: evaluator sub-scores combined by the fixed weighting rule.

use crate::pipeline::stage_runner::{StageFailure, StageRunner};
use crate::ports::llm_gateway::LlmGateway;
use cofounder_domain::{Evaluator, EvaluatorContext, IdeaRecord, ScoreWeights, Scores};

/// Scores one record. Never fails: an unusable evaluation yields the
/// fallback sub-scores.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scorer {
    weights: ScoreWeights,
}

impl Scorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    pub async fn score<G: LlmGateway + ?Sized>(
        &self,
        runner: &StageRunner<G>,
        record: &IdeaRecord,
    ) -> (Scores, Option<StageFailure>) {
        let ctx = EvaluatorContext::from_record(record);
        let outcome = runner.run(&Evaluator, &ctx, None, Some(&record.id)).await;
        (outcome.output.into_scores(&self.weights), outcome.degraded)
    }
}
