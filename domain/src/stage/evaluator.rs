//! Evaluator stage: raw sub-scores for the scorer.

use crate::idea::entities::IdeaRecord;
use crate::idea::value_objects::{CriticOutput, MarketAnalysis, RefinerOutput, SynthesizerOutput};
use crate::prompt::PromptTemplate;
use crate::scoring::{FALLBACK_SUB_SCORE, ScoreWeights, Scores};
use crate::stage::{AgentRole, SchemaError, Stage, decode};
use serde::de::{Deserializer, Error};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatorContext {
    pub title: String,
    pub description: String,
    pub market_analysis: MarketAnalysis,
    pub critic_output: Option<CriticOutput>,
    pub refiner_output: Option<RefinerOutput>,
    pub synthesizer_output: Option<SynthesizerOutput>,
}

impl EvaluatorContext {
    pub fn from_record(record: &IdeaRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            market_analysis: record.market_analysis.clone(),
            critic_output: record.critic_output.clone(),
            refiner_output: record.pm_refiner_output.clone(),
            synthesizer_output: record.synthesizer_output.clone(),
        }
    }

    fn dossier(&self) -> String {
        let mut sections = vec![format!("Market analysis:\n{}", self.market_analysis.describe())];
        if let Some(critique) = &self.critic_output {
            sections.push(format!("Critique:\n{}", critique.describe()));
        }
        if let Some(refinement) = &self.refiner_output {
            sections.push(format!("Product refinement:\n{}", refinement.describe()));
        }
        if let Some(synthesis) = &self.synthesizer_output {
            sections.push(format!("Synthesis:\n{}", synthesis.describe()));
        }
        sections.join("\n\n")
    }
}

/// Raw sub-scores as returned by the model, before normalisation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorOutput {
    #[serde(deserialize_with = "score_value")]
    pub feasibility: f64,
    #[serde(deserialize_with = "score_value")]
    pub novelty: f64,
    #[serde(alias = "market", deserialize_with = "score_value")]
    pub market_signal: f64,
}

impl EvaluatorOutput {
    /// Normalise and combine into a full score set
    pub fn into_scores(self, weights: &ScoreWeights) -> Scores {
        Scores::from_sub_scores(self.feasibility, self.novelty, self.market_signal, weights)
    }
}

/// Accept a number or a numeric string such as `"7.5"`.
fn score_value<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom("score is not representable as f64")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("score is not a number: {}", s))),
        other => Err(D::Error::custom(format!("expected a score, found {}", other))),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator;

impl Stage for Evaluator {
    type Context = EvaluatorContext;
    type Output = EvaluatorOutput;

    fn role(&self) -> AgentRole {
        AgentRole::Evaluator
    }

    fn system_prompt(&self) -> &'static str {
        PromptTemplate::evaluator_system()
    }

    fn prompt(&self, ctx: &EvaluatorContext, feedback: Option<&str>) -> String {
        PromptTemplate::with_feedback(
            PromptTemplate::evaluation_prompt(&ctx.title, &ctx.description, &ctx.dossier()),
            feedback,
        )
    }

    fn parse(&self, value: Value, _ctx: &EvaluatorContext) -> Result<EvaluatorOutput, SchemaError> {
        let output: EvaluatorOutput = decode(value)?;
        for (field, score) in [
            ("feasibility", output.feasibility),
            ("novelty", output.novelty),
            ("market_signal", output.market_signal),
        ] {
            if !score.is_finite() {
                return Err(SchemaError::Invalid {
                    field,
                    reason: "must be a finite number".into(),
                });
            }
        }
        Ok(output)
    }

    fn fallback(&self, _ctx: &EvaluatorContext) -> EvaluatorOutput {
        EvaluatorOutput {
            feasibility: FALLBACK_SUB_SCORE,
            novelty: FALLBACK_SUB_SCORE,
            market_signal: FALLBACK_SUB_SCORE,
        }
    }
}
