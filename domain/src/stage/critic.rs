//! Critic stage: strengths, weaknesses and risks of one idea.

use crate::idea::entities::IdeaRecord;
use crate::idea::value_objects::{CriticOutput, MarketAnalysis};
use crate::prompt::PromptTemplate;
use crate::stage::{AgentRole, SchemaError, Stage, decode, require_items};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct CriticContext {
    pub title: String,
    pub description: String,
    pub market_analysis: MarketAnalysis,
}

impl CriticContext {
    pub fn from_record(record: &IdeaRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            market_analysis: record.market_analysis.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Critic;

impl Stage for Critic {
    type Context = CriticContext;
    type Output = CriticOutput;

    fn role(&self) -> AgentRole {
        AgentRole::Critic
    }

    fn system_prompt(&self) -> &'static str {
        PromptTemplate::critic_system()
    }

    fn prompt(&self, ctx: &CriticContext, feedback: Option<&str>) -> String {
        PromptTemplate::with_feedback(
            PromptTemplate::critique_prompt(
                &ctx.title,
                &ctx.description,
                &ctx.market_analysis.describe(),
            ),
            feedback,
        )
    }

    fn parse(&self, value: Value, _ctx: &CriticContext) -> Result<CriticOutput, SchemaError> {
        let output: CriticOutput = decode(value)?;
        require_items("strengths", &output.strengths)?;
        require_items("weaknesses", &output.weaknesses)?;
        Ok(output)
    }

    fn fallback(&self, ctx: &CriticContext) -> CriticOutput {
        CriticOutput {
            strengths: vec![format!("{} targets an identified market need", ctx.title)],
            weaknesses: vec!["Critique unavailable; assumptions are unvalidated".to_string()],
            suggestions: vec!["Validate demand with target customers".to_string()],
            risks: vec!["Unassessed market and execution risk".to_string()],
            opportunities: Vec::new(),
        }
    }
}

impl CriticOutput {
    /// Compact text form used as context by later stages
    pub fn describe(&self) -> String {
        format!(
            "Strengths:\n{}\nWeaknesses:\n{}\nSuggestions:\n{}\nRisks:\n{}",
            PromptTemplate::bullet_list(&self.strengths),
            PromptTemplate::bullet_list(&self.weaknesses),
            PromptTemplate::bullet_list(&self.suggestions),
            PromptTemplate::bullet_list(&self.risks),
        )
    }
}
