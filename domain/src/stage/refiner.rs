//! PM Refiner stage: turns a critiqued idea into a product plan.

use crate::idea::entities::IdeaRecord;
use crate::idea::value_objects::{Constraints, CriticOutput, RefinerOutput};
use crate::prompt::PromptTemplate;
use crate::stage::{AgentRole, SchemaError, Stage, decode, require_items};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct RefinerContext {
    pub title: String,
    pub description: String,
    pub critic_output: Option<CriticOutput>,
    pub constraints: Constraints,
}

impl RefinerContext {
    pub fn from_record(record: &IdeaRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            critic_output: record.critic_output.clone(),
            constraints: record.constraints.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Refiner;

impl Stage for Refiner {
    type Context = RefinerContext;
    type Output = RefinerOutput;

    fn role(&self) -> AgentRole {
        AgentRole::Refiner
    }

    fn system_prompt(&self) -> &'static str {
        PromptTemplate::refiner_system()
    }

    fn prompt(&self, ctx: &RefinerContext, feedback: Option<&str>) -> String {
        let critique = ctx
            .critic_output
            .as_ref()
            .map(CriticOutput::describe)
            .unwrap_or_else(|| "No critique available.".to_string());
        PromptTemplate::with_feedback(
            PromptTemplate::refinement_prompt(
                &ctx.title,
                &ctx.description,
                &critique,
                &ctx.constraints.describe(),
            ),
            feedback,
        )
    }

    fn parse(&self, value: Value, _ctx: &RefinerContext) -> Result<RefinerOutput, SchemaError> {
        let output: RefinerOutput = decode(value)?;
        require_items("features", &output.features)?;
        Ok(output)
    }

    fn fallback(&self, ctx: &RefinerContext) -> RefinerOutput {
        RefinerOutput {
            features: vec![format!("Core offering of {}", ctx.title)],
            priorities: vec!["Validate the core value proposition".to_string()],
            timeline: "To be determined".to_string(),
            resources: vec!["Founding team".to_string()],
            user_stories: Vec::new(),
            success_metrics: vec!["Early customer adoption".to_string()],
        }
    }
}

impl RefinerOutput {
    /// Compact text form used as context by later stages
    pub fn describe(&self) -> String {
        format!(
            "Features:\n{}\nPriorities:\n{}\nTimeline: {}\nSuccess metrics:\n{}",
            PromptTemplate::bullet_list(&self.features),
            PromptTemplate::bullet_list(&self.priorities),
            if self.timeline.is_empty() { "unspecified" } else { &self.timeline },
            PromptTemplate::bullet_list(&self.success_metrics),
        )
    }
}
