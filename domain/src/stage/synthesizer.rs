//! Synthesizer stage: the final, presentation-ready concept.

use crate::idea::entities::IdeaRecord;
use crate::idea::value_objects::{MarketAnalysis, RefinerOutput, RevenueProjections, SynthesizerOutput};
use crate::prompt::PromptTemplate;
use crate::stage::{AgentRole, SchemaError, Stage, decode, require_text};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizerContext {
    pub title: String,
    pub description: String,
    pub market_analysis: MarketAnalysis,
    pub refiner_output: Option<RefinerOutput>,
}

impl SynthesizerContext {
    pub fn from_record(record: &IdeaRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            market_analysis: record.market_analysis.clone(),
            refiner_output: record.pm_refiner_output.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Synthesizer;

impl Stage for Synthesizer {
    type Context = SynthesizerContext;
    type Output = SynthesizerOutput;

    fn role(&self) -> AgentRole {
        AgentRole::Synthesizer
    }

    fn system_prompt(&self) -> &'static str {
        PromptTemplate::synthesizer_system()
    }

    fn prompt(&self, ctx: &SynthesizerContext, feedback: Option<&str>) -> String {
        let refinement = ctx
            .refiner_output
            .as_ref()
            .map(RefinerOutput::describe)
            .unwrap_or_else(|| "No refinement available.".to_string());
        PromptTemplate::with_feedback(
            PromptTemplate::synthesis_prompt(
                &ctx.title,
                &ctx.description,
                &ctx.market_analysis.describe(),
                &refinement,
            ),
            feedback,
        )
    }

    fn parse(&self, value: Value, _ctx: &SynthesizerContext) -> Result<SynthesizerOutput, SchemaError> {
        let output: SynthesizerOutput = decode(value)?;
        require_text("final_concept", &output.final_concept)?;
        let projections = &output.revenue_projections;
        require_text("revenue_projections.year1", &projections.year1)?;
        require_text("revenue_projections.year2", &projections.year2)?;
        require_text("revenue_projections.year3", &projections.year3)?;
        Ok(output)
    }

    fn fallback(&self, ctx: &SynthesizerContext) -> SynthesizerOutput {
        let key_features = ctx
            .refiner_output
            .as_ref()
            .map(|r| r.features.clone())
            .unwrap_or_default();
        SynthesizerOutput {
            final_concept: format!("{}: {}", ctx.title, ctx.description),
            key_features,
            business_model: "To be determined".to_string(),
            go_to_market: "To be determined".to_string(),
            value_proposition: ctx.description.clone(),
            target_customers: ctx.market_analysis.target_segments.clone(),
            revenue_projections: RevenueProjections {
                year1: "Not estimated".to_string(),
                year2: "Not estimated".to_string(),
                year3: "Not estimated".to_string(),
            },
        }
    }
}

impl SynthesizerOutput {
    /// Compact text form used as context by the evaluator
    pub fn describe(&self) -> String {
        format!(
            "Final concept: {}\nBusiness model: {}\nGo to market: {}\nRevenue: year 1 {}, year 2 {}, year 3 {}",
            self.final_concept,
            self.business_model,
            self.go_to_market,
            self.revenue_projections.year1,
            self.revenue_projections.year2,
            self.revenue_projections.year3,
        )
    }
}
