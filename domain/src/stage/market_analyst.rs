//! Market Analyst stage: one shared analysis of the topic per generation.

use crate::core::topic::Topic;
use crate::idea::value_objects::{Constraints, MarketAnalysis};
use crate::prompt::PromptTemplate;
use crate::stage::{AgentRole, SchemaError, Stage, decode, require_items, require_text};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct MarketContext {
    pub topic: Topic,
    pub constraints: Constraints,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarketAnalyst;

impl Stage for MarketAnalyst {
    type Context = MarketContext;
    type Output = MarketAnalysis;

    fn role(&self) -> AgentRole {
        AgentRole::MarketAnalyst
    }

    fn system_prompt(&self) -> &'static str {
        PromptTemplate::market_analyst_system()
    }

    fn prompt(&self, ctx: &MarketContext, feedback: Option<&str>) -> String {
        PromptTemplate::with_feedback(
            PromptTemplate::market_analysis_prompt(ctx.topic.as_str(), &ctx.constraints.describe()),
            feedback,
        )
    }

    fn parse(&self, value: Value, _ctx: &MarketContext) -> Result<MarketAnalysis, SchemaError> {
        let analysis: MarketAnalysis = decode(value)?;
        require_text("market_opportunity", &analysis.market_opportunity)?;
        require_items("key_trends", &analysis.key_trends)?;
        Ok(analysis)
    }

    fn fallback(&self, ctx: &MarketContext) -> MarketAnalysis {
        MarketAnalysis::fallback_for(ctx.topic.as_str())
    }
}

impl MarketAnalysis {
    /// Neutral analysis used when the model cannot be consulted
    pub fn fallback_for(topic: &str) -> Self {
        Self {
            market_opportunity: format!(
                "Market analysis for {} is unavailable; treat demand as unverified.",
                topic
            ),
            competition_level: "unknown".to_string(),
            growth_potential: "unknown".to_string(),
            key_trends: vec![format!("Growing interest in {}", topic)],
            target_segments: vec!["Early adopters".to_string()],
            competitors: Vec::new(),
            competitive_landscape: "Not assessed.".to_string(),
        }
    }

    /// Compact text form used as context by later stages
    pub fn describe(&self) -> String {
        format!(
            "Opportunity: {}\nCompetition: {}\nGrowth potential: {}\nKey trends:\n{}\nTarget segments:\n{}",
            self.market_opportunity,
            display_or_unknown(&self.competition_level),
            display_or_unknown(&self.growth_potential),
            PromptTemplate::bullet_list(&self.key_trends),
            PromptTemplate::bullet_list(&self.target_segments),
        )
    }
}

fn display_or_unknown(value: &str) -> &str {
    if value.trim().is_empty() { "unknown" } else { value }
}
