//! Idea Generator stage: one call producing every draft of a generation.

use crate::core::topic::Topic;
use crate::idea::value_objects::{Constraints, IdeaDraft, MarketAnalysis};
use crate::prompt::PromptTemplate;
use crate::stage::{AgentRole, SchemaError, Stage, decode};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorContext {
    pub topic: Topic,
    pub constraints: Constraints,
    pub market_analysis: MarketAnalysis,
    /// Exact number of drafts the stage yields
    pub count: usize,
}

#[derive(Deserialize)]
struct GeneratorReply {
    ideas: Vec<Value>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IdeaGenerator;

impl IdeaGenerator {
    /// Fallback draft for position `index` (zero-based)
    pub fn fallback_draft(topic: &Topic, index: usize) -> IdeaDraft {
        let title = clamp_title(&format!("{} concept {}", topic.as_str(), index + 1));
        IdeaDraft::new(
            title,
            format!(
                "A startup concept addressing {}. Details pending further analysis.",
                topic.as_str()
            ),
        )
    }
}

impl Stage for IdeaGenerator {
    type Context = GeneratorContext;
    type Output = Vec<IdeaDraft>;

    fn role(&self) -> AgentRole {
        AgentRole::IdeaGenerator
    }

    fn system_prompt(&self) -> &'static str {
        PromptTemplate::idea_generator_system()
    }

    fn prompt(&self, ctx: &GeneratorContext, feedback: Option<&str>) -> String {
        PromptTemplate::with_feedback(
            PromptTemplate::idea_generation_prompt(
                ctx.topic.as_str(),
                &ctx.constraints.describe(),
                &ctx.market_analysis.describe(),
                ctx.count,
            ),
            feedback,
        )
    }

    /// Keeps the well-formed drafts, then truncates or pads to `count`.
    ///
    /// A reply without a single usable draft is rejected.
    fn parse(&self, value: Value, ctx: &GeneratorContext) -> Result<Vec<IdeaDraft>, SchemaError> {
        let reply: GeneratorReply = decode(value)?;
        let mut drafts: Vec<IdeaDraft> = reply
            .ideas
            .into_iter()
            .filter_map(|item| serde_json::from_value::<IdeaDraft>(item).ok())
            .filter_map(normalize_draft)
            .collect();

        if drafts.is_empty() {
            return Err(SchemaError::Invalid {
                field: "ideas",
                reason: "contains no usable idea".into(),
            });
        }

        drafts.truncate(ctx.count);
        while drafts.len() < ctx.count {
            drafts.push(Self::fallback_draft(&ctx.topic, drafts.len()));
        }
        Ok(drafts)
    }

    fn fallback(&self, ctx: &GeneratorContext) -> Vec<IdeaDraft> {
        (0..ctx.count)
            .map(|i| Self::fallback_draft(&ctx.topic, i))
            .collect()
    }
}

fn normalize_draft(draft: IdeaDraft) -> Option<IdeaDraft> {
    let title = draft.title.trim();
    let description = draft.description.trim();
    if title.is_empty() || description.is_empty() {
        return None;
    }
    Some(IdeaDraft::new(clamp_title(title), description))
}

fn clamp_title(title: &str) -> String {
    title.chars().take(IdeaDraft::MAX_TITLE_CHARS).collect()
}
