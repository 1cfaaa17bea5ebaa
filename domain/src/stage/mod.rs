//! Pipeline stages.
//!
//! Each stage is a pure value describing one agent: how to prompt the model,
//! how to turn its JSON reply into a typed output, and what to produce when
//! the model cannot be used. Stages never call each other or storage; the
//! application layer sequences them and performs the I/O.

pub mod critic;
pub mod evaluator;
pub mod idea_generator;
pub mod market_analyst;
pub mod model_selection;
pub mod refiner;
pub mod synthesizer;

pub use critic::{Critic, CriticContext};
pub use evaluator::{Evaluator, EvaluatorContext, EvaluatorOutput};
pub use idea_generator::{GeneratorContext, IdeaGenerator};
pub use market_analyst::{MarketAnalyst, MarketContext};
pub use model_selection::ModelSelection;
pub use refiner::{Refiner, RefinerContext};
pub use synthesizer::{Synthesizer, SynthesizerContext};

use crate::core::error::DomainError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Reasons a parsed model reply is rejected by a stage
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("response does not match the expected shape: {0}")]
    Shape(String),

    #[error("field `{field}` {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Identity of a pipeline agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    MarketAnalyst,
    IdeaGenerator,
    Critic,
    #[serde(rename = "pm_refiner", alias = "refiner")]
    Refiner,
    Synthesizer,
    Evaluator,
}

impl AgentRole {
    pub const ALL: [AgentRole; 6] = [
        AgentRole::MarketAnalyst,
        AgentRole::IdeaGenerator,
        AgentRole::Critic,
        AgentRole::Refiner,
        AgentRole::Synthesizer,
        AgentRole::Evaluator,
    ];

    /// Stages run for every idea after generation, in order
    pub const CHAIN: [AgentRole; 3] = [AgentRole::Critic, AgentRole::Refiner, AgentRole::Synthesizer];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::MarketAnalyst => "market_analyst",
            AgentRole::IdeaGenerator => "idea_generator",
            AgentRole::Critic => "critic",
            AgentRole::Refiner => "pm_refiner",
            AgentRole::Synthesizer => "synthesizer",
            AgentRole::Evaluator => "evaluator",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "market_analyst" => Ok(AgentRole::MarketAnalyst),
            "idea_generator" => Ok(AgentRole::IdeaGenerator),
            "critic" => Ok(AgentRole::Critic),
            "pm_refiner" | "refiner" => Ok(AgentRole::Refiner),
            "synthesizer" => Ok(AgentRole::Synthesizer),
            "evaluator" => Ok(AgentRole::Evaluator),
            _ => Err(DomainError::UnknownAgent(s.to_string())),
        }
    }
}

/// One agent of the pipeline.
///
/// `parse` receives the JSON object already extracted from the model text.
/// `fallback` must be deterministic and satisfy the same schema as a
/// successful `parse`.
pub trait Stage {
    type Context;
    type Output;

    fn role(&self) -> AgentRole;

    fn system_prompt(&self) -> &'static str;

    fn prompt(&self, ctx: &Self::Context, feedback: Option<&str>) -> String;

    fn parse(&self, value: Value, ctx: &Self::Context) -> Result<Self::Output, SchemaError>;

    fn fallback(&self, ctx: &Self::Context) -> Self::Output;
}

// ==================== Validation Helpers ====================

pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, SchemaError> {
    serde_json::from_value(value).map_err(|e| SchemaError::Shape(e.to_string()))
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), SchemaError> {
    if value.trim().is_empty() {
        return Err(SchemaError::Invalid {
            field,
            reason: "must not be empty".into(),
        });
    }
    Ok(())
}

pub(crate) fn require_items(field: &'static str, items: &[String]) -> Result<(), SchemaError> {
    if items.is_empty() {
        return Err(SchemaError::Invalid {
            field,
            reason: "must contain at least one item".into(),
        });
    }
    Ok(())
}
