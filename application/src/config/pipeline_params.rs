//! Pipeline parameters - static knobs of the generation pipeline.
//!
//! [`PipelineParams`] groups the values that every use case shares: which
//! model each agent uses, the sampling parameters, the per-call timeout and
//! how many idea chains may run at once. These are application-layer
//! concerns, not domain policy.

use crate::ports::llm_gateway::GenerationParams;
use cofounder_domain::{ModelSelection, ScoreWeights};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineParams {
    /// Configured model per agent; requests may layer overrides on top.
    pub models: ModelSelection,
    pub generation: GenerationParams,
    /// Upper bound for one model call, including session setup.
    pub call_timeout: Duration,
    /// Maximum idea chains running at the same time within one generation.
    pub max_concurrent_chains: usize,
    /// Number of ideas when a request does not say.
    pub default_num_ideas: usize,
    pub weights: ScoreWeights,
}

impl PipelineParams {
    /// Inclusive bounds on ideas per generation
    pub const MIN_IDEAS: usize = 1;
    pub const MAX_IDEAS: usize = 10;

    // ==================== Builder Methods ====================

    pub fn with_models(mut self, models: ModelSelection) -> Self {
        self.models = models;
        self
    }

    pub fn with_generation(mut self, generation: GenerationParams) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_max_concurrent_chains(mut self, max: usize) -> Self {
        self.max_concurrent_chains = max.max(1);
        self
    }

    pub fn with_default_num_ideas(mut self, n: usize) -> Self {
        self.default_num_ideas = n.clamp(Self::MIN_IDEAS, Self::MAX_IDEAS);
        self
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            models: ModelSelection::default(),
            generation: GenerationParams::default(),
            call_timeout: Duration::from_secs(60),
            max_concurrent_chains: 4,
            default_num_ideas: 3,
            weights: ScoreWeights::default(),
        }
    }
}
