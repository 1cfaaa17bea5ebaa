//! Domain layer for ai-cofounder
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Idea records
//!
//! An [`IdeaRecord`] is one startup concept at a point in its refinement
//! history. Every stage of the pipeline owns exactly one field of the record
//! and replaces it wholesale when it runs.
//!
//! ## Feedback
//!
//! [`Feedback`] is a typed user reaction to a stored idea, optionally rated
//! from 1 to 5. It never changes the idea itself.
//!
//! ## Stages
//!
//! - **MarketAnalyst**: one shared market analysis per generation
//! - **IdeaGenerator**: the initial drafts
//! - **Critic → Refiner → Synthesizer**: the per-idea chain
//! - **Evaluator**: raw sub-scores for the scoring rule
//!
//! Each stage knows how to prompt a model, validate its reply, and build a
//! deterministic fallback; it never performs I/O itself.

pub mod core;
pub mod feedback;
pub mod idea;
pub mod parsing;
pub mod prompt;
pub mod scoring;
pub mod stage;

// Re-export commonly used types
pub use core::{error::DomainError, model::Model, topic::Topic};
pub use feedback::{Feedback, FeedbackContent, FeedbackId, FeedbackType, Rating};
pub use idea::{
    Constraints, CriticOutput, IdeaDraft, IdeaId, IdeaRecord, IdeaStatus, IterationType,
    MarketAnalysis, RefinerOutput, RevenueProjections, SynthesizerOutput,
};
pub use parsing::extract_json_object;
pub use prompt::PromptTemplate;
pub use scoring::{ScoreWeights, Scores};
pub use stage::{
    AgentRole, Critic, CriticContext, Evaluator, EvaluatorContext, EvaluatorOutput,
    GeneratorContext, IdeaGenerator, MarketAnalyst, MarketContext, ModelSelection, Refiner,
    RefinerContext, SchemaError, Stage, Synthesizer, SynthesizerContext,
};
