//! Application layer for ai-cofounder
//!
//! This crate contains use cases, port definitions, the stage pipeline and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod pipeline;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::PipelineParams;
pub use pipeline::{IdeaLocks, InvokeError, ModelInvoker, Scorer, StageFailure, StageRunner};
pub use ports::{
    feedback_repository::{FeedbackPage, FeedbackQuery, FeedbackRepository},
    idea_repository::{IdeaPage, IdeaQuery, IdeaRepository, RepositoryError},
    invocation_logger::{InvocationEvent, InvocationLogger, NoInvocationLogger},
    llm_gateway::{GatewayError, GenerationParams, LlmGateway, LlmSession, SessionSpec},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::generate_ideas::{
    GenerateIdeasError, GenerateIdeasInput, GenerateIdeasOutput, GenerateIdeasUseCase,
};
pub use use_cases::iterate_idea::{
    IterateIdeaError, IterateIdeaInput, IterateIdeaOutput, IterateIdeaUseCase,
};
pub use use_cases::manage_feedback::{FeedbackError, FeedbackInput, ManageFeedbackUseCase};
pub use use_cases::read_ideas::{ReadIdeasError, ReadIdeasUseCase};
