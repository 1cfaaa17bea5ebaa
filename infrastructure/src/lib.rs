//! Infrastructure layer for ai-cofounder
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: LLM providers, idea storage, the invocation
//! log, and configuration file loading.

pub mod config;
pub mod logging;
pub mod persistence;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileGenerationConfig, FileLoggingConfig,
    FileModelsConfig, FileProviderConfig, FileProviderKind, FileScoringConfig, FileServerConfig,
    FileStorageConfig, FileStorageKind,
};
pub use logging::JsonlInvocationLogger;
pub use persistence::{
    InMemoryFeedbackRepository, InMemoryIdeaRepository, JsonFileIdeaRepository,
};
pub use providers::{
    canned::CannedGateway, gateway_from_config, gemini::GeminiAdapter, openai::OpenAiAdapter,
    routing::RoutingGateway,
};
