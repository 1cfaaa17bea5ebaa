//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application types
//! once validated.

mod generation;
mod models;
mod provider;
mod scoring;
mod server;
mod storage;

pub use generation::FileGenerationConfig;
pub use models::FileModelsConfig;
pub use provider::{FileProviderConfig, FileProviderKind};
pub use scoring::FileScoringConfig;
pub use server::FileServerConfig;
pub use storage::{FileLoggingConfig, FileStorageConfig, FileStorageKind};

use cofounder_application::{GenerationParams, PipelineParams};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("generation.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("generation.temperature must be between 0 and 2, got {0}")]
    InvalidTemperature(f32),

    #[error("generation.max_tokens cannot be 0")]
    InvalidMaxTokens,

    #[error("generation.max_concurrent_chains cannot be 0")]
    InvalidConcurrency,

    #[error("generation.default_num_ideas must be between 1 and 10, got {0}")]
    InvalidDefaultNumIdeas(usize),

    #[error("{0}: model name cannot be empty")]
    EmptyModelName(String),

    #[error("models.agents: unknown agent '{0}'")]
    UnknownAgent(String),

    #[error("storage.path is required when storage.kind = \"json_file\"")]
    MissingStoragePath,

    #[error("scoring: {0}")]
    InvalidWeights(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Per-agent model selection
    pub models: FileModelsConfig,
    /// Sampling parameters and pipeline limits
    pub generation: FileGenerationConfig,
    /// Weights of the sub-scores
    pub scoring: FileScoringConfig,
    /// LLM provider endpoints
    pub provider: FileProviderConfig,
    /// HTTP API settings
    pub server: FileServerConfig,
    /// Where idea records live
    pub storage: FileStorageConfig,
    /// Log destinations
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration, stopping at the first problem
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.models.validate()?;
        self.generation.validate()?;
        self.scoring.validate()?;
        self.storage.validate()?;
        Ok(())
    }

    /// Convert into the parameters shared by the use cases
    pub fn to_pipeline_params(&self) -> Result<PipelineParams, ConfigValidationError> {
        self.validate()?;
        let generation = &self.generation;
        Ok(PipelineParams::default()
            .with_models(self.models.to_selection()?)
            .with_generation(GenerationParams {
                temperature: generation.temperature,
                max_tokens: generation.max_tokens,
            })
            .with_call_timeout(Duration::from_secs(generation.timeout_seconds))
            .with_max_concurrent_chains(generation.max_concurrent_chains)
            .with_default_num_ideas(generation.default_num_ideas)
            .with_weights(self.scoring.to_weights()?))
    }
}
