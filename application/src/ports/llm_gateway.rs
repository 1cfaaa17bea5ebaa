//! LLM Gateway port
//!
//! Defines the interface for communicating with LLM providers.

use async_trait::async_trait;
use cofounder_domain::{AgentRole, Model};
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Sampling parameters sent with every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 4000,
        }
    }
}

/// Everything a provider needs to open a session for one stage call
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSpec {
    /// Agent on whose behalf the session is opened
    pub role: AgentRole,
    pub model: Model,
    pub system_prompt: String,
    pub params: GenerationParams,
}

/// Gateway for LLM communication
///
/// This port defines how the application layer communicates with LLM providers.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Create a new session for one stage call
    async fn create_session(&self, spec: &SessionSpec) -> Result<Box<dyn LlmSession>, GatewayError>;
}

/// An active LLM session
#[async_trait]
pub trait LlmSession: Send + Sync {
    /// Get the model used by this session
    fn model(&self) -> &Model;

    /// Send a message and get the raw text response
    async fn send(&self, content: &str) -> Result<String, GatewayError>;
}
