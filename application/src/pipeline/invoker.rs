//! Model invoker: one bounded model call turned into a JSON object.

use crate::ports::invocation_logger::{InvocationEvent, InvocationLogger, NoInvocationLogger};
use crate::ports::llm_gateway::{GatewayError, GenerationParams, LlmGateway, SessionSpec};
use cofounder_domain::{AgentRole, IdeaId, Model, extract_json_object};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a model call produced no usable JSON
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvokeError {
    /// The model answered but no JSON object could be read from the text
    #[error("Could not parse model output: {0}")]
    Parse(String),

    /// Transport, provider or timeout failure
    #[error("Model service error: {0}")]
    Service(#[from] GatewayError),
}

impl InvokeError {
    fn kind(&self) -> &'static str {
        match self {
            InvokeError::Parse(_) => "parse_error",
            InvokeError::Service(_) => "service_error",
        }
    }
}

/// A single call request
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub role: AgentRole,
    pub model: &'a Model,
    pub system_prompt: &'a str,
    pub prompt: &'a str,
    pub idea_id: Option<&'a IdeaId>,
}

/// Wraps the gateway with a timeout, JSON extraction and invocation logging.
///
/// No retries: a failed call is reported once and the caller decides.
pub struct ModelInvoker<G: LlmGateway + ?Sized> {
    gateway: Arc<G>,
    logger: Arc<dyn InvocationLogger>,
    params: GenerationParams,
    timeout: Duration,
}

impl<G: LlmGateway + ?Sized> ModelInvoker<G> {
    pub fn new(gateway: Arc<G>, params: GenerationParams, timeout: Duration) -> Self {
        Self {
            gateway,
            logger: Arc::new(NoInvocationLogger),
            params,
            timeout,
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn InvocationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub async fn invoke(&self, call: Invocation<'_>) -> Result<Value, InvokeError> {
        let started = Instant::now();
        debug!(
            agent = %call.role,
            model = %call.model,
            prompt_chars = call.prompt.len(),
            "Invoking model"
        );

        let result = self.call_model(&call).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        if let Err(e) = &result {
            warn!(
                agent = %call.role,
                model = %call.model,
                idea_id = call.idea_id.map(IdeaId::as_str).unwrap_or("-"),
                error = %e,
                "Model invocation failed"
            );
        }

        self.logger.log(InvocationEvent::new(
            "model_invocation",
            json!({
                "role": call.role.as_str(),
                "model": call.model.as_str(),
                "idea_id": call.idea_id.map(IdeaId::as_str),
                "outcome": match &result {
                    Ok(_) => "ok",
                    Err(e) => e.kind(),
                },
                "error": result.as_ref().err().map(|e| e.to_string()),
                "latency_ms": latency_ms,
            }),
        ));

        result
    }

    async fn call_model(&self, call: &Invocation<'_>) -> Result<Value, InvokeError> {
        let spec = SessionSpec {
            role: call.role,
            model: call.model.clone(),
            system_prompt: call.system_prompt.to_string(),
            params: self.params,
        };

        let exchange = async {
            let session = self.gateway.create_session(&spec).await?;
            session.send(call.prompt).await
        };

        let text = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| GatewayError::Timeout)??;

        extract_json_object(&text).ok_or_else(|| {
            let preview: String = text.chars().take(80).collect();
            InvokeError::Parse(format!("no JSON object in response: {preview:?}"))
        })
    }
}
