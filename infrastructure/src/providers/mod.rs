//! LLM provider adapters and the gateway that routes between them.

pub mod canned;
pub mod gemini;
mod http;
pub mod openai;
pub mod routing;

use crate::config::{FileProviderConfig, FileProviderKind};
use async_trait::async_trait;
use cofounder_application::ports::llm_gateway::{
    GatewayError, LlmGateway, LlmSession, SessionSpec,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Gemini,
    OpenAi,
}

#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;
    async fn create_session(&self, spec: &SessionSpec) -> Result<Box<dyn LlmSession>, GatewayError>;
}

/// Build the gateway described by `[provider]`.
///
/// `request_timeout` bounds each HTTP request; the application applies its
/// own per-call timeout on top.
pub fn gateway_from_config(
    config: &FileProviderConfig,
    request_timeout: Duration,
) -> Result<Arc<dyn LlmGateway>, GatewayError> {
    if config.kind == FileProviderKind::Mock {
        info!("Using canned model replies");
        return Ok(Arc::new(canned::CannedGateway::new()));
    }

    let client = reqwest::Client::builder()
        .timeout(request_timeout)
        .build()
        .map_err(|e| GatewayError::Other(format!("could not build HTTP client: {e}")))?;

    let openai_key = config.openai_api_key();
    let gemini_key = config.gemini_api_key();
    if openai_key.is_none() && gemini_key.is_none() {
        warn!(
            "Neither {} nor {} is set; model calls will fail and stages will fall back",
            config.openai_api_key_env, config.gemini_api_key_env
        );
    }

    let providers: Vec<Arc<dyn ProviderAdapter>> = vec![
        Arc::new(gemini::GeminiAdapter::new(
            client.clone(),
            &config.gemini_base_url,
            gemini_key,
        )),
        Arc::new(openai::OpenAiAdapter::new(
            client,
            &config.openai_base_url,
            openai_key,
        )),
    ];
    let default_kind = match config.kind {
        FileProviderKind::OpenAi => ProviderKind::OpenAi,
        _ => ProviderKind::Gemini,
    };
    Ok(Arc::new(routing::RoutingGateway::new(providers, default_kind)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_kind_builds_canned_gateway() {
        let config = FileProviderConfig {
            kind: FileProviderKind::Mock,
            ..Default::default()
        };
        let gateway = gateway_from_config(&config, Duration::from_secs(5)).unwrap();
        let spec = SessionSpec {
            role: cofounder_domain::AgentRole::Evaluator,
            model: Default::default(),
            system_prompt: String::new(),
            params: Default::default(),
        };
        let reply = gateway.create_session(&spec).await.unwrap().send("x").await.unwrap();
        assert!(reply.contains("feasibility"));
    }
}
