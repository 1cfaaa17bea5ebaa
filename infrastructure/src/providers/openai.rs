//! OpenAI-compatible chat completions adapter.
//!
//! Works with any endpoint speaking the `/chat/completions` protocol
//! (OpenAI, Azure-style proxies, local servers such as Ollama).

use super::http::post_json;
use super::{ProviderAdapter, ProviderKind};
use async_trait::async_trait;
use cofounder_application::ports::llm_gateway::{
    GatewayError, GenerationParams, LlmSession, SessionSpec,
};
use cofounder_domain::Model;
use serde_json::{Value, json};
use tracing::debug;

pub struct OpenAiAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiAdapter {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn create_session(&self, spec: &SessionSpec) -> Result<Box<dyn LlmSession>, GatewayError> {
        debug!(model = %spec.model, agent = %spec.role, "Opening OpenAI session");
        Ok(Box::new(OpenAiSession {
            client: self.client.clone(),
            endpoint: self.endpoint(),
            api_key: self.api_key.clone(),
            model: spec.model.clone(),
            system_prompt: spec.system_prompt.clone(),
            params: spec.params,
        }))
    }
}

/// One system prompt plus one user message per send; no history is kept
pub struct OpenAiSession {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: Model,
    system_prompt: String,
    params: GenerationParams,
}

pub(crate) fn request_body(
    model: &Model,
    system_prompt: &str,
    content: &str,
    params: GenerationParams,
) -> Value {
    json!({
        "model": model.as_str(),
        "messages": [
            { "role": "system", "content": system_prompt },
            { "role": "user", "content": content },
        ],
        "temperature": params.temperature,
        "max_tokens": params.max_tokens,
    })
}

pub(crate) fn completion_text(response: &Value) -> Result<String, GatewayError> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| GatewayError::Other("response has no choices[0].message.content".into()))
}

#[async_trait]
impl LlmSession for OpenAiSession {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn send(&self, content: &str) -> Result<String, GatewayError> {
        let mut request = self.client.post(&self.endpoint);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let body = request_body(&self.model, &self.system_prompt, content, self.params);
        let response = post_json(request, &body).await?;
        completion_text(&response)
    }
}
