//! Google Gemini `generateContent` adapter.

use super::http::post_json;
use super::{ProviderAdapter, ProviderKind};
use async_trait::async_trait;
use cofounder_application::ports::llm_gateway::{
    GatewayError, GenerationParams, LlmSession, SessionSpec,
};
use cofounder_domain::Model;
use serde_json::{Value, json};
use tracing::debug;

pub struct GeminiAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiAdapter {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn endpoint(&self, model: &Model) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model.as_str())
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn create_session(&self, spec: &SessionSpec) -> Result<Box<dyn LlmSession>, GatewayError> {
        let Some(api_key) = self.api_key.clone() else {
            return Err(GatewayError::Unauthorized("no Gemini API key configured".into()));
        };
        debug!(model = %spec.model, agent = %spec.role, "Opening Gemini session");
        Ok(Box::new(GeminiSession {
            client: self.client.clone(),
            endpoint: self.endpoint(&spec.model),
            api_key,
            model: spec.model.clone(),
            system_prompt: spec.system_prompt.clone(),
            params: spec.params,
        }))
    }
}

pub struct GeminiSession {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: Model,
    system_prompt: String,
    params: GenerationParams,
}

pub(crate) fn request_body(system_prompt: &str, content: &str, params: GenerationParams) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": system_prompt }] },
        "contents": [{ "role": "user", "parts": [{ "text": content }] }],
        "generationConfig": {
            "temperature": params.temperature,
            "maxOutputTokens": params.max_tokens,
        },
    })
}

/// Concatenate the text parts of the first candidate
pub(crate) fn candidate_text(response: &Value) -> Result<String, GatewayError> {
    let parts = response["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| GatewayError::Other("response has no candidates[0].content.parts".into()))?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.is_empty() {
        let reason = response["candidates"][0]["finishReason"]
            .as_str()
            .unwrap_or("empty");
        return Err(GatewayError::Other(format!("no text in candidate ({reason})")));
    }
    Ok(text)
}

#[async_trait]
impl LlmSession for GeminiSession {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn send(&self, content: &str) -> Result<String, GatewayError> {
        let request = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key);
        let body = request_body(&self.system_prompt, content, self.params);
        let response = post_json(request, &body).await?;
        candidate_text(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_includes_model() {
        let adapter = GeminiAdapter::new(
            reqwest::Client::new(),
            "https://generativelanguage.googleapis.com/v1beta",
            Some("key".into()),
        );
        assert_eq!(
            adapter.endpoint(&Model::Gemini15Pro),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = request_body("system", "hello", GenerationParams::default());
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "system");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 4000);
    }

    #[test]
    fn test_candidate_text_joins_parts() {
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        });
        assert_eq!(candidate_text(&response).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_candidate_without_text() {
        let response = json!({
            "candidates": [{ "content": { "parts": [] }, "finishReason": "SAFETY" }]
        });
        let err = candidate_text(&response).unwrap_err();
        assert!(matches!(err, GatewayError::Other(msg) if msg.contains("SAFETY")));
    }

    #[tokio::test]
    async fn test_missing_key_is_unauthorized() {
        let adapter = GeminiAdapter::new(reqwest::Client::new(), "http://localhost", None);
        let spec = SessionSpec {
            role: cofounder_domain::AgentRole::Critic,
            model: Model::Gemini15Pro,
            system_prompt: "s".into(),
            params: GenerationParams::default(),
        };
        assert!(matches!(
            adapter.create_session(&spec).await,
            Err(GatewayError::Unauthorized(_))
        ));
    }
}
