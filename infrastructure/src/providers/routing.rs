use super::{ProviderAdapter, ProviderKind};
use async_trait::async_trait;
use cofounder_application::ports::llm_gateway::{
    GatewayError, LlmGateway, LlmSession, SessionSpec,
};
use cofounder_domain::Model;
use std::sync::Arc;

/// Gateway that picks a provider per model.
///
/// Resolution order:
///  1. provider of the model's family (`gemini-*` to Gemini, `gpt-*` to OpenAI)
///  2. provider of `default_kind`
///  3. first registered provider
///  4. `GatewayError::ModelNotAvailable` when none are registered
pub struct RoutingGateway {
    providers: Vec<Arc<dyn ProviderAdapter>>,
    default_kind: ProviderKind,
}

impl RoutingGateway {
    pub fn new(providers: Vec<Arc<dyn ProviderAdapter>>, default_kind: ProviderKind) -> Self {
        Self {
            providers,
            default_kind,
        }
    }

    fn find(&self, kind: ProviderKind) -> Option<&dyn ProviderAdapter> {
        self.providers
            .iter()
            .find(|p| p.kind() == kind)
            .map(|p| p.as_ref())
    }

    fn resolve_provider(&self, model: &Model) -> Result<&dyn ProviderAdapter, GatewayError> {
        let inferred = if model.is_gemini() {
            Some(ProviderKind::Gemini)
        } else if model.is_gpt() {
            Some(ProviderKind::OpenAi)
        } else {
            None
        };

        inferred
            .and_then(|kind| self.find(kind))
            .or_else(|| self.find(self.default_kind))
            .or_else(|| self.providers.first().map(|p| p.as_ref()))
            .ok_or_else(|| GatewayError::ModelNotAvailable("No providers available".to_string()))
    }
}

#[async_trait]
impl LlmGateway for RoutingGateway {
    async fn create_session(&self, spec: &SessionSpec) -> Result<Box<dyn LlmSession>, GatewayError> {
        self.resolve_provider(&spec.model)?.create_session(spec).await
    }
}
