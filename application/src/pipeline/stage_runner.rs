//! Stage runner: prompt, invoke, validate, or fall back.

use crate::pipeline::invoker::{Invocation, InvokeError, ModelInvoker};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::ProgressNotifier;
use cofounder_domain::{AgentRole, IdeaId, Model, ModelSelection, SchemaError, Stage};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Why a stage fell back
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageFailureKind {
    #[error(transparent)]
    Invoke(#[from] InvokeError),

    #[error("Schema validation failed: {0}")]
    Schema(#[from] SchemaError),
}

/// Record of a stage that produced its fallback output
#[derive(Debug, Clone, PartialEq)]
pub struct StageFailure {
    pub role: AgentRole,
    pub model: Model,
    pub kind: StageFailureKind,
}

impl std::fmt::Display for StageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.role, self.model, self.kind)
    }
}

/// Result of running one stage. `output` is always well-formed.
#[derive(Debug, Clone)]
pub struct StageOutcome<T> {
    pub output: T,
    /// `Some` when `output` is the stage's fallback
    pub degraded: Option<StageFailure>,
}

impl<T> StageOutcome<T> {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Runs stages against the models chosen for their roles.
///
/// Cheap to share: one runner serves every chain of a request.
pub struct StageRunner<G: LlmGateway + ?Sized> {
    invoker: Arc<ModelInvoker<G>>,
    models: ModelSelection,
    progress: Arc<dyn ProgressNotifier>,
}

impl<G: LlmGateway + ?Sized> StageRunner<G> {
    pub fn new(
        invoker: Arc<ModelInvoker<G>>,
        models: ModelSelection,
        progress: Arc<dyn ProgressNotifier>,
    ) -> Self {
        Self {
            invoker,
            models,
            progress,
        }
    }

    pub fn models(&self) -> &ModelSelection {
        &self.models
    }

    pub fn progress(&self) -> &dyn ProgressNotifier {
        self.progress.as_ref()
    }

    /// Run `stage`, substituting its fallback on any invoke or schema failure.
    pub async fn run<S: Stage>(
        &self,
        stage: &S,
        ctx: &S::Context,
        feedback: Option<&str>,
        idea_id: Option<&IdeaId>,
    ) -> StageOutcome<S::Output> {
        let role = stage.role();
        let model = self.models.model_for(role);
        self.progress.on_stage_start(role, idea_id);

        let prompt = stage.prompt(ctx, feedback);
        let result = self
            .invoker
            .invoke(Invocation {
                role,
                model,
                system_prompt: stage.system_prompt(),
                prompt: &prompt,
                idea_id,
            })
            .await
            .map_err(StageFailureKind::from)
            .and_then(|value| stage.parse(value, ctx).map_err(StageFailureKind::from));

        let outcome = match result {
            Ok(output) => StageOutcome {
                output,
                degraded: None,
            },
            Err(kind) => {
                if let StageFailureKind::Schema(e) = &kind {
                    warn!(
                        agent = %role,
                        model = %model,
                        idea_id = idea_id.map(IdeaId::as_str).unwrap_or("-"),
                        error = %e,
                        "Model reply failed validation, using fallback"
                    );
                }
                StageOutcome {
                    output: stage.fallback(ctx),
                    degraded: Some(StageFailure {
                        role,
                        model: model.clone(),
                        kind,
                    }),
                }
            }
        };

        self.progress
            .on_stage_complete(role, idea_id, outcome.is_degraded());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::{GatewayError, GenerationParams};
    use crate::ports::progress::NoProgress;
    use crate::test_support::{MockGateway, MockReply, RecordingProgress};
    use cofounder_domain::{Critic, CriticContext, MarketAnalysis};
    use serde_json::json;
    use std::time::Duration;

    fn runner(gateway: MockGateway, models: ModelSelection) -> (Arc<MockGateway>, StageRunner<MockGateway>) {
        let gateway = Arc::new(gateway);
        let invoker = ModelInvoker::new(
            Arc::clone(&gateway),
            GenerationParams::default(),
            Duration::from_secs(1),
        );
        let runner = StageRunner::new(Arc::new(invoker), models, Arc::new(NoProgress));
        (gateway, runner)
    }

    fn ctx() -> CriticContext {
        CriticContext {
            title: "FitBot".into(),
            description: "AI trainer".into(),
            market_analysis: MarketAnalysis::fallback_for("fitness"),
        }
    }

    #[tokio::test]
    async fn test_run_success() {
        let (_, runner) = runner(MockGateway::new(), ModelSelection::default());
        let outcome = runner.run(&Critic, &ctx(), None, None).await;
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.output.strengths, vec!["clear need"]);
    }

    #[tokio::test]
    async fn test_run_uses_role_model() {
        let models = ModelSelection::default().with_override(AgentRole::Critic, Model::Gpt4oMini);
        let (gateway, runner) = runner(MockGateway::new(), models);
        runner.run(&Critic, &ctx(), None, None).await;
        assert_eq!(gateway.calls()[0].1, Model::Gpt4oMini);
    }

    #[tokio::test]
    async fn test_run_falls_back_on_service_error() {
        let gateway = MockGateway::new().with_reply(
            AgentRole::Critic,
            MockReply::Error(GatewayError::RequestFailed("500".into())),
        );
        let (_, runner) = runner(gateway, ModelSelection::default());
        let outcome = runner.run(&Critic, &ctx(), None, None).await;

        assert_eq!(outcome.output, Critic.fallback(&ctx()));
        let failure = outcome.degraded.unwrap();
        assert_eq!(failure.role, AgentRole::Critic);
        assert!(matches!(
            failure.kind,
            StageFailureKind::Invoke(InvokeError::Service(_))
        ));
    }

    #[tokio::test]
    async fn test_run_falls_back_on_schema_error() {
        let gateway = MockGateway::new()
            .with_json(AgentRole::Critic, json!({ "strengths": [], "weaknesses": [] }));
        let (_, runner) = runner(gateway, ModelSelection::default());
        let outcome = runner.run(&Critic, &ctx(), None, None).await;
        assert!(matches!(
            outcome.degraded.unwrap().kind,
            StageFailureKind::Schema(_)
        ));
        assert!(!outcome.output.strengths.is_empty());
    }

    #[tokio::test]
    async fn test_run_passes_feedback_to_prompt() {
        let (gateway, runner) = runner(MockGateway::new(), ModelSelection::default());
        runner.run(&Critic, &ctx(), Some("be harsher"), None).await;
        assert!(gateway.calls()[0].2.contains("be harsher"));
    }

    #[tokio::test]
    async fn test_run_reports_progress() {
        let gateway = Arc::new(MockGateway::failing());
        let progress = Arc::new(RecordingProgress::default());
        let invoker = ModelInvoker::new(gateway, GenerationParams::default(), Duration::from_secs(1));
        let runner = StageRunner::new(Arc::new(invoker), ModelSelection::default(), progress.clone());

        runner.run(&Critic, &ctx(), None, None).await;
        assert_eq!(
            *progress.stages.lock().unwrap(),
            vec![(AgentRole::Critic, true)]
        );
    }
}
