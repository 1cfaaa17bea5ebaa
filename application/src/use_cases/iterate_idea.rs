//! Iterate Idea use case
//!
//! Re-runs exactly one stage of an existing idea with user feedback,
//! rescores it and stores the result as the next version. Iterations on
//! the same id are serialised; dependent stages are not re-run.

use crate::config::PipelineParams;
use crate::pipeline::{IdeaLocks, ModelInvoker, Scorer, StageFailure, StageRunner};
use crate::ports::idea_repository::{IdeaRepository, RepositoryError};
use crate::ports::invocation_logger::{InvocationLogger, NoInvocationLogger};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::shared::{
    cancelled, is_cancelled, panic_message, select_models, RecordCheckpoint,
};
use chrono::{DateTime, Utc};
use cofounder_domain::{
    Constraints, Critic, CriticContext, DomainError, IdeaId, IdeaRecord, IdeaStatus,
    IterationType, MarketAnalyst, MarketContext, Refiner, RefinerContext, Synthesizer,
    SynthesizerContext,
};
use futures::FutureExt;
use serde::Serialize;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Errors that can occur during an iteration
#[derive(Error, Debug)]
pub enum IterateIdeaError {
    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("Idea not found: {0}")]
    NotFound(IdeaId),

    #[error("Idea {id} cannot be iterated while {status}")]
    InvalidState { id: IdeaId, status: IdeaStatus },

    #[error("Iteration of idea {id} failed: {reason}")]
    IterationFailed { id: IdeaId, reason: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Iteration cancelled")]
    Cancelled,
}

/// Input for the IterateIdea use case
#[derive(Debug, Clone)]
pub struct IterateIdeaInput {
    pub idea_id: IdeaId,
    pub feedback: String,
    /// One of `synthesis`, `refinement`, `critique`, `market_analysis`
    pub iteration_type: String,
    /// Aspects the revision should concentrate on; folded into the feedback
    pub focus_areas: Vec<String>,
    /// Replaces the stored constraints in the prompt of this iteration only
    pub constraints: Option<Constraints>,
    pub model_settings: HashMap<String, String>,
}

impl IterateIdeaInput {
    pub fn new(
        idea_id: impl Into<IdeaId>,
        feedback: impl Into<String>,
        iteration_type: impl Into<String>,
    ) -> Self {
        Self {
            idea_id: idea_id.into(),
            feedback: feedback.into(),
            iteration_type: iteration_type.into(),
            focus_areas: Vec::new(),
            constraints: None,
            model_settings: HashMap::new(),
        }
    }

    pub fn with_focus_areas(mut self, areas: Vec<String>) -> Self {
        self.focus_areas = areas;
        self
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    pub fn with_model_setting(mut self, agent: impl Into<String>, model: impl Into<String>) -> Self {
        self.model_settings.insert(agent.into(), model.into());
        self
    }

    /// Feedback text as sent to the stage
    fn prompt_feedback(&self) -> String {
        let feedback = self.feedback.trim();
        let areas: Vec<&str> = self
            .focus_areas
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .collect();
        if areas.is_empty() {
            feedback.to_string()
        } else {
            format!("{}\nFocus areas: {}", feedback, areas.join(", "))
        }
    }
}

/// Result of one iteration
#[derive(Debug, Clone, Serialize)]
pub struct IterateIdeaOutput {
    pub updated_idea: IdeaRecord,
    pub iteration_id: String,
    pub created_at: DateTime<Utc>,
}

/// Use case for iterating on a stored idea
pub struct IterateIdeaUseCase<G, R>
where
    G: LlmGateway + ?Sized + 'static,
    R: IdeaRepository + ?Sized + 'static,
{
    gateway: Arc<G>,
    repository: Arc<R>,
    params: PipelineParams,
    locks: Arc<IdeaLocks>,
    logger: Arc<dyn InvocationLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl<G, R> IterateIdeaUseCase<G, R>
where
    G: LlmGateway + ?Sized + 'static,
    R: IdeaRepository + ?Sized + 'static,
{
    pub fn new(gateway: Arc<G>, repository: Arc<R>, params: PipelineParams) -> Self {
        Self {
            gateway,
            repository,
            params,
            locks: Arc::new(IdeaLocks::new()),
            logger: Arc::new(NoInvocationLogger),
            cancellation_token: None,
        }
    }

    /// Share a lock table with other holders of the same repository
    pub fn with_locks(mut self, locks: Arc<IdeaLocks>) -> Self {
        self.locks = locks;
        self
    }

    pub fn with_invocation_logger(mut self, logger: Arc<dyn InvocationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: IterateIdeaInput,
    ) -> Result<IterateIdeaOutput, IterateIdeaError> {
        self.execute_with_progress(input, Arc::new(NoProgress)).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: IterateIdeaInput,
        progress: Arc<dyn ProgressNotifier>,
    ) -> Result<IterateIdeaOutput, IterateIdeaError> {
        if input.feedback.trim().is_empty() {
            return Err(DomainError::EmptyFeedback.into());
        }
        let iteration_type: IterationType = input.iteration_type.parse()?;
        let models = select_models(&self.params.models, &input.model_settings)?;
        if is_cancelled(&self.cancellation_token) {
            return Err(IterateIdeaError::Cancelled);
        }

        let id = input.idea_id.clone();
        let _guard = tokio::select! {
            biased;
            _ = cancelled(&self.cancellation_token) => return Err(IterateIdeaError::Cancelled),
            guard = self.locks.acquire(&id) => guard,
        };

        let mut record = self
            .repository
            .get(&id)
            .await?
            .ok_or_else(|| IterateIdeaError::NotFound(id.clone()))?;
        if record.status == IdeaStatus::Failed {
            return Err(IterateIdeaError::InvalidState {
                id,
                status: record.status,
            });
        }
        let status = record.status;
        record
            .start_refinement()
            .map_err(|_| IterateIdeaError::InvalidState {
                id: id.clone(),
                status,
            })?;

        let iteration_id = uuid::Uuid::new_v4().to_string();
        info!(
            idea_id = %id,
            iteration_id = %iteration_id,
            iteration_type = %iteration_type,
            version = record.version,
            "Starting iteration"
        );

        let invoker = ModelInvoker::new(
            Arc::clone(&self.gateway),
            self.params.generation,
            self.params.call_timeout,
        )
        .with_logger(Arc::clone(&self.logger));
        let runner = StageRunner::new(Arc::new(invoker), models, progress);
        let scorer = Scorer::new(self.params.weights);
        let feedback = input.prompt_feedback();

        let checkpoint = RecordCheckpoint::new(&record);
        let work = async {
            let degraded = dispatch(
                &runner,
                &mut record,
                iteration_type,
                &feedback,
                input.constraints.as_ref(),
            )
            .await;
            checkpoint.save(&record);
            if let Some(failure) = degraded {
                warn!(idea_id = %id, failure = %failure, "Iteration kept stage fallback");
            }
            let (scores, _) = scorer.score(&runner, &record).await;
            record.apply_scores(scores);
            checkpoint.save(&record);
        };

        let outcome = tokio::select! {
            biased;
            _ = cancelled(&self.cancellation_token) => return Err(IterateIdeaError::Cancelled),
            outcome = AssertUnwindSafe(work).catch_unwind() => outcome,
        };

        if let Err(payload) = outcome {
            let reason = format!("iteration panicked: {}", panic_message(payload.as_ref()));
            error!(idea_id = %id, reason = %reason, "Iteration failed");
            let mut failed = checkpoint.latest();
            failed.fail(reason.clone())?;
            self.repository.save(&failed).await?;
            runner.progress().on_idea_complete(&failed);
            return Err(IterateIdeaError::IterationFailed { id, reason });
        }

        record.complete()?;
        self.repository.save(&record).await?;
        runner.progress().on_idea_complete(&record);
        info!(idea_id = %id, version = record.version, "Iteration complete");

        Ok(IterateIdeaOutput {
            updated_idea: record,
            iteration_id,
            created_at: Utc::now(),
        })
    }
}

/// Run the one stage selected by `iteration_type` and replace its field.
///
/// A degraded stage still replaces the field with its fallback.
async fn dispatch<G: LlmGateway + ?Sized>(
    runner: &StageRunner<G>,
    record: &mut IdeaRecord,
    iteration_type: IterationType,
    feedback: &str,
    constraints: Option<&Constraints>,
) -> Option<StageFailure> {
    let id = record.id.clone();
    let feedback = Some(feedback);
    match iteration_type {
        IterationType::Synthesis => {
            let ctx = SynthesizerContext::from_record(record);
            let outcome = runner.run(&Synthesizer, &ctx, feedback, Some(&id)).await;
            record.set_synthesizer_output(outcome.output);
            outcome.degraded
        }
        IterationType::Refinement => {
            let mut ctx = RefinerContext::from_record(record);
            if let Some(constraints) = constraints {
                ctx.constraints = constraints.clone();
            }
            let outcome = runner.run(&Refiner, &ctx, feedback, Some(&id)).await;
            record.set_refiner_output(outcome.output);
            outcome.degraded
        }
        IterationType::Critique => {
            let ctx = CriticContext::from_record(record);
            let outcome = runner.run(&Critic, &ctx, feedback, Some(&id)).await;
            record.set_critic_output(outcome.output);
            outcome.degraded
        }
        IterationType::MarketAnalysis => {
            let ctx = MarketContext {
                topic: record.topic.clone(),
                constraints: constraints.cloned().unwrap_or_else(|| record.constraints.clone()),
            };
            let outcome = runner.run(&MarketAnalyst, &ctx, feedback, Some(&id)).await;
            record.set_market_analysis(outcome.output);
            outcome.degraded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryRepository, MockGateway, MockReply};
    use cofounder_domain::{
        AgentRole, IdeaDraft, MarketAnalysis, ScoreWeights, Scores, Stage, Topic,
    };
    use serde_json::json;
    use std::time::Duration;

    /// A stored, completed record at version 1 with every stage populated
    fn completed_record() -> IdeaRecord {
        let mut record = IdeaRecord::new(
            IdeaDraft::new("FitBot", "AI personal trainer"),
            Topic::try_new("AI-powered fitness apps").unwrap(),
            Constraints::new(),
            MarketAnalysis::fallback_for("AI-powered fitness apps"),
        );
        record.start_generation().unwrap();
        record.set_critic_output(Critic.fallback(&CriticContext::from_record(&record)));
        record.set_refiner_output(Refiner.fallback(&RefinerContext::from_record(&record)));
        record.set_synthesizer_output(Synthesizer.fallback(&SynthesizerContext::from_record(&record)));
        record.apply_scores(Scores::interim(&ScoreWeights::default()));
        record.complete().unwrap();
        record
    }

    fn use_case(
        gateway: MockGateway,
        record: &IdeaRecord,
    ) -> (
        Arc<MockGateway>,
        Arc<MemoryRepository>,
        IterateIdeaUseCase<MockGateway, MemoryRepository>,
    ) {
        let gateway = Arc::new(gateway);
        let repository = Arc::new(MemoryRepository::default());
        repository.insert(record.clone());
        let use_case = IterateIdeaUseCase::new(
            Arc::clone(&gateway),
            Arc::clone(&repository),
            PipelineParams::default().with_call_timeout(Duration::from_secs(2)),
        );
        (gateway, repository, use_case)
    }

    // ==================== Validation ====================

    #[tokio::test]
    async fn test_rejects_empty_feedback() {
        let record = completed_record();
        let (gateway, repository, use_case) = use_case(MockGateway::new(), &record);
        let err = use_case
            .execute(IterateIdeaInput::new(record.id.clone(), "  ", "critique"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IterateIdeaError::Validation(DomainError::EmptyFeedback)
        ));
        assert!(gateway.calls().is_empty());
        assert_eq!(repository.snapshot(&record.id).unwrap(), record);
    }

    #[tokio::test]
    async fn test_rejects_unknown_iteration_type() {
        let record = completed_record();
        let (_, _, use_case) = use_case(MockGateway::new(), &record);
        let err = use_case
            .execute(IterateIdeaInput::new(record.id.clone(), "more", "rewrite"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IterateIdeaError::Validation(DomainError::UnknownIterationType(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let record = completed_record();
        let (gateway, repository, use_case) = use_case(MockGateway::new(), &record);
        let err = use_case
            .execute(IterateIdeaInput::new("missing", "more detail", "synthesis"))
            .await
            .unwrap_err();
        assert!(matches!(err, IterateIdeaError::NotFound(id) if id.as_str() == "missing"));
        assert!(gateway.calls().is_empty());
        assert_eq!(repository.len(), 1);
        assert_eq!(repository.save_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_record_is_rejected() {
        let mut record = completed_record();
        record.fail("earlier failure").unwrap();
        let (gateway, _, use_case) = use_case(MockGateway::new(), &record);
        let err = use_case
            .execute(IterateIdeaInput::new(record.id.clone(), "retry", "critique"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IterateIdeaError::InvalidState { status: IdeaStatus::Failed, .. }
        ));
        assert!(gateway.calls().is_empty());
    }

    // ==================== Dispatch ====================

    #[tokio::test]
    async fn test_critique_changes_only_owned_fields() {
        let record = completed_record();
        let (gateway, repository, use_case) = use_case(MockGateway::new(), &record);
        let output = use_case
            .execute(IterateIdeaInput::new(record.id.clone(), "be harsher", "critique"))
            .await
            .unwrap();
        let updated = output.updated_idea;

        assert_eq!(updated.version, 2);
        assert_eq!(updated.status, IdeaStatus::Completed);
        assert_ne!(updated.critic_output, record.critic_output);
        assert_eq!(updated.critic_output.as_ref().unwrap().strengths, vec!["clear need"]);
        assert_eq!(updated.market_analysis, record.market_analysis);
        assert_eq!(updated.pm_refiner_output, record.pm_refiner_output);
        assert_eq!(updated.synthesizer_output, record.synthesizer_output);
        assert_eq!(updated.title, record.title);
        assert_eq!(updated.description, record.description);
        assert_eq!(updated.created_at, record.created_at);
        assert!(updated.updated_at >= record.updated_at);

        // one stage call plus one evaluation, feedback in the prompt
        assert_eq!(gateway.calls().len(), 2);
        assert_eq!(gateway.calls_for(AgentRole::Critic), 1);
        assert!(gateway.calls()[0].2.contains("be harsher"));

        assert_eq!(repository.snapshot(&record.id).unwrap(), updated);
    }

    #[tokio::test]
    async fn test_each_type_dispatches_to_its_stage() {
        for (ty, role) in [
            ("synthesis", AgentRole::Synthesizer),
            ("refinement", AgentRole::Refiner),
            ("critique", AgentRole::Critic),
            ("market_analysis", AgentRole::MarketAnalyst),
        ] {
            let record = completed_record();
            let (gateway, _, use_case) = use_case(MockGateway::new(), &record);
            use_case
                .execute(IterateIdeaInput::new(record.id.clone(), "feedback", ty))
                .await
                .unwrap();
            assert_eq!(gateway.calls_for(role), 1, "{ty}");
            assert_eq!(gateway.calls_for(AgentRole::Evaluator), 1);
            assert_eq!(gateway.calls().len(), 2);
        }
    }

    #[tokio::test]
    async fn test_market_analysis_does_not_cascade() {
        let record = completed_record();
        let (_, _, use_case) = use_case(MockGateway::new(), &record);
        let updated = use_case
            .execute(IterateIdeaInput::new(record.id.clone(), "focus on Asia", "market_analysis"))
            .await
            .unwrap()
            .updated_idea;
        assert_ne!(updated.market_analysis, record.market_analysis);
        assert_eq!(updated.synthesizer_output, record.synthesizer_output);
        assert_eq!(updated.critic_output, record.critic_output);
    }

    #[tokio::test]
    async fn test_focus_areas_and_constraints_reach_prompt() {
        let record = completed_record();
        let (gateway, _, use_case) = use_case(MockGateway::new(), &record);
        use_case
            .execute(
                IterateIdeaInput::new(record.id.clone(), "tighten scope", "refinement")
                    .with_focus_areas(vec!["pricing".into(), "onboarding".into()])
                    .with_constraints(Constraints::new().with("budget", "10k")),
            )
            .await
            .unwrap();
        let prompt = &gateway.calls()[0].2;
        assert!(prompt.contains("Focus areas: pricing, onboarding"));
        assert!(prompt.contains("- budget: 10k"));
    }

    #[tokio::test]
    async fn test_rescored_consistently() {
        let record = completed_record();
        let gateway = MockGateway::new().with_json(
            AgentRole::Evaluator,
            json!({ "feasibility": 0.3, "novelty": 0.9, "market_signal": 0.9 }),
        );
        let (_, _, use_case) = use_case(gateway, &record);
        let updated = use_case
            .execute(IterateIdeaInput::new(record.id.clone(), "more", "synthesis"))
            .await
            .unwrap()
            .updated_idea;
        assert!((updated.overall_score - 0.7).abs() < 1e-9);
        assert!(updated.scores().is_consistent(&ScoreWeights::default()));
    }

    #[tokio::test]
    async fn test_degraded_stage_still_completes() {
        let record = completed_record();
        let gateway = MockGateway::failing();
        let (_, _, use_case) = use_case(gateway, &record);
        let updated = use_case
            .execute(IterateIdeaInput::new(record.id.clone(), "more", "synthesis"))
            .await
            .unwrap()
            .updated_idea;
        assert_eq!(updated.status, IdeaStatus::Completed);
        assert_eq!(updated.version, 2);
        assert!((updated.overall_score - 0.5).abs() < 1e-9);
    }

    // ==================== Failures ====================

    #[tokio::test]
    async fn test_panic_marks_record_failed() {
        let record = completed_record();
        let gateway = MockGateway::new().with_reply(AgentRole::Synthesizer, MockReply::Panic);
        let (_, repository, use_case) = use_case(gateway, &record);
        let err = use_case
            .execute(IterateIdeaInput::new(record.id.clone(), "more", "synthesis"))
            .await
            .unwrap_err();
        assert!(matches!(err, IterateIdeaError::IterationFailed { .. }));

        let stored = repository.snapshot(&record.id).unwrap();
        assert_eq!(stored.status, IdeaStatus::Failed);
        assert_eq!(stored.version, 2);
        assert_eq!(stored.synthesizer_output, record.synthesizer_output);
    }

    #[tokio::test]
    async fn test_panic_after_stage_keeps_new_output() {
        let record = completed_record();
        let gateway = MockGateway::new().with_reply(AgentRole::Evaluator, MockReply::Panic);
        let (_, repository, use_case) = use_case(gateway, &record);
        let err = use_case
            .execute(IterateIdeaInput::new(record.id.clone(), "be harsher", "critique"))
            .await
            .unwrap_err();
        assert!(matches!(err, IterateIdeaError::IterationFailed { .. }));

        let stored = repository.snapshot(&record.id).unwrap();
        assert_eq!(stored.status, IdeaStatus::Failed);
        assert_eq!(stored.version, 2);
        assert_eq!(stored.critic_output.unwrap().strengths, vec!["clear need"]);
        assert_eq!(stored.synthesizer_output, record.synthesizer_output);
    }

    // ==================== Concurrency ====================

    #[tokio::test]
    async fn test_overlapping_iterations_are_serialised() {
        let record = completed_record();
        let gateway = MockGateway::new()
            .with_reply(
                AgentRole::Critic,
                MockReply::Delayed(Duration::from_millis(100), json!({
                    "strengths": ["first"], "weaknesses": ["w"]
                }).to_string()),
            )
            .with_json(AgentRole::Refiner, json!({ "features": ["second"] }));
        let (_, repository, use_case) = use_case(gateway, &record);
        let use_case = Arc::new(use_case);

        let first = {
            let use_case = Arc::clone(&use_case);
            let id = record.id.clone();
            tokio::spawn(async move {
                use_case
                    .execute(IterateIdeaInput::new(id, "first", "critique"))
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        let second = use_case
            .execute(IterateIdeaInput::new(record.id.clone(), "second", "refinement"))
            .await
            .unwrap();
        let first = first.await.unwrap().unwrap();

        assert_eq!(first.updated_idea.version, 2);
        assert_eq!(second.updated_idea.version, 3);

        let stored = repository.snapshot(&record.id).unwrap();
        assert_eq!(stored.version, 3);
        assert_eq!(stored.critic_output.unwrap().strengths, vec!["first"]);
        assert_eq!(stored.pm_refiner_output.unwrap().features, vec!["second"]);
    }

    #[tokio::test]
    async fn test_cancelled_iteration_leaves_record_untouched() {
        let record = completed_record();
        let token = CancellationToken::new();
        token.cancel();
        let (_, repository, use_case) = use_case(MockGateway::new(), &record);
        let use_case = use_case.with_cancellation(token);
        let err = use_case
            .execute(IterateIdeaInput::new(record.id.clone(), "more", "critique"))
            .await
            .unwrap_err();
        assert!(matches!(err, IterateIdeaError::Cancelled));
        assert_eq!(repository.snapshot(&record.id).unwrap(), record);
    }
}
