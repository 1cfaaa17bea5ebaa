//! Generate Ideas use case
//!
//! Runs the full pipeline for a topic: one shared market analysis, one
//! generation call for every draft, then an independent
//! Critic → Refiner → Synthesizer chain per idea followed by scoring.

use crate::config::PipelineParams;
use crate::pipeline::{ModelInvoker, Scorer, StageRunner};
use crate::ports::idea_repository::IdeaRepository;
use crate::ports::invocation_logger::{InvocationLogger, NoInvocationLogger};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::shared::{
    cancelled, is_cancelled, panic_message, select_models, RecordCheckpoint,
};
use chrono::{DateTime, Utc};
use cofounder_domain::{
    Constraints, Critic, CriticContext, DomainError, GeneratorContext, IdeaGenerator, IdeaRecord,
    IdeaStatus, MarketAnalyst, MarketContext, ModelSelection, Refiner, RefinerContext,
    Synthesizer, SynthesizerContext, Topic,
};
use futures::FutureExt;
use serde::Serialize;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Errors that end a generation request as a whole
#[derive(Error, Debug)]
pub enum GenerateIdeasError {
    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("Generation cancelled")]
    Cancelled,
}

/// Input for the GenerateIdeas use case
#[derive(Debug, Clone, Default)]
pub struct GenerateIdeasInput {
    pub topic: String,
    pub constraints: Constraints,
    /// Defaults to the configured number of ideas
    pub num_ideas: Option<usize>,
    /// Agent name → model id overrides for this request only
    pub model_settings: HashMap<String, String>,
}

impl GenerateIdeasInput {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Self::default()
        }
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_num_ideas(mut self, num_ideas: usize) -> Self {
        self.num_ideas = Some(num_ideas);
        self
    }

    pub fn with_model_setting(mut self, agent: impl Into<String>, model: impl Into<String>) -> Self {
        self.model_settings.insert(agent.into(), model.into());
        self
    }
}

/// Result of one generation, ideas in generation order
#[derive(Debug, Clone, Serialize)]
pub struct GenerateIdeasOutput {
    pub ideas: Vec<IdeaRecord>,
    pub generation_id: String,
    pub created_at: DateTime<Utc>,
}

impl GenerateIdeasOutput {
    pub fn failed_count(&self) -> usize {
        self.ideas
            .iter()
            .filter(|r| r.status == IdeaStatus::Failed)
            .count()
    }
}

struct ValidatedRequest {
    topic: Topic,
    constraints: Constraints,
    count: usize,
    models: ModelSelection,
}

/// Use case for generating ideas
pub struct GenerateIdeasUseCase<G, R>
where
    G: LlmGateway + ?Sized + 'static,
    R: IdeaRepository + ?Sized + 'static,
{
    gateway: Arc<G>,
    repository: Arc<R>,
    params: PipelineParams,
    logger: Arc<dyn InvocationLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl<G, R> GenerateIdeasUseCase<G, R>
where
    G: LlmGateway + ?Sized + 'static,
    R: IdeaRepository + ?Sized + 'static,
{
    pub fn new(gateway: Arc<G>, repository: Arc<R>, params: PipelineParams) -> Self {
        Self {
            gateway,
            repository,
            params,
            logger: Arc::new(NoInvocationLogger),
            cancellation_token: None,
        }
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

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: GenerateIdeasInput,
    ) -> Result<GenerateIdeasOutput, GenerateIdeasError> {
        self.execute_with_progress(input, Arc::new(NoProgress)).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: GenerateIdeasInput,
        progress: Arc<dyn ProgressNotifier>,
    ) -> Result<GenerateIdeasOutput, GenerateIdeasError> {
        let request = self.validate(input)?;
        if is_cancelled(&self.cancellation_token) {
            return Err(GenerateIdeasError::Cancelled);
        }

        let generation_id = uuid::Uuid::new_v4().to_string();
        let created_at = Utc::now();
        info!(
            generation_id = %generation_id,
            topic = %request.topic,
            num_ideas = request.count,
            "Starting idea generation"
        );
        progress.on_generation_start(request.count);

        let invoker = ModelInvoker::new(
            Arc::clone(&self.gateway),
            self.params.generation,
            self.params.call_timeout,
        )
        .with_logger(Arc::clone(&self.logger));
        let runner = Arc::new(StageRunner::new(
            Arc::new(invoker),
            request.models,
            Arc::clone(&progress),
        ));

        // Shared stages
        let market_ctx = MarketContext {
            topic: request.topic.clone(),
            constraints: request.constraints.clone(),
        };
        let market = tokio::select! {
            biased;
            _ = cancelled(&self.cancellation_token) => return Err(GenerateIdeasError::Cancelled),
            outcome = runner.run(&MarketAnalyst, &market_ctx, None, None) => outcome,
        };

        let generator_ctx = GeneratorContext {
            topic: request.topic.clone(),
            constraints: request.constraints.clone(),
            market_analysis: market.output.clone(),
            count: request.count,
        };
        let drafts = tokio::select! {
            biased;
            _ = cancelled(&self.cancellation_token) => return Err(GenerateIdeasError::Cancelled),
            outcome = runner.run(&IdeaGenerator, &generator_ctx, None, None) => outcome,
        };

        let mut records = Vec::with_capacity(request.count);
        for draft in drafts.output {
            let mut record = IdeaRecord::with_weights(
                draft,
                request.topic.clone(),
                request.constraints.clone(),
                market.output.clone(),
                &self.params.weights,
            );
            record.start_generation()?;
            records.push(record);
        }

        let ideas = self.run_chains(records, &runner).await?;
        let failed = ideas.iter().filter(|r| r.status == IdeaStatus::Failed).count();
        info!(
            generation_id = %generation_id,
            completed = ideas.len() - failed,
            failed,
            "Idea generation finished"
        );

        Ok(GenerateIdeasOutput {
            ideas,
            generation_id,
            created_at,
        })
    }

    fn validate(&self, input: GenerateIdeasInput) -> Result<ValidatedRequest, DomainError> {
        let topic = Topic::try_new(input.topic)?;
        let count = input.num_ideas.unwrap_or(self.params.default_num_ideas);
        if !(PipelineParams::MIN_IDEAS..=PipelineParams::MAX_IDEAS).contains(&count) {
            return Err(DomainError::IdeaCountOutOfRange {
                got: count,
                min: PipelineParams::MIN_IDEAS,
                max: PipelineParams::MAX_IDEAS,
            });
        }
        let models = select_models(&self.params.models, &input.model_settings)?;
        Ok(ValidatedRequest {
            topic,
            constraints: input.constraints,
            count,
            models,
        })
    }

    /// Run one chain per record, at most `max_concurrent_chains` at a time.
    ///
    /// Dropping the returned future aborts every chain still running.
    async fn run_chains(
        &self,
        records: Vec<IdeaRecord>,
        runner: &Arc<StageRunner<G>>,
    ) -> Result<Vec<IdeaRecord>, GenerateIdeasError> {
        let semaphore = Arc::new(Semaphore::new(self.params.max_concurrent_chains.max(1)));
        let checkpoints: Vec<Arc<RecordCheckpoint>> = records
            .iter()
            .map(|record| Arc::new(RecordCheckpoint::new(record)))
            .collect();
        let mut join_set = JoinSet::new();

        for (index, record) in records.into_iter().enumerate() {
            let chain = self.chain(runner);
            let checkpoint = Arc::clone(&checkpoints[index]);
            let semaphore = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let outcome = AssertUnwindSafe(chain.run(record, &checkpoint))
                    .catch_unwind()
                    .await;
                match outcome {
                    Ok(record) => (index, record),
                    Err(payload) => {
                        let reason = format!("idea chain panicked: {}", panic_message(payload.as_ref()));
                        (index, chain.fail_and_persist(checkpoint.latest(), reason).await)
                    }
                }
            });
        }

        let mut finished: Vec<Option<IdeaRecord>> = vec![None; checkpoints.len()];
        loop {
            let joined = tokio::select! {
                biased;
                _ = cancelled(&self.cancellation_token) => {
                    join_set.abort_all();
                    warn!("Generation cancelled, abandoning in-flight chains");
                    return Err(GenerateIdeasError::Cancelled);
                }
                joined = join_set.join_next() => joined,
            };
            match joined {
                Some(Ok((index, record))) => finished[index] = Some(record),
                Some(Err(e)) => error!(error = %e, "Idea chain task did not complete"),
                None => break,
            }
        }

        Ok(self.settle_unfinished(finished, &checkpoints, runner).await)
    }

    /// Fill every slot whose task never returned from its last checkpoint.
    ///
    /// The idea is marked failed and stored so the output still holds one
    /// record per draft.
    async fn settle_unfinished(
        &self,
        finished: Vec<Option<IdeaRecord>>,
        checkpoints: &[Arc<RecordCheckpoint>],
        runner: &Arc<StageRunner<G>>,
    ) -> Vec<IdeaRecord> {
        let mut ideas = Vec::with_capacity(finished.len());
        for (slot, checkpoint) in finished.into_iter().zip(checkpoints) {
            let record = match slot {
                Some(record) => record,
                None => {
                    self.chain(runner)
                        .fail_and_persist(
                            checkpoint.latest(),
                            "idea chain task did not complete".to_string(),
                        )
                        .await
                }
            };
            ideas.push(record);
        }
        ideas
    }

    fn chain(&self, runner: &Arc<StageRunner<G>>) -> IdeaChain<G, R> {
        IdeaChain {
            runner: Arc::clone(runner),
            repository: Arc::clone(&self.repository),
            scorer: Scorer::new(self.params.weights),
        }
    }
}

/// Everything one idea chain needs, owned so it can run on its own task
struct IdeaChain<G: LlmGateway + ?Sized, R: IdeaRepository + ?Sized> {
    runner: Arc<StageRunner<G>>,
    repository: Arc<R>,
    scorer: Scorer,
}

impl<G: LlmGateway + ?Sized, R: IdeaRepository + ?Sized> IdeaChain<G, R> {
    /// Critic → Refiner → Synthesizer, score, settle status, persist.
    async fn run(&self, mut record: IdeaRecord, checkpoint: &RecordCheckpoint) -> IdeaRecord {
        let id = record.id.clone();

        let critic = self
            .runner
            .run(&Critic, &CriticContext::from_record(&record), None, Some(&id))
            .await;
        let critic_degraded = critic.is_degraded();
        record.set_critic_output(critic.output);
        checkpoint.save(&record);

        let refiner = self
            .runner
            .run(&Refiner, &RefinerContext::from_record(&record), None, Some(&id))
            .await;
        let refiner_degraded = refiner.is_degraded();
        record.set_refiner_output(refiner.output);
        checkpoint.save(&record);

        let synthesis = self
            .runner
            .run(&Synthesizer, &SynthesizerContext::from_record(&record), None, Some(&id))
            .await;
        let synthesis_degraded = synthesis.is_degraded();
        record.set_synthesizer_output(synthesis.output);
        checkpoint.save(&record);

        let (scores, _) = self.scorer.score(&self.runner, &record).await;
        record.apply_scores(scores);
        checkpoint.save(&record);

        let settled = if critic_degraded && refiner_degraded && synthesis_degraded {
            record.fail("every stage of the idea chain fell back")
        } else {
            record.complete()
        };
        if let Err(e) = settled {
            warn!(idea_id = %id, error = %e, "Unexpected status while settling idea");
        }

        if let Err(e) = self.repository.save(&record).await {
            error!(idea_id = %id, error = %e, "Failed to persist idea");
            mark_failed(&mut record, format!("persistence failed: {e}"));
        }

        self.runner.progress().on_idea_complete(&record);
        record
    }

    /// Settle a record whose chain died and store it if possible.
    async fn fail_and_persist(&self, mut record: IdeaRecord, reason: String) -> IdeaRecord {
        error!(idea_id = %record.id, reason = %reason, "Idea chain failed");
        mark_failed(&mut record, reason);
        if let Err(e) = self.repository.save(&record).await {
            error!(idea_id = %record.id, error = %e, "Failed to persist failed idea");
        }
        self.runner.progress().on_idea_complete(&record);
        record
    }
}

fn mark_failed(record: &mut IdeaRecord, reason: String) {
    if record.status.is_terminal() {
        return;
    }
    if let Err(e) = record.fail(reason) {
        warn!(idea_id = %record.id, error = %e, "Could not mark idea failed");
    }
}
