use cofounder_application::{
    FeedbackRepository, GenerateIdeasUseCase, IdeaLocks, IdeaRepository, InvocationLogger,
    IterateIdeaUseCase, LlmGateway, ManageFeedbackUseCase, PipelineParams, ReadIdeasUseCase,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared state behind every handler
pub struct AppState {
    pub(crate) generate: GenerateIdeasUseCase<dyn LlmGateway, dyn IdeaRepository>,
    pub(crate) iterate: IterateIdeaUseCase<dyn LlmGateway, dyn IdeaRepository>,
    pub(crate) read: ReadIdeasUseCase<dyn IdeaRepository>,
    pub(crate) feedback: ManageFeedbackUseCase<dyn FeedbackRepository, dyn IdeaRepository>,
}

impl AppState {
    /// Wire the use cases over one gateway and the two stores.
    ///
    /// Iterations and deletes share one lock table. `shutdown` cancels
    /// in-flight pipelines when the server stops.
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        repository: Arc<dyn IdeaRepository>,
        feedback_repository: Arc<dyn FeedbackRepository>,
        params: PipelineParams,
        logger: Arc<dyn InvocationLogger>,
        shutdown: CancellationToken,
    ) -> Self {
        let generate = GenerateIdeasUseCase::new(
            Arc::clone(&gateway),
            Arc::clone(&repository),
            params.clone(),
        )
        .with_invocation_logger(Arc::clone(&logger))
        .with_cancellation(shutdown.clone());

        let locks = Arc::new(IdeaLocks::new());
        let iterate = IterateIdeaUseCase::new(gateway, Arc::clone(&repository), params)
            .with_locks(Arc::clone(&locks))
            .with_invocation_logger(logger)
            .with_cancellation(shutdown);

        Self {
            generate,
            iterate,
            read: ReadIdeasUseCase::new(Arc::clone(&repository)).with_locks(locks),
            feedback: ManageFeedbackUseCase::new(feedback_repository, repository),
        }
    }
}
