//! Read side of the idea store: fetch, list and delete.

use crate::pipeline::IdeaLocks;
use crate::ports::idea_repository::{IdeaPage, IdeaQuery, IdeaRepository, RepositoryError};
use cofounder_domain::{DomainError, IdeaId, IdeaRecord};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ReadIdeasError {
    #[error("Idea not found: {0}")]
    NotFound(IdeaId),

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Thin use case over the repository so callers never touch the port directly
pub struct ReadIdeasUseCase<R: IdeaRepository + ?Sized + 'static> {
    repository: Arc<R>,
    locks: Arc<IdeaLocks>,
}

impl<R: IdeaRepository + ?Sized + 'static> ReadIdeasUseCase<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            locks: Arc::new(IdeaLocks::new()),
        }
    }

    /// Share the lock table used by iterations so a delete waits for them
    pub fn with_locks(mut self, locks: Arc<IdeaLocks>) -> Self {
        self.locks = locks;
        self
    }

    pub async fn get(&self, id: &IdeaId) -> Result<IdeaRecord, ReadIdeasError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| ReadIdeasError::NotFound(id.clone()))
    }

    pub async fn list(&self, query: &IdeaQuery) -> Result<IdeaPage, ReadIdeasError> {
        query.validate()?;
        let page = self.repository.list(query).await?;
        debug!(
            page = page.page,
            returned = page.ideas.len(),
            total = page.total,
            "Listed ideas"
        );
        Ok(page)
    }

    pub async fn delete(&self, id: &IdeaId) -> Result<(), ReadIdeasError> {
        let _guard = self.locks.acquire(id).await;
        if !self.repository.delete(id).await? {
            return Err(ReadIdeasError::NotFound(id.clone()));
        }
        info!(idea_id = %id, "Deleted idea");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineParams;
    use crate::test_support::{MemoryRepository, MockGateway, MockReply};
    use crate::use_cases::iterate_idea::{IterateIdeaInput, IterateIdeaUseCase};
    use cofounder_domain::{AgentRole, Constraints, IdeaDraft, IdeaStatus, MarketAnalysis, Topic};
    use serde_json::json;
    use std::time::Duration;

    fn record(title: &str, topic: &str) -> IdeaRecord {
        IdeaRecord::new(
            IdeaDraft::new(title, "desc"),
            Topic::try_new(topic).unwrap(),
            Constraints::new(),
            MarketAnalysis::fallback_for(topic),
        )
    }

    fn seeded() -> (Arc<MemoryRepository>, ReadIdeasUseCase<MemoryRepository>, IdeaRecord) {
        let repository = Arc::new(MemoryRepository::default());
        let first = record("FitBot", "fitness apps");
        repository.insert(first.clone());
        repository.insert(record("ChefAI", "cooking"));
        let use_case = ReadIdeasUseCase::new(Arc::clone(&repository));
        (repository, use_case, first)
    }

    #[tokio::test]
    async fn test_get_existing_and_missing() {
        let (_, use_case, first) = seeded();
        assert_eq!(use_case.get(&first.id).await.unwrap(), first);
        assert!(matches!(
            use_case.get(&IdeaId::from("nope")).await,
            Err(ReadIdeasError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_filters_by_topic() {
        let (_, use_case, _) = seeded();
        let page = use_case
            .list(&IdeaQuery::new(1, 10).with_topic_filter("FITNESS"))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.ideas[0].title, "FitBot");
    }

    #[tokio::test]
    async fn test_list_rejects_bad_pagination() {
        let (_, use_case, _) = seeded();
        let err = use_case.list(&IdeaQuery::new(0, 10)).await.unwrap_err();
        assert!(matches!(
            err,
            ReadIdeasError::Validation(DomainError::InvalidPagination(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let (repository, use_case, first) = seeded();
        use_case.delete(&first.id).await.unwrap();
        assert_eq!(repository.len(), 1);
        assert!(matches!(
            use_case.delete(&first.id).await,
            Err(ReadIdeasError::NotFound(_))
        ));
        assert!(matches!(
            use_case.get(&first.id).await,
            Err(ReadIdeasError::NotFound(_))
        ));
    }

    // ==================== Concurrency ====================

    #[tokio::test]
    async fn test_delete_waits_for_running_iteration() {
        let repository = Arc::new(MemoryRepository::default());
        let mut stored = record("FitBot", "fitness apps");
        stored.start_generation().unwrap();
        stored.complete().unwrap();
        repository.insert(stored.clone());

        let locks = Arc::new(IdeaLocks::new());
        let gateway = MockGateway::new().with_reply(
            AgentRole::Critic,
            MockReply::Delayed(
                Duration::from_millis(150),
                json!({ "strengths": ["s"], "weaknesses": ["w"] }).to_string(),
            ),
        );
        let iterate = Arc::new(
            IterateIdeaUseCase::new(
                Arc::new(gateway),
                Arc::clone(&repository),
                PipelineParams::default(),
            )
            .with_locks(Arc::clone(&locks)),
        );
        let read = ReadIdeasUseCase::new(Arc::clone(&repository)).with_locks(locks);

        let running = {
            let iterate = Arc::clone(&iterate);
            let id = stored.id.clone();
            tokio::spawn(async move {
                iterate
                    .execute(IterateIdeaInput::new(id, "be harsher", "critique"))
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(30)).await;
        read.delete(&stored.id).await.unwrap();

        let iterated = running.await.unwrap().unwrap();
        assert_eq!(iterated.updated_idea.status, IdeaStatus::Completed);
        assert!(repository.snapshot(&stored.id).is_none());
        assert!(matches!(
            read.get(&stored.id).await,
            Err(ReadIdeasError::NotFound(_))
        ));
    }
}
