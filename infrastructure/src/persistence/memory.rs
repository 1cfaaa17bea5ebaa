//! Process-local idea and feedback stores.

use async_trait::async_trait;
use cofounder_application::ports::feedback_repository::{
    FeedbackPage, FeedbackQuery, FeedbackRepository,
};
use cofounder_application::ports::idea_repository::{
    IdeaPage, IdeaQuery, IdeaRepository, RepositoryError,
};
use cofounder_domain::{Feedback, FeedbackId, IdeaId, IdeaRecord};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Not durable: records live as long as the value.
#[derive(Default)]
pub struct InMemoryIdeaRepository {
    records: RwLock<HashMap<IdeaId, IdeaRecord>>,
}

impl InMemoryIdeaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl IdeaRepository for InMemoryIdeaRepository {
    async fn get(&self, id: &IdeaId) -> Result<Option<IdeaRecord>, RepositoryError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn save(&self, record: &IdeaRecord) -> Result<(), RepositoryError> {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, id: &IdeaId) -> Result<bool, RepositoryError> {
        Ok(self.records.write().await.remove(id).is_some())
    }

    async fn list(&self, query: &IdeaQuery) -> Result<IdeaPage, RepositoryError> {
        let records = self.records.read().await;
        Ok(query.apply(records.values().cloned()))
    }
}

/// Not durable: feedback lives as long as the value.
#[derive(Default)]
pub struct InMemoryFeedbackRepository {
    items: RwLock<HashMap<FeedbackId, Feedback>>,
}

impl InMemoryFeedbackRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn get(&self, id: &FeedbackId) -> Result<Option<Feedback>, RepositoryError> {
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn save(&self, feedback: &Feedback) -> Result<(), RepositoryError> {
        self.items
            .write()
            .await
            .insert(feedback.id.clone(), feedback.clone());
        Ok(())
    }

    async fn delete(&self, id: &FeedbackId) -> Result<bool, RepositoryError> {
        Ok(self.items.write().await.remove(id).is_some())
    }

    async fn list(&self, query: &FeedbackQuery) -> Result<FeedbackPage, RepositoryError> {
        let items = self.items.read().await;
        Ok(query.apply(items.values().cloned()))
    }
}
