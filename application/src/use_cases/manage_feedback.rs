//! Manage Feedback use case
//!
//! Submit, list, fetch, revise and delete feedback on stored ideas.

use crate::ports::feedback_repository::{FeedbackPage, FeedbackQuery, FeedbackRepository};
use crate::ports::idea_repository::{IdeaRepository, RepositoryError};
use cofounder_domain::{DomainError, Feedback, FeedbackContent, FeedbackId, IdeaId};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum FeedbackError {
    #[error("Feedback not found: {0}")]
    NotFound(FeedbackId),

    #[error("Idea not found: {0}")]
    IdeaNotFound(IdeaId),

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Raw feedback as submitted by a client
#[derive(Debug, Clone)]
pub struct FeedbackInput {
    pub idea_id: IdeaId,
    pub feedback_type: String,
    pub content: String,
    pub rating: Option<u8>,
    pub categories: Vec<String>,
    pub user_id: Option<String>,
}

impl FeedbackInput {
    pub fn new(
        idea_id: impl Into<IdeaId>,
        feedback_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            idea_id: idea_id.into(),
            feedback_type: feedback_type.into(),
            content: content.into(),
            rating: None,
            categories: Vec::new(),
            user_id: None,
        }
    }

    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    fn content(self) -> Result<(IdeaId, FeedbackContent), DomainError> {
        let content = FeedbackContent::new(
            &self.feedback_type,
            self.content,
            self.rating,
            self.categories,
            self.user_id,
        )?;
        Ok((self.idea_id, content))
    }
}

pub struct ManageFeedbackUseCase<F, R>
where
    F: FeedbackRepository + ?Sized + 'static,
    R: IdeaRepository + ?Sized + 'static,
{
    feedback: Arc<F>,
    ideas: Arc<R>,
}

impl<F, R> ManageFeedbackUseCase<F, R>
where
    F: FeedbackRepository + ?Sized + 'static,
    R: IdeaRepository + ?Sized + 'static,
{
    pub fn new(feedback: Arc<F>, ideas: Arc<R>) -> Self {
        Self { feedback, ideas }
    }

    /// Store new feedback on an existing idea
    pub async fn submit(&self, input: FeedbackInput) -> Result<Feedback, FeedbackError> {
        let (idea_id, content) = input.content()?;
        if self.ideas.get(&idea_id).await?.is_none() {
            return Err(FeedbackError::IdeaNotFound(idea_id));
        }
        let feedback = Feedback::new(idea_id, content);
        self.feedback.save(&feedback).await?;
        info!(
            feedback_id = %feedback.id,
            idea_id = %feedback.idea_id,
            feedback_type = %feedback.feedback_type,
            "Feedback submitted"
        );
        Ok(feedback)
    }

    pub async fn list(&self, query: &FeedbackQuery) -> Result<FeedbackPage, FeedbackError> {
        query.validate()?;
        let page = self.feedback.list(query).await?;
        debug!(
            idea_id = %query.idea_id,
            returned = page.feedback.len(),
            total = page.total,
            "Listed feedback"
        );
        Ok(page)
    }

    pub async fn get(&self, id: &FeedbackId) -> Result<Feedback, FeedbackError> {
        self.feedback
            .get(id)
            .await?
            .ok_or_else(|| FeedbackError::NotFound(id.clone()))
    }

    /// Replace the editable fields; the item stays on its idea
    pub async fn update(
        &self,
        id: &FeedbackId,
        input: FeedbackInput,
    ) -> Result<Feedback, FeedbackError> {
        let (idea_id, content) = input.content()?;
        let mut feedback = self.get(id).await?;
        if feedback.idea_id != idea_id {
            return Err(DomainError::FeedbackIdeaMismatch(feedback.idea_id.to_string()).into());
        }
        feedback.revise(content);
        self.feedback.save(&feedback).await?;
        info!(feedback_id = %id, "Feedback updated");
        Ok(feedback)
    }

    pub async fn delete(&self, id: &FeedbackId) -> Result<(), FeedbackError> {
        if !self.feedback.delete(id).await? {
            return Err(FeedbackError::NotFound(id.clone()));
        }
        info!(feedback_id = %id, "Deleted feedback");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryFeedbackRepository, MemoryRepository};
    use cofounder_domain::{Constraints, FeedbackType, IdeaDraft, IdeaRecord, MarketAnalysis, Topic};

    fn seeded() -> (
        Arc<MemoryFeedbackRepository>,
        ManageFeedbackUseCase<MemoryFeedbackRepository, MemoryRepository>,
        IdeaId,
    ) {
        let ideas = Arc::new(MemoryRepository::default());
        let record = IdeaRecord::new(
            IdeaDraft::new("FitBot", "AI personal trainer"),
            Topic::try_new("fitness").unwrap(),
            Constraints::new(),
            MarketAnalysis::fallback_for("fitness"),
        );
        let idea_id = record.id.clone();
        ideas.insert(record);
        let feedback = Arc::new(MemoryFeedbackRepository::default());
        let use_case = ManageFeedbackUseCase::new(Arc::clone(&feedback), ideas);
        (feedback, use_case, idea_id)
    }

    // ==================== Submit ====================

    #[tokio::test]
    async fn test_submit_stores_feedback() {
        let (store, use_case, idea_id) = seeded();
        let feedback = use_case
            .submit(
                FeedbackInput::new(idea_id.clone(), "suggestion", "Add a free tier")
                    .with_rating(4)
                    .with_categories(vec!["pricing".into()])
                    .with_user_id("u-1"),
            )
            .await
            .unwrap();
        assert_eq!(feedback.idea_id, idea_id);
        assert_eq!(feedback.feedback_type, FeedbackType::Suggestion);
        assert_eq!(feedback.rating.map(u8::from), Some(4));
        assert_eq!(feedback.user_id.as_deref(), Some("u-1"));
        assert_eq!(store.snapshot(&feedback.id), Some(feedback));
    }

    #[tokio::test]
    async fn test_submit_validation() {
        let (store, use_case, idea_id) = seeded();
        let err = use_case
            .submit(FeedbackInput::new(idea_id.clone(), "critique", " "))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedbackError::Validation(DomainError::EmptyFeedback)));

        let err = use_case
            .submit(FeedbackInput::new(idea_id.clone(), "critique", "ok").with_rating(6))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedbackError::Validation(DomainError::InvalidRating(6))));

        let err = use_case
            .submit(FeedbackInput::new(idea_id, "praise", "ok"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FeedbackError::Validation(DomainError::UnknownFeedbackType(_))
        ));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_submit_to_unknown_idea() {
        let (store, use_case, _) = seeded();
        let err = use_case
            .submit(FeedbackInput::new("missing", "critique", "too vague"))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedbackError::IdeaNotFound(id) if id.as_str() == "missing"));
        assert_eq!(store.len(), 0);
    }

    // ==================== Read ====================

    #[tokio::test]
    async fn test_list_filters_by_type() {
        let (_, use_case, idea_id) = seeded();
        for (ty, text) in [("critique", "a"), ("suggestion", "b"), ("critique", "c")] {
            use_case
                .submit(FeedbackInput::new(idea_id.clone(), ty, text))
                .await
                .unwrap();
        }
        let page = use_case
            .list(&FeedbackQuery::new(idea_id.clone()).with_feedback_type(FeedbackType::Critique))
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert!(page.feedback.iter().all(|f| f.feedback_type == FeedbackType::Critique));

        let err = use_case
            .list(&FeedbackQuery::new(idea_id).with_page(0, 10))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FeedbackError::Validation(DomainError::InvalidPagination(_))
        ));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (_, use_case, _) = seeded();
        assert!(matches!(
            use_case.get(&FeedbackId::from("nope")).await,
            Err(FeedbackError::NotFound(_))
        ));
    }

    // ==================== Update / Delete ====================

    #[tokio::test]
    async fn test_update_revises_in_place() {
        let (store, use_case, idea_id) = seeded();
        let original = use_case
            .submit(FeedbackInput::new(idea_id.clone(), "critique", "too vague"))
            .await
            .unwrap();
        let updated = use_case
            .update(
                &original.id,
                FeedbackInput::new(idea_id.clone(), "rating", "better now").with_rating(5),
            )
            .await
            .unwrap();
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.content, "better now");
        assert!(updated.updated_at.is_some());
        assert_eq!(store.snapshot(&original.id), Some(updated));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_cannot_move_to_other_idea() {
        let (store, use_case, idea_id) = seeded();
        let original = use_case
            .submit(FeedbackInput::new(idea_id, "critique", "too vague"))
            .await
            .unwrap();
        let err = use_case
            .update(&original.id, FeedbackInput::new("other", "critique", "moved"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FeedbackError::Validation(DomainError::FeedbackIdeaMismatch(_))
        ));
        assert_eq!(store.snapshot(&original.id), Some(original));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let (_, use_case, idea_id) = seeded();
        let missing = FeedbackId::from("nope");
        assert!(matches!(
            use_case
                .update(&missing, FeedbackInput::new(idea_id, "critique", "x"))
                .await,
            Err(FeedbackError::NotFound(_))
        ));
        assert!(matches!(
            use_case.delete(&missing).await,
            Err(FeedbackError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_item() {
        let (store, use_case, idea_id) = seeded();
        let feedback = use_case
            .submit(FeedbackInput::new(idea_id, "critique", "too vague"))
            .await
            .unwrap();
        use_case.delete(&feedback.id).await.unwrap();
        assert_eq!(store.len(), 0);
        assert!(matches!(
            use_case.get(&feedback.id).await,
            Err(FeedbackError::NotFound(_))
        ));
    }
}
