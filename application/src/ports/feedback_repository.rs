//! Feedback repository port
//!
//! Storage of feedback items keyed by id, listed per idea.

use crate::ports::idea_repository::RepositoryError;
use async_trait::async_trait;
use cofounder_domain::{DomainError, Feedback, FeedbackId, FeedbackType, IdeaId};
use serde::Serialize;
use std::cmp::Reverse;

/// Page selection for the feedback of one idea
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackQuery {
    pub idea_id: IdeaId,
    /// 1-based page number
    pub page: usize,
    pub page_size: usize,
    pub feedback_type: Option<FeedbackType>,
}

impl FeedbackQuery {
    pub const MAX_PAGE_SIZE: usize = 100;
    pub const DEFAULT_PAGE_SIZE: usize = 10;

    pub fn new(idea_id: IdeaId) -> Self {
        Self {
            idea_id,
            page: 1,
            page_size: Self::DEFAULT_PAGE_SIZE,
            feedback_type: None,
        }
    }

    pub fn with_page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    pub fn with_feedback_type(mut self, feedback_type: FeedbackType) -> Self {
        self.feedback_type = Some(feedback_type);
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.page == 0 {
            return Err(DomainError::InvalidPagination("page starts at 1".into()));
        }
        if self.page_size == 0 || self.page_size > Self::MAX_PAGE_SIZE {
            return Err(DomainError::InvalidPagination(format!(
                "page_size must be between 1 and {}",
                Self::MAX_PAGE_SIZE
            )));
        }
        Ok(())
    }

    pub fn matches(&self, feedback: &Feedback) -> bool {
        feedback.idea_id == self.idea_id
            && self
                .feedback_type
                .is_none_or(|ty| feedback.feedback_type == ty)
    }

    /// Filter, sort newest first, and cut out the requested page
    pub fn apply(&self, items: impl IntoIterator<Item = Feedback>) -> FeedbackPage {
        let mut matching: Vec<Feedback> = items.into_iter().filter(|f| self.matches(f)).collect();
        matching.sort_by_key(|f| (Reverse(f.created_at), f.id.clone()));

        let total = matching.len();
        let feedback = matching
            .into_iter()
            .skip(self.page.saturating_sub(1).saturating_mul(self.page_size))
            .take(self.page_size)
            .collect();

        FeedbackPage {
            feedback,
            total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// One page of feedback; `total` counts every match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackPage {
    pub feedback: Vec<Feedback>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

/// Persistence of feedback items
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn get(&self, id: &FeedbackId) -> Result<Option<Feedback>, RepositoryError>;

    /// Insert or overwrite the item with the same id
    async fn save(&self, feedback: &Feedback) -> Result<(), RepositoryError>;

    /// Returns `false` when no item had this id
    async fn delete(&self, id: &FeedbackId) -> Result<bool, RepositoryError>;

    async fn list(&self, query: &FeedbackQuery) -> Result<FeedbackPage, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use cofounder_domain::FeedbackContent;

    fn feedback(idea: &str, ty: &str, age_minutes: i64) -> Feedback {
        let content = FeedbackContent::new(ty, format!("{ty} {age_minutes}"), Some(3), vec![], None)
            .unwrap();
        let mut f = Feedback::new(IdeaId::from(idea), content);
        f.created_at -= Duration::minutes(age_minutes);
        f
    }

    #[test]
    fn test_validate() {
        let query = FeedbackQuery::new(IdeaId::from("a"));
        assert!(query.validate().is_ok());
        assert!(query.clone().with_page(0, 10).validate().is_err());
        assert!(query.clone().with_page(1, 0).validate().is_err());
        assert!(query.with_page(1, 101).validate().is_err());
    }

    #[test]
    fn test_apply_scopes_to_idea_and_type() {
        let items = vec![
            feedback("a", "critique", 3),
            feedback("a", "suggestion", 2),
            feedback("a", "critique", 1),
            feedback("b", "critique", 0),
        ];
        let page = FeedbackQuery::new(IdeaId::from("a")).apply(items.clone());
        assert_eq!(page.total, 3);
        let contents: Vec<_> = page.feedback.iter().map(|f| f.content.as_str()).collect();
        assert_eq!(contents, vec!["critique 1", "suggestion 2", "critique 3"]);

        let page = FeedbackQuery::new(IdeaId::from("a"))
            .with_feedback_type(FeedbackType::Critique)
            .apply(items);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_apply_paginates() {
        let items: Vec<_> = (0..7).map(|i| feedback("a", "critique", i)).collect();
        let page = FeedbackQuery::new(IdeaId::from("a")).with_page(2, 5).apply(items);
        assert_eq!(page.total, 7);
        assert_eq!(page.feedback.len(), 2);
        assert_eq!(page.feedback[0].content, "critique 5");
    }
}
