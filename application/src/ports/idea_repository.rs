//! Idea repository port
//!
//! Storage of idea records keyed by id. Every operation is atomic per
//! record and reads observe prior writes from the same process.

use async_trait::async_trait;
use cofounder_domain::{DomainError, IdeaId, IdeaRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use thiserror::Error;

/// Errors raised by repository adapters
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Filter and page selection for listing ideas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaQuery {
    /// 1-based page number
    pub page: usize,
    pub page_size: usize,
    /// Case-insensitive substring of topic or title
    #[serde(default)]
    pub topic_filter: Option<String>,
    /// Minimum `overall_score`, inclusive
    #[serde(default)]
    pub min_score: Option<f64>,
}

impl IdeaQuery {
    pub const MAX_PAGE_SIZE: usize = 100;
    pub const DEFAULT_PAGE_SIZE: usize = 10;

    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page,
            page_size,
            topic_filter: None,
            min_score: None,
        }
    }

    pub fn with_topic_filter(mut self, filter: impl Into<String>) -> Self {
        self.topic_filter = Some(filter.into());
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
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
        if let Some(min) = self.min_score
            && !(0.0..=1.0).contains(&min)
        {
            return Err(DomainError::InvalidPagination(
                "min_score must be between 0 and 1".into(),
            ));
        }
        Ok(())
    }

    /// Whether `record` passes the filters of this query
    pub fn matches(&self, record: &IdeaRecord) -> bool {
        if let Some(min) = self.min_score
            && record.overall_score < min
        {
            return false;
        }
        match self.topic_filter.as_deref().map(str::trim) {
            Some(filter) if !filter.is_empty() => {
                let needle = filter.to_lowercase();
                record.topic.as_str().to_lowercase().contains(&needle)
                    || record.title.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }

    /// Filter, sort newest first, and cut out the requested page
    pub fn apply(&self, records: impl IntoIterator<Item = IdeaRecord>) -> IdeaPage {
        let mut matching: Vec<IdeaRecord> =
            records.into_iter().filter(|r| self.matches(r)).collect();
        matching.sort_by_key(|r| (Reverse(r.created_at), r.id.clone()));

        let total = matching.len();
        let ideas = matching
            .into_iter()
            .skip(self.page.saturating_sub(1).saturating_mul(self.page_size))
            .take(self.page_size)
            .collect();

        IdeaPage {
            ideas,
            total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

impl Default for IdeaQuery {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_PAGE_SIZE)
    }
}

/// One page of ideas; `total` counts every match, not just this page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaPage {
    pub ideas: Vec<IdeaRecord>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

/// Persistence of idea records
///
/// Implementations live in the infrastructure layer.
#[async_trait]
pub trait IdeaRepository: Send + Sync {
    async fn get(&self, id: &IdeaId) -> Result<Option<IdeaRecord>, RepositoryError>;

    /// Insert or overwrite the record with the same id
    async fn save(&self, record: &IdeaRecord) -> Result<(), RepositoryError>;

    /// Returns `false` when no record had this id
    async fn delete(&self, id: &IdeaId) -> Result<bool, RepositoryError>;

    async fn list(&self, query: &IdeaQuery) -> Result<IdeaPage, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use cofounder_domain::{Constraints, IdeaDraft, MarketAnalysis, Topic};

    fn record(title: &str, topic: &str, overall: f64, age_minutes: i64) -> IdeaRecord {
        let mut r = IdeaRecord::new(
            IdeaDraft::new(title, "desc"),
            Topic::try_new(topic).unwrap(),
            Constraints::new(),
            MarketAnalysis::fallback_for(topic),
        );
        r.overall_score = overall;
        r.created_at -= Duration::minutes(age_minutes);
        r
    }

    #[test]
    fn test_validate() {
        assert!(IdeaQuery::default().validate().is_ok());
        assert!(IdeaQuery::new(0, 10).validate().is_err());
        assert!(IdeaQuery::new(1, 0).validate().is_err());
        assert!(IdeaQuery::new(1, 101).validate().is_err());
        assert!(IdeaQuery::new(1, 100).validate().is_ok());
        assert!(IdeaQuery::default().with_min_score(1.5).validate().is_err());
    }

    #[test]
    fn test_apply_sorts_newest_first() {
        let records = vec![
            record("old", "fitness", 0.5, 30),
            record("new", "fitness", 0.5, 1),
            record("mid", "fitness", 0.5, 10),
        ];
        let page = IdeaQuery::default().apply(records);
        let titles: Vec<_> = page.ideas.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "mid", "old"]);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_apply_filters() {
        let records = vec![
            record("FitBot", "AI fitness", 0.8, 1),
            record("MealMind", "Nutrition", 0.9, 2),
            record("GymSaaS", "Gym software", 0.4, 3),
        ];
        let page = IdeaQuery::default().with_topic_filter("FIT").apply(records.clone());
        assert_eq!(page.total, 1);
        assert_eq!(page.ideas[0].title, "FitBot");

        // title match also counts
        let page = IdeaQuery::default().with_topic_filter("gymsaas").apply(records.clone());
        assert_eq!(page.total, 1);

        let page = IdeaQuery::default().with_min_score(0.8).apply(records);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_apply_paginates() {
        let records: Vec<_> = (0..25)
            .map(|i| record(&format!("idea {i}"), "fitness", 0.5, i))
            .collect();
        let page = IdeaQuery::new(3, 10).apply(records.clone());
        assert_eq!(page.total, 25);
        assert_eq!(page.ideas.len(), 5);
        assert_eq!(page.ideas[0].title, "idea 20");

        let beyond = IdeaQuery::new(9, 10).apply(records);
        assert!(beyond.ideas.is_empty());
        assert_eq!(beyond.total, 25);
    }
}
