//! Feedback subdomain: user reactions attached to a stored idea.
//!
//! Feedback never changes the idea it refers to. Turning feedback into a
//! revision is the job of an iteration.

use crate::core::error::DomainError;
use crate::idea::IdeaId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier of a feedback item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackId(String);

impl FeedbackId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FeedbackId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    Critique,
    Suggestion,
    Rating,
}

impl FeedbackType {
    pub const ALL: [FeedbackType; 3] = [
        FeedbackType::Critique,
        FeedbackType::Suggestion,
        FeedbackType::Rating,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            FeedbackType::Critique => "critique",
            FeedbackType::Suggestion => "suggestion",
            FeedbackType::Rating => "rating",
        }
    }
}

impl std::fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FeedbackType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critique" => Ok(FeedbackType::Critique),
            "suggestion" => Ok(FeedbackType::Suggestion),
            "rating" => Ok(FeedbackType::Rating),
            _ => Err(DomainError::UnknownFeedbackType(s.to_string())),
        }
    }
}

/// Star rating from 1 to 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidRating(value))
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// The user-editable part of a feedback item
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackContent {
    pub feedback_type: FeedbackType,
    pub content: String,
    pub rating: Option<Rating>,
    pub categories: Vec<String>,
    pub user_id: Option<String>,
}

impl FeedbackContent {
    /// Validate raw input; blank categories are dropped.
    ///
    /// A `rating` feedback must carry a rating.
    pub fn new(
        feedback_type: &str,
        content: impl Into<String>,
        rating: Option<u8>,
        categories: Vec<String>,
        user_id: Option<String>,
    ) -> Result<Self, DomainError> {
        let feedback_type: FeedbackType = feedback_type.parse()?;
        let content = content.into().trim().to_string();
        if content.is_empty() {
            return Err(DomainError::EmptyFeedback);
        }
        let rating = rating.map(Rating::try_from).transpose()?;
        if feedback_type == FeedbackType::Rating && rating.is_none() {
            return Err(DomainError::MissingRating);
        }
        let categories = categories
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        Ok(Self {
            feedback_type,
            content,
            rating,
            categories,
            user_id: user_id.filter(|u| !u.trim().is_empty()),
        })
    }
}

/// One feedback item on one idea (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: FeedbackId,
    pub idea_id: IdeaId,
    pub feedback_type: FeedbackType,
    pub content: String,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Set on the first revision
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Feedback {
    pub fn new(idea_id: IdeaId, content: FeedbackContent) -> Self {
        Self {
            id: FeedbackId::generate(),
            idea_id,
            feedback_type: content.feedback_type,
            content: content.content,
            rating: content.rating,
            categories: content.categories,
            user_id: content.user_id,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Replace the editable fields; id, idea and creation time are kept.
    pub fn revise(&mut self, content: FeedbackContent) {
        self.feedback_type = content.feedback_type;
        self.content = content.content;
        self.rating = content.rating;
        self.categories = content.categories;
        self.user_id = content.user_id;
        self.updated_at = Some(Utc::now());
    }
}
