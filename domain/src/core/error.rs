//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// These are the validation and state errors that make a request
/// structurally impossible to process. Model failures never surface
/// here; stages recover from them with fallback objects.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Topic cannot be empty")]
    EmptyTopic,

    #[error("num_ideas must be between {min} and {max}, got {got}")]
    IdeaCountOutOfRange { got: usize, min: usize, max: usize },

    #[error("Feedback cannot be empty")]
    EmptyFeedback,

    #[error("Unknown iteration type: {0} (expected synthesis, refinement, critique or market_analysis)")]
    UnknownIterationType(String),

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    #[error("Constraints must be a JSON object")]
    InvalidConstraints,

    #[error("Unknown feedback type: {0} (expected critique, suggestion or rating)")]
    UnknownFeedbackType(String),

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("Rating feedback needs a rating")]
    MissingRating,

    #[error("Feedback belongs to idea {0} and cannot be moved")]
    FeedbackIdeaMismatch(String),

    #[error("Invalid score weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }

    /// Check if this error is caused by caller input
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            DomainError::Cancelled | DomainError::InvalidTransition { .. }
        )
    }
}
