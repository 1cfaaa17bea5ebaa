//! Topic value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// The subject a generation run explores (Value Object)
///
/// Always non-empty after trimming; surrounding whitespace is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic {
    content: String,
}

impl Topic {
    /// Try to create a topic, rejecting empty or whitespace-only input
    pub fn try_new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyTopic);
        }
        Ok(Self {
            content: trimmed.to_string(),
        })
    }

    /// Get the topic text
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner text
    pub fn into_inner(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<String> for Topic {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Topic::try_new(value)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.content
    }
}
