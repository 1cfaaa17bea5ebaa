//! Request bodies and query strings of the JSON API.

use cofounder_application::{
    FeedbackInput, FeedbackQuery, GenerateIdeasInput, IdeaQuery, IterateIdeaInput,
};
use cofounder_domain::{Constraints, DomainError, FeedbackType, IdeaId};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

fn constraints_from(value: Option<Value>) -> Result<Constraints, DomainError> {
    value.map_or_else(|| Ok(Constraints::new()), Constraints::from_value)
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub topic: String,
    #[serde(default)]
    pub constraints: Option<Value>,
    #[serde(default)]
    pub num_ideas: Option<usize>,
    #[serde(default)]
    pub model_settings: HashMap<String, String>,
}

impl GenerateRequest {
    pub fn into_input(self) -> Result<GenerateIdeasInput, DomainError> {
        Ok(GenerateIdeasInput {
            topic: self.topic,
            constraints: constraints_from(self.constraints)?,
            num_ideas: self.num_ideas,
            model_settings: self.model_settings,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct IterateRequest {
    pub idea_id: String,
    pub feedback: String,
    pub iteration_type: String,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default)]
    pub constraints: Option<Value>,
    #[serde(default)]
    pub model_settings: HashMap<String, String>,
}

impl IterateRequest {
    pub fn into_input(self) -> Result<IterateIdeaInput, DomainError> {
        let constraints = match self.constraints {
            Some(value) => Some(Constraints::from_value(value)?),
            None => None,
        };
        Ok(IterateIdeaInput {
            idea_id: IdeaId::new(self.idea_id),
            feedback: self.feedback,
            iteration_type: self.iteration_type,
            focus_areas: self.focus_areas,
            constraints,
            model_settings: self.model_settings,
        })
    }
}

/// `GET /api/v1/ideas` query string
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    pub topic_filter: Option<String>,
    pub min_score: Option<f64>,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    IdeaQuery::DEFAULT_PAGE_SIZE
}

impl From<ListParams> for IdeaQuery {
    fn from(params: ListParams) -> Self {
        IdeaQuery {
            page: params.page,
            page_size: params.page_size,
            topic_filter: params.topic_filter,
            min_score: params.min_score,
        }
    }
}

/// Body of `POST /api/v1/feedback` and `PUT /api/v1/feedback/{id}`
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub idea_id: String,
    pub feedback_type: String,
    pub content: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl From<FeedbackRequest> for FeedbackInput {
    fn from(request: FeedbackRequest) -> Self {
        FeedbackInput {
            idea_id: IdeaId::new(request.idea_id),
            feedback_type: request.feedback_type,
            content: request.content,
            rating: request.rating,
            categories: request.categories,
            user_id: request.user_id,
        }
    }
}

/// `GET /api/v1/feedback/idea/{idea_id}` query string
#[derive(Debug, Deserialize)]
pub struct FeedbackListParams {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    pub feedback_type: Option<String>,
}

impl FeedbackListParams {
    pub fn into_query(self, idea_id: IdeaId) -> Result<FeedbackQuery, DomainError> {
        let mut query = FeedbackQuery::new(idea_id).with_page(self.page, self.page_size);
        if let Some(ty) = self.feedback_type.as_deref().filter(|t| !t.trim().is_empty()) {
            query = query.with_feedback_type(ty.parse::<FeedbackType>()?);
        }
        Ok(query)
    }
}
