//! Mapping of use case errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cofounder_application::{
    FeedbackError, GenerateIdeasError, IterateIdeaError, ReadIdeasError,
};
use tracing::error;

/// Error body is always `{"error": message}`
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    Unavailable(String),
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::Validation(m)
            | ApiError::NotFound(m)
            | ApiError::Conflict(m)
            | ApiError::Unavailable(m)
            | ApiError::Internal(m) => m,
        }
    }
}

/// Construct a JSON error response with the given status code and message.
pub(crate) fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(message) = &self {
            error!(error = %message, "Request failed");
        }
        json_error(self.status(), self.message())
    }
}

impl From<GenerateIdeasError> for ApiError {
    fn from(e: GenerateIdeasError) -> Self {
        match &e {
            GenerateIdeasError::Validation(_) => ApiError::Validation(e.to_string()),
            GenerateIdeasError::Cancelled => ApiError::Unavailable(e.to_string()),
        }
    }
}

impl From<IterateIdeaError> for ApiError {
    fn from(e: IterateIdeaError) -> Self {
        match &e {
            IterateIdeaError::Validation(_) => ApiError::Validation(e.to_string()),
            IterateIdeaError::NotFound(_) => ApiError::NotFound(e.to_string()),
            IterateIdeaError::InvalidState { .. } => ApiError::Conflict(e.to_string()),
            IterateIdeaError::Cancelled => ApiError::Unavailable(e.to_string()),
            IterateIdeaError::IterationFailed { .. } | IterateIdeaError::Repository(_) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl From<ReadIdeasError> for ApiError {
    fn from(e: ReadIdeasError) -> Self {
        match &e {
            ReadIdeasError::NotFound(_) => ApiError::NotFound(e.to_string()),
            ReadIdeasError::Validation(_) => ApiError::Validation(e.to_string()),
            ReadIdeasError::Repository(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<FeedbackError> for ApiError {
    fn from(e: FeedbackError) -> Self {
        match &e {
            FeedbackError::NotFound(_) | FeedbackError::IdeaNotFound(_) => {
                ApiError::NotFound(e.to_string())
            }
            FeedbackError::Validation(_) => ApiError::Validation(e.to_string()),
            FeedbackError::Repository(_) => ApiError::Internal(e.to_string()),
        }
    }
}
