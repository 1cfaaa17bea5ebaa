//! Route handlers of the JSON API.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cofounder_application::{
    FeedbackPage, GenerateIdeasOutput, IdeaPage, IdeaQuery, IterateIdeaOutput,
};
use cofounder_domain::{Feedback, FeedbackId, IdeaId, IdeaRecord};
use tracing::info;

use super::dto::{
    FeedbackListParams, FeedbackRequest, GenerateRequest, IterateRequest, ListParams,
};
use super::error::{ApiError, json_error};
use super::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /
pub(crate) async fn handle_root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "AI Startup Co-Founder API",
        "version": VERSION,
        "endpoints": [
            "POST /api/v1/ideas/generate",
            "POST /api/v1/ideas/iterate",
            "GET /api/v1/ideas",
            "GET /api/v1/ideas/{id}",
            "DELETE /api/v1/ideas/{id}",
            "POST /api/v1/feedback",
            "GET /api/v1/feedback/idea/{idea_id}",
            "GET /api/v1/feedback/{id}",
            "PUT /api/v1/feedback/{id}",
            "DELETE /api/v1/feedback/{id}",
        ],
    }))
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy", "version": VERSION }))
}

/// POST /api/v1/ideas/generate
pub(crate) async fn handle_generate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateIdeasOutput>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    let input = request
        .into_input()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    info!(topic = %input.topic, num_ideas = ?input.num_ideas, "Generate request");
    let output = state.generate.execute(input).await?;
    Ok(Json(output))
}

/// POST /api/v1/ideas/iterate
pub(crate) async fn handle_iterate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IterateRequest>, JsonRejection>,
) -> Result<Json<IterateIdeaOutput>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    let input = request
        .into_input()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    info!(idea_id = %input.idea_id, iteration_type = %input.iteration_type, "Iterate request");
    let output = state.iterate.execute(input).await?;
    Ok(Json(output))
}

/// GET /api/v1/ideas
pub(crate) async fn handle_list(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<IdeaPage>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::Validation(e.body_text()))?;
    let page = state.read.list(&IdeaQuery::from(params)).await?;
    Ok(Json(page))
}

/// GET /api/v1/ideas/{id}
pub(crate) async fn handle_get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<IdeaRecord>, ApiError> {
    let record = state.read.get(&IdeaId::new(id)).await?;
    Ok(Json(record))
}

/// DELETE /api/v1/ideas/{id}
pub(crate) async fn handle_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = IdeaId::new(id);
    state.read.delete(&id).await?;
    Ok(Json(serde_json::json!({
        "message": format!("Idea {} deleted successfully", id)
    })))
}

/// POST /api/v1/feedback
pub(crate) async fn handle_submit_feedback(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    let feedback = state.feedback.submit(request.into()).await?;
    Ok(Json(serde_json::json!({
        "feedback": feedback,
        "message": "Feedback submitted successfully"
    })))
}

/// GET /api/v1/feedback/idea/{idea_id}
pub(crate) async fn handle_list_feedback(
    State(state): State<Arc<AppState>>,
    Path(idea_id): Path<String>,
    params: Result<Query<FeedbackListParams>, QueryRejection>,
) -> Result<Json<FeedbackPage>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::Validation(e.body_text()))?;
    let query = params
        .into_query(IdeaId::new(idea_id))
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    let page = state.feedback.list(&query).await?;
    Ok(Json(page))
}

/// GET /api/v1/feedback/{id}
pub(crate) async fn handle_get_feedback(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Feedback>, ApiError> {
    let feedback = state.feedback.get(&FeedbackId::from(id.as_str())).await?;
    Ok(Json(feedback))
}

/// PUT /api/v1/feedback/{id}
pub(crate) async fn handle_update_feedback(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    let feedback = state
        .feedback
        .update(&FeedbackId::from(id.as_str()), request.into())
        .await?;
    Ok(Json(serde_json::json!({
        "feedback": feedback,
        "message": "Feedback updated successfully"
    })))
}

/// DELETE /api/v1/feedback/{id}
pub(crate) async fn handle_delete_feedback(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.feedback.delete(&FeedbackId::from(id.as_str())).await?;
    Ok(Json(serde_json::json!({ "message": "Feedback deleted successfully" })))
}
