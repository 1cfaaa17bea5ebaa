//! HTTP JSON API server.
//!
//! Endpoints:
//! - GET    /                     - Service banner
//! - GET    /health               - Liveness and version
//! - POST   /api/v1/ideas/generate
//! - POST   /api/v1/ideas/iterate
//! - GET    /api/v1/ideas         - Paged listing (`page`, `page_size`, `topic_filter`, `min_score`)
//! - GET    /api/v1/ideas/{id}
//! - DELETE /api/v1/ideas/{id}
//! - POST   /api/v1/feedback
//! - GET    /api/v1/feedback/idea/{idea_id} - Paged (`page`, `page_size`, `feedback_type`)
//! - GET    /api/v1/feedback/{id}
//! - PUT    /api/v1/feedback/{id}
//! - DELETE /api/v1/feedback/{id}
//!
//! Errors are `{"error": message}`: 422 validation, 404 not found,
//! 409 invalid state, 503 shutting down, 500 otherwise.

mod dto;
mod error;
mod handlers;
mod state;

pub use error::ApiError;
pub use state::AppState;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use self::handlers::{
    handle_delete, handle_delete_feedback, handle_generate, handle_get, handle_get_feedback,
    handle_health, handle_iterate, handle_list, handle_list_feedback, handle_not_found,
    handle_root, handle_submit_feedback, handle_update_feedback,
};

/// Maximum request body size: 1 MB.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// CORS for the configured origins; `"*"` allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

/// Build the application router
pub fn router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/api/v1/ideas/generate", post(handle_generate))
        .route("/api/v1/ideas/iterate", post(handle_iterate))
        .route("/api/v1/ideas", get(handle_list))
        .route("/api/v1/ideas/{id}", get(handle_get).delete(handle_delete))
        .route("/api/v1/feedback", post(handle_submit_feedback))
        .route("/api/v1/feedback/idea/{idea_id}", get(handle_list_feedback))
        .route(
            "/api/v1/feedback/{id}",
            get(handle_get_feedback)
                .put(handle_update_feedback)
                .delete(handle_delete_feedback),
        )
        .fallback(handle_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}

/// Serve `router` on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
