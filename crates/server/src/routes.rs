//! Route definitions for the task service.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// All routes exposed by the service.
///
/// ```text
/// GET  /health               -> health
/// POST /api/chat             -> enqueue_chat
/// GET  /api/tasks/{task_id}  -> task_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/chat", post(handlers::enqueue_chat))
        .route("/api/tasks/{task_id}", get(handlers::task_status))
}
