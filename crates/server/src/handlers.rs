//! Handlers for the generation task endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use prometheus_core::chat::ChatRequest;
use prometheus_core::error::CoreError;
use prometheus_core::seeds::Seed;
use prometheus_core::task::{AcceptedResponse, TaskStatusPayload};
use prometheus_core::types::TaskId;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Query parameters for the enqueue endpoint.
#[derive(Debug, Deserialize)]
pub struct EnqueueParams {
    /// Run the generation inline and answer with the result body — the
    /// legacy synchronous contract older clients still speak.
    #[serde(default)]
    pub sync: bool,
}

/// POST /api/chat
///
/// Validate the request, create a `processing` task, and hand the work
/// to a background worker. Returns `202` with the task id; with
/// `?sync=true`, runs inline and returns `200` with the result.
pub async fn enqueue_chat(
    State(state): State<AppState>,
    Query(params): Query<EnqueueParams>,
    Json(request): Json<ChatRequest>,
) -> AppResult<Response> {
    let seed = state
        .seeds
        .get(&request.seed_id)
        .cloned()
        .ok_or_else(|| AppError::BadRequest(format!("Seed with id '{}' not found", request.seed_id)))?;

    if params.sync {
        let result = state
            .generator
            .generate(&request, &seed)
            .await
            .map_err(|e| AppError::Generation(e.to_string()))?;
        return Ok(Json(result).into_response());
    }

    let task_id = state.registry.create().await;
    tracing::info!(
        task_id = %task_id,
        seed_id = %request.seed_id,
        session_id = %request.session_id,
        interaction_number = request.interaction_number,
        "Generation task accepted",
    );

    spawn_generation(state, task_id.clone(), request, seed);

    Ok((StatusCode::ACCEPTED, Json(AcceptedResponse { task_id })).into_response())
}

/// Run one generation in the background and record its outcome.
///
/// Fire-and-forget: once accepted, the task runs to its terminal state
/// regardless of whether any client is still polling.
fn spawn_generation(state: AppState, task_id: TaskId, request: ChatRequest, seed: Seed) {
    tokio::spawn(async move {
        match state.generator.generate(&request, &seed).await {
            Ok(result) => state.registry.complete(&task_id, result).await,
            Err(e) => {
                tracing::warn!(task_id = %task_id, error = %e, "Generation failed");
                state.registry.fail(&task_id, e.to_string()).await;
            }
        }
    });
}

/// GET /api/tasks/{task_id}
///
/// Current status of a task. `404` for ids this process has never
/// issued (or has lost across a restart).
pub async fn task_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> AppResult<Json<TaskStatusPayload>> {
    let payload = state
        .registry
        .snapshot(&task_id)
        .await
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        }))?;

    Ok(Json(payload))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
