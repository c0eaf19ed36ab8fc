//! Shared helpers for the task service integration tests.
//!
//! Provides a scriptable [`StubGenerator`] so tests control generation
//! outcomes without any model API, plus the same router wiring the
//! production binary uses.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use prometheus_core::chat::{ChatRequest, ChatResponse, OutputText};
use prometheus_core::seeds::{Seed, SeedCatalog};
use prometheus_server::config::ServerConfig;
use prometheus_server::generator::{Generator, GeneratorError};
use prometheus_server::registry::TaskRegistry;
use prometheus_server::router::build_app_router;
use prometheus_server::state::AppState;

/// What the stub backend should do with each request.
pub enum StubBehavior {
    /// Answer immediately with this response.
    Reply(ChatResponse),
    /// Wait, then answer (keeps the task `processing` for a while).
    ReplyAfter(Duration, ChatResponse),
    /// Fail with this message.
    Fail(String),
}

/// A generation backend scripted by the test.
pub struct StubGenerator {
    behavior: StubBehavior,
}

impl StubGenerator {
    pub fn new(behavior: StubBehavior) -> Arc<Self> {
        Arc::new(Self { behavior })
    }
}

#[async_trait]
impl Generator for StubGenerator {
    async fn generate(
        &self,
        _request: &ChatRequest,
        _seed: &Seed,
    ) -> Result<ChatResponse, GeneratorError> {
        match &self.behavior {
            StubBehavior::Reply(response) => Ok(response.clone()),
            StubBehavior::ReplyAfter(delay, response) => {
                tokio::time::sleep(*delay).await;
                Ok(response.clone())
            }
            StubBehavior::Fail(message) => Err(GeneratorError::Transport(message.clone())),
        }
    }
}

pub fn sample_response(text: &str) -> ChatResponse {
    ChatResponse {
        output: OutputText::Single(text.into()),
        eco: vec!["eco".into()],
        closing_phrase: "domanda?".into(),
        sigil: None,
    }
}

pub fn test_seed() -> Seed {
    Seed {
        id: "sem_04".into(),
        name: "Il Bivio".into(),
        closing_phrase: "Ogni scelta apre un sentiero.".into(),
        sigil: None,
    }
}

/// Request body for the known test seed.
pub fn sample_request_body() -> serde_json::Value {
    serde_json::json!({
        "user_input": "Ho scelto di restare.",
        "seme_id": "sem_04",
        "session_id": "session-1",
        "user_id": "user-1",
        "interaction_number": 0
    })
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        seed_data_path: PathBuf::from("semi_data.json"),
        gemini_api_key: None,
        gemini_endpoint: "http://localhost:0".to_string(),
    }
}

/// Application state with a fresh registry, the test seed catalog, and
/// the given generator. Returned whole so tests can inspect the
/// registry directly.
pub fn test_state(generator: Arc<dyn Generator>) -> AppState {
    AppState {
        registry: Arc::new(TaskRegistry::new()),
        generator,
        seeds: Arc::new(SeedCatalog::from_seeds(vec![test_seed()])),
    }
}

/// Build the app router exactly the way the binary does.
pub fn build_app(state: AppState) -> Router {
    build_app_router(state, &test_config())
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll the status endpoint until the task leaves `processing`.
pub async fn poll_until_terminal(app: &Router, task_id: &str) -> serde_json::Value {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let response = get(app, &format!("/api/tasks/{task_id}")).await;
            let json = body_json(response).await;
            if json["status"] != "processing" {
                return json;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("Task never reached a terminal state")
}
