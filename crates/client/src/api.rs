//! REST client for the generation backend's HTTP endpoints.
//!
//! Wraps the enqueue and status-lookup endpoints using [`reqwest`].
//! The enqueue response is resolved exactly once into a
//! [`SubmitOutcome`]: older backend versions answer synchronously with
//! the finished result, newer ones accept the job and return a task
//! id. Both remain supported.

use serde::Deserialize;

use prometheus_core::chat::{ChatRequest, ChatResponse};
use prometheus_core::task::{AcceptedResponse, TaskStatusPayload};
use prometheus_core::types::TaskId;

use crate::error::ClientError;

/// HTTP client for a single generation backend.
pub struct GenerationApi {
    client: reqwest::Client,
    base_url: String,
}

/// What the enqueue endpoint decided to do with a request.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Legacy synchronous path: the result arrived in the enqueue
    /// response itself. No polling needed.
    Immediate(ChatResponse),

    /// The job was accepted for asynchronous execution; poll the
    /// status endpoint with this id.
    Accepted { task_id: TaskId },
}

/// The two legitimate enqueue response bodies.
///
/// Tried in order: a bare `{task_id}` first, then a full result. A
/// body matching neither is a submission failure.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EnqueueBody {
    Accepted(AcceptedResponse),
    Immediate(ChatResponse),
}

impl GenerationApi {
    /// Create a new API client for a backend base URL,
    /// e.g. `http://localhost:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    /// Backend base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a generation request to the enqueue endpoint.
    ///
    /// Sends `POST /api/chat`. Returns [`SubmitOutcome::Accepted`] for
    /// a `202` with a task id, [`SubmitOutcome::Immediate`] for a `200`
    /// carrying the result directly. Anything else — network failure,
    /// non-success status, unrecognized body — is
    /// [`ClientError::SubmissionFailed`]. Not retried here; retrying is
    /// the caller's call.
    pub async fn submit(&self, request: &ChatRequest) -> Result<SubmitOutcome, ClientError> {
        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::SubmissionFailed(format!("enqueue request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::SubmissionFailed(format!(
                "enqueue returned {status}: {body}"
            )));
        }

        let body: EnqueueBody = response.json().await.map_err(|e| {
            ClientError::SubmissionFailed(format!(
                "enqueue response carried neither a task id nor a result: {e}"
            ))
        })?;

        match body {
            EnqueueBody::Accepted(accepted) => {
                tracing::info!(task_id = %accepted.task_id, "Generation task accepted");
                Ok(SubmitOutcome::Accepted {
                    task_id: accepted.task_id,
                })
            }
            EnqueueBody::Immediate(result) => {
                tracing::info!("Generation answered synchronously");
                Ok(SubmitOutcome::Immediate(result))
            }
        }
    }

    /// Look up the status of an accepted task.
    ///
    /// Sends `GET /api/tasks/{task_id}`. A `404` means the backend no
    /// longer knows the task — never created or already expired, both
    /// reported as [`ClientError::TaskLost`].
    pub async fn poll_status(&self, task_id: &str) -> Result<TaskStatusPayload, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/tasks/{}", self.base_url, task_id))
            .send()
            .await
            .map_err(|e| ClientError::PollTransport(format!("status request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::TaskLost(task_id.to_string()));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::PollTransport(format!(
                "status endpoint returned {status}: {body}"
            )));
        }

        response
            .json::<TaskStatusPayload>()
            .await
            .map_err(|e| ClientError::PollTransport(format!("malformed status body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus_core::chat::OutputText;

    #[test]
    fn enqueue_body_prefers_task_id() {
        let body: EnqueueBody =
            serde_json::from_str(r#"{"task_id":"abc-123"}"#).unwrap();
        match body {
            EnqueueBody::Accepted(accepted) => assert_eq!(accepted.task_id, "abc-123"),
            other => panic!("Expected Accepted, got {other:?}"),
        }
    }

    #[test]
    fn enqueue_body_parses_direct_result() {
        let body: EnqueueBody = serde_json::from_str(
            r#"{"output":"testo","eco":["eco"],"frase_finale":"domanda?"}"#,
        )
        .unwrap();
        match body {
            EnqueueBody::Immediate(result) => {
                assert_eq!(result.output, OutputText::Single("testo".into()));
            }
            other => panic!("Expected Immediate, got {other:?}"),
        }
    }

    #[test]
    fn enqueue_body_rejects_neither_shape() {
        assert!(serde_json::from_str::<EnqueueBody>(r#"{"accepted":true}"#).is_err());
        assert!(serde_json::from_str::<EnqueueBody>("{}").is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = GenerationApi::new("http://localhost:8000/");
        assert_eq!(api.base_url(), "http://localhost:8000");
    }
}
