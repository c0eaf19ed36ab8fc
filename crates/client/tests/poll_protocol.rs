//! Protocol tests for submission and polling against a stubbed
//! backend.
//!
//! Each test mounts the exact HTTP exchanges the backend contract
//! allows and asserts both the client-visible result and the number of
//! requests actually made (no polling after a terminal state, no
//! polling at all on the synchronous path).

use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prometheus_client::{poll_until_done, ClientError, GenerationApi, PollConfig, SubmitOutcome};
use prometheus_core::chat::{ChatRequest, OutputText};

/// A fast cadence so tests complete in milliseconds.
fn fast_config(max_attempts: u32) -> PollConfig {
    PollConfig {
        interval: Duration::from_millis(5),
        max_attempts,
        max_elapsed: Duration::from_secs(5),
    }
}

fn sample_request() -> ChatRequest {
    ChatRequest {
        user_input: "Ho scelto di restare.".into(),
        seed_id: "sem_04".into(),
        history: vec![],
        is_first_interaction: true,
        last_assistant_question: None,
        interaction_number: 0,
        is_eco_request: false,
        session_id: "session-1".into(),
        user_id: "user-1".into(),
    }
}

fn completed_body() -> serde_json::Value {
    json!({
        "status": "completed",
        "data": {"output": "hello", "eco": ["eco"], "frase_finale": "?"}
    })
}

// ---------------------------------------------------------------------------
// Test: 202 + task_id resolves to Accepted
// ---------------------------------------------------------------------------

#[tokio::test]
async fn enqueue_202_resolves_to_accepted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"task_id": "t-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let api = GenerationApi::new(server.uri());
    let outcome = api.submit(&sample_request()).await.unwrap();

    assert_matches!(outcome, SubmitOutcome::Accepted { task_id } if task_id == "t-1");
}

// ---------------------------------------------------------------------------
// Test: 200 with a direct result skips polling entirely
// ---------------------------------------------------------------------------

#[tokio::test]
async fn direct_result_never_polls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": "subito",
            "eco": [],
            "frase_finale": "domanda?"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // The status endpoint must never be touched.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "processing"})))
        .expect(0)
        .mount(&server)
        .await;

    let api = GenerationApi::new(server.uri());
    let outcome = api.submit(&sample_request()).await.unwrap();

    assert_matches!(
        outcome,
        SubmitOutcome::Immediate(result) if result.output == OutputText::Single("subito".into())
    );
}

// ---------------------------------------------------------------------------
// Test: a body with neither task_id nor result fails the submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unrecognized_enqueue_body_fails_without_polling() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accepted": true})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "processing"})))
        .expect(0)
        .mount(&server)
        .await;

    let api = GenerationApi::new(server.uri());
    let result = api.submit(&sample_request()).await;

    assert_matches!(result, Err(ClientError::SubmissionFailed(_)));
}

// ---------------------------------------------------------------------------
// Test: non-success enqueue status fails the submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn enqueue_http_error_fails_submission() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let api = GenerationApi::new(server.uri());
    let result = api.submit(&sample_request()).await;

    assert_matches!(
        result,
        Err(ClientError::SubmissionFailed(msg)) if msg.contains("500")
    );
}

// ---------------------------------------------------------------------------
// Test: five processing polls, then completed — result delivered once,
// no further polls
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completes_after_five_processing_polls() {
    let server = MockServer::start().await;

    // First five polls report processing, the sixth completes. Both
    // expectations are verified when the server drops, proving there
    // was no seventh poll.
    Mock::given(method("GET"))
        .and(path("/api/tasks/t-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "processing"})))
        .up_to_n_times(5)
        .expect(5)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/t-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completed_body()))
        .expect(1)
        .mount(&server)
        .await;

    let api = GenerationApi::new(server.uri());
    let cancel = CancellationToken::new();
    let result = poll_until_done(&api, "t-9", &fast_config(30), &cancel)
        .await
        .unwrap();

    assert_eq!(result.output, OutputText::Single("hello".into()));
}

// ---------------------------------------------------------------------------
// Test: failed status surfaces the backend message verbatim
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_status_surfaces_backend_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/t-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "failed",
            "error": "model overloaded"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = GenerationApi::new(server.uri());
    let cancel = CancellationToken::new();
    let result = poll_until_done(&api, "t-2", &fast_config(30), &cancel).await;

    assert_matches!(
        result,
        Err(ClientError::TaskFailed { message }) if message == "model overloaded"
    );
}

// ---------------------------------------------------------------------------
// Test: an endpoint that never terminates exhausts the attempt budget
// ---------------------------------------------------------------------------

#[tokio::test]
async fn everlasting_processing_hits_poll_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/t-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "processing"})))
        .expect(4)
        .mount(&server)
        .await;

    let api = GenerationApi::new(server.uri());
    let cancel = CancellationToken::new();
    let result = poll_until_done(&api, "t-3", &fast_config(4), &cancel).await;

    assert_matches!(
        result,
        Err(ClientError::PollTimeout { attempts: 4, .. })
    );
}

// ---------------------------------------------------------------------------
// Test: 404 on the first poll is TaskLost, with no retry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_poll_404_is_task_lost() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/t-4"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let api = GenerationApi::new(server.uri());
    let cancel = CancellationToken::new();
    let result = poll_until_done(&api, "t-4", &fast_config(30), &cancel).await;

    assert_matches!(result, Err(ClientError::TaskLost(id)) if id == "t-4");
}

// ---------------------------------------------------------------------------
// Test: a malformed status body is a transport error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_status_body_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/t-5"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let api = GenerationApi::new(server.uri());
    let cancel = CancellationToken::new();
    let result = poll_until_done(&api, "t-5", &fast_config(30), &cancel).await;

    assert_matches!(result, Err(ClientError::PollTransport(_)));
}

// ---------------------------------------------------------------------------
// Test: a dead backend is a transport error, not a hang
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let api = GenerationApi::new(uri);
    let result = api.poll_status("t-6").await;

    assert_matches!(result, Err(ClientError::PollTransport(_)));
}
