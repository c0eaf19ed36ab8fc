//! Fixed-interval status polling with attempt and wall-clock ceilings.
//!
//! One poll is in flight at a time; the loop sleeps between polls and
//! honors the [`CancellationToken`] at every suspension point, so a
//! superseding submission can tear the loop down immediately.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use prometheus_core::chat::ChatResponse;
use prometheus_core::task::TaskStatusPayload;

use crate::api::GenerationApi;
use crate::error::ClientError;

/// Tunable parameters for the polling loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between consecutive status polls.
    pub interval: Duration,
    /// Ceiling on the number of polls before giving up.
    pub max_attempts: u32,
    /// Ceiling on total wall-clock time spent waiting.
    pub max_elapsed: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            max_attempts: 20,
            max_elapsed: Duration::from_secs(90),
        }
    }
}

/// Poll the status endpoint until the task reaches a terminal state,
/// a ceiling trips, or the token is cancelled.
///
/// Terminations, in the order they can occur:
/// - `completed` → `Ok(data)`;
/// - `failed` → [`ClientError::TaskFailed`] with the backend message;
/// - attempt or wall-clock ceiling → [`ClientError::PollTimeout`] (the
///   task may still finish server-side; the client just stops waiting);
/// - `404` → [`ClientError::TaskLost`], no further polls;
/// - transport failure → [`ClientError::PollTransport`], no further
///   polls;
/// - token cancelled → [`ClientError::Cancelled`].
///
/// Polls are strictly sequential and the result is delivered at most
/// once: the first terminal observation wins.
pub async fn poll_until_done(
    api: &GenerationApi,
    task_id: &str,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<ChatResponse, ClientError> {
    let start = tokio::time::Instant::now();
    let mut attempts = 0u32;

    loop {
        if attempts >= config.max_attempts || start.elapsed() >= config.max_elapsed {
            tracing::warn!(
                task_id = %task_id,
                attempts,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Gave up waiting for generation task",
            );
            return Err(ClientError::PollTimeout {
                attempts,
                elapsed: start.elapsed(),
            });
        }

        // Wait out the interval, unless superseded first.
        tokio::select! {
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            _ = tokio::time::sleep(config.interval) => {}
        }

        attempts += 1;

        let payload = tokio::select! {
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            result = api.poll_status(task_id) => result?,
        };

        match payload {
            TaskStatusPayload::Processing => {
                tracing::debug!(task_id = %task_id, attempts, "Task still processing");
            }
            TaskStatusPayload::Completed { data } => {
                tracing::info!(task_id = %task_id, attempts, "Task completed");
                return Ok(data);
            }
            TaskStatusPayload::Failed { error } => {
                tracing::warn!(task_id = %task_id, error = %error, "Task failed");
                return Err(ClientError::TaskFailed { message: error });
            }
        }
    }
}
