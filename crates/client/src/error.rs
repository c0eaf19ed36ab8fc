use std::time::Duration;

use prometheus_core::types::TaskId;

/// Errors surfaced by the submission/polling client.
///
/// Every variant is terminal for the current task: nothing is retried
/// behind the caller's back. Retrying means a fresh `submit`.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The enqueue call failed: network error, non-success status, or a
    /// response carrying neither a task id nor a result.
    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    /// The backend reported the task as failed. `message` is the
    /// backend-provided error, verbatim.
    #[error("Generation failed: {message}")]
    TaskFailed { message: String },

    /// The status endpoint returned 404: the task is unknown or has
    /// expired. Both cases are indistinguishable to the client.
    #[error("Task {0} is unknown to the backend")]
    TaskLost(TaskId),

    /// A status poll failed at the network/HTTP layer.
    #[error("Status poll failed: {0}")]
    PollTransport(String),

    /// The client-side waiting budget ran out while the task was still
    /// processing. Says nothing about the task's fate server-side.
    #[error("Generation did not finish within {attempts} polls ({elapsed:?})")]
    PollTimeout { attempts: u32, elapsed: Duration },

    /// The task was superseded by a newer submission or cancelled by
    /// the caller before reaching a terminal state.
    #[error("Cancelled before completion")]
    Cancelled,
}
