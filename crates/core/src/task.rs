//! Task lifecycle wire types.
//!
//! A generation task is created `processing` when a request is
//! accepted, then moves exactly once to `completed` or `failed`.
//! Terminal states are stable: every status read after the transition
//! reports the same state.

use serde::{Deserialize, Serialize};

use crate::chat::ChatResponse;
use crate::types::TaskId;

/// The tri-state task status. Monotonic: once terminal, never revisits
/// `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    /// True for `Completed` and `Failed`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskStatus::Processing)
    }
}

/// Body returned by the enqueue endpoint when a task is accepted for
/// asynchronous execution (`202 Accepted`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedResponse {
    pub task_id: TaskId,
}

/// Body returned by the status endpoint, tagged by `status`.
///
/// ```text
/// {"status": "processing"}
/// {"status": "completed", "data": {...}}
/// {"status": "failed", "error": "..."}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TaskStatusPayload {
    Processing,
    Completed { data: ChatResponse },
    Failed { error: String },
}

impl TaskStatusPayload {
    pub fn status(&self) -> TaskStatus {
        match self {
            TaskStatusPayload::Processing => TaskStatus::Processing,
            TaskStatusPayload::Completed { .. } => TaskStatus::Completed,
            TaskStatusPayload::Failed { .. } => TaskStatus::Failed,
        }
    }
}
