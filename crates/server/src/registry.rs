//! In-memory generation task registry.
//!
//! Tasks live for the lifetime of the process: created `processing`
//! when a request is accepted, transitioned exactly once to a terminal
//! state by the worker, never deleted. Clients observe the transition
//! through [`TaskRegistry::snapshot`]; a terminal state is stable
//! across any number of reads.

use std::collections::HashMap;

use tokio::sync::RwLock;

use prometheus_core::chat::ChatResponse;
use prometheus_core::task::TaskStatusPayload;
use prometheus_core::types::{new_task_id, TaskId, Timestamp};

/// One tracked task.
struct TaskEntry {
    payload: TaskStatusPayload,
    #[allow(dead_code)]
    created_at: Timestamp,
    completed_at: Option<Timestamp>,
}

/// Registry of all generation tasks known to this process.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: RwLock<HashMap<TaskId, TaskEntry>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new task in the `processing` state and return its id.
    pub async fn create(&self) -> TaskId {
        let id = new_task_id();
        let entry = TaskEntry {
            payload: TaskStatusPayload::Processing,
            created_at: chrono::Utc::now(),
            completed_at: None,
        };
        self.tasks.write().await.insert(id.clone(), entry);
        tracing::debug!(task_id = %id, "Task created");
        id
    }

    /// Record a successful result. Ignored if the task is already
    /// terminal or unknown.
    pub async fn complete(&self, id: &str, data: ChatResponse) {
        self.transition(id, TaskStatusPayload::Completed { data })
            .await;
    }

    /// Record a failure. Ignored if the task is already terminal or
    /// unknown.
    pub async fn fail(&self, id: &str, error: String) {
        self.transition(id, TaskStatusPayload::Failed { error }).await;
    }

    /// Current status of a task, or `None` if the id is unknown.
    pub async fn snapshot(&self, id: &str) -> Option<TaskStatusPayload> {
        self.tasks.read().await.get(id).map(|e| e.payload.clone())
    }

    /// Number of tracked tasks.
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }

    /// Apply a terminal transition. The first terminal state wins;
    /// later attempts are logged and dropped.
    async fn transition(&self, id: &str, next: TaskStatusPayload) {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(id) {
            Some(entry) if entry.payload.status().is_terminal() => {
                tracing::warn!(
                    task_id = %id,
                    current = ?entry.payload.status(),
                    attempted = ?next.status(),
                    "Ignoring transition on terminal task",
                );
            }
            Some(entry) => {
                tracing::info!(task_id = %id, status = ?next.status(), "Task transitioned");
                entry.payload = next;
                entry.completed_at = Some(chrono::Utc::now());
            }
            None => {
                tracing::warn!(task_id = %id, "Transition for unknown task");
            }
        }
    }
}
