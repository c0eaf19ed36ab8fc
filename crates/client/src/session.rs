//! Caller-facing driver for one generation interaction at a time.
//!
//! [`GenerationSession`] owns the "last request wins" contract: each
//! [`submit`](GenerationSession::submit) cancels the previous in-flight
//! task before starting a fresh one, so a stale poll can never deliver
//! its result on top of a newer interaction. Each submission returns a
//! [`TaskHandle`] exposing the task's phase as a watch channel and its
//! final outcome exactly once.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use prometheus_core::chat::{ChatRequest, ChatResponse};

use crate::api::{GenerationApi, SubmitOutcome};
use crate::error::ClientError;
use crate::poll::{poll_until_done, PollConfig};

/// Caller-visible lifecycle of one submission.
///
/// Moves strictly forward: `Idle → Submitting → Polling → terminal`,
/// with `Polling` skipped when the backend answers synchronously.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPhase {
    Idle,
    Submitting,
    Polling,
    Completed,
    Failed,
    TimedOut,
    Cancelled,
}

impl TaskPhase {
    /// True once no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskPhase::Completed | TaskPhase::Failed | TaskPhase::TimedOut | TaskPhase::Cancelled
        )
    }
}

/// Drives submissions against one backend, one task in flight at a
/// time.
pub struct GenerationSession {
    api: Arc<GenerationApi>,
    config: PollConfig,
    /// Token of the current in-flight task, cancelled when superseded.
    current: Mutex<Option<CancellationToken>>,
}

/// Handle to one in-flight (or finished) submission.
pub struct TaskHandle {
    phase: watch::Receiver<TaskPhase>,
    cancel: CancellationToken,
    join: tokio::task::JoinHandle<Result<ChatResponse, ClientError>>,
}

impl GenerationSession {
    /// Create a session with the default polling cadence.
    pub fn new(api: GenerationApi) -> Self {
        Self::with_config(api, PollConfig::default())
    }

    pub fn with_config(api: GenerationApi, config: PollConfig) -> Self {
        Self {
            api: Arc::new(api),
            config,
            current: Mutex::new(None),
        }
    }

    /// Submit a generation request, superseding any in-flight task.
    ///
    /// The previous task's token is cancelled before the new one
    /// starts; its handle resolves to [`ClientError::Cancelled`].
    pub fn submit(&self, request: ChatRequest) -> TaskHandle {
        let cancel = CancellationToken::new();

        let previous = self
            .current
            .lock()
            .expect("session lock poisoned")
            .replace(cancel.clone());
        if let Some(previous) = previous {
            tracing::debug!("Superseding in-flight generation task");
            previous.cancel();
        }

        let (phase_tx, phase_rx) = watch::channel(TaskPhase::Idle);
        let api = Arc::clone(&self.api);
        let config = self.config.clone();
        let token = cancel.clone();

        let join = tokio::spawn(async move {
            let result = run_task(&api, &request, &config, &token, &phase_tx).await;
            let _ = phase_tx.send(terminal_phase(&result));
            result
        });

        TaskHandle {
            phase: phase_rx,
            cancel,
            join,
        }
    }

    /// Cancel the current in-flight task, if any. Used when the caller
    /// abandons the interaction without starting a new one.
    pub fn cancel(&self) {
        if let Some(token) = self.current.lock().expect("session lock poisoned").take() {
            token.cancel();
        }
    }
}

/// Submit, then poll if the backend accepted asynchronously.
async fn run_task(
    api: &GenerationApi,
    request: &ChatRequest,
    config: &PollConfig,
    cancel: &CancellationToken,
    phase_tx: &watch::Sender<TaskPhase>,
) -> Result<ChatResponse, ClientError> {
    let _ = phase_tx.send(TaskPhase::Submitting);

    let outcome = tokio::select! {
        _ = cancel.cancelled() => return Err(ClientError::Cancelled),
        result = api.submit(request) => result?,
    };

    match outcome {
        SubmitOutcome::Immediate(result) => Ok(result),
        SubmitOutcome::Accepted { task_id } => {
            let _ = phase_tx.send(TaskPhase::Polling);
            poll_until_done(api, &task_id, config, cancel).await
        }
    }
}

/// Map a finished task's result to its terminal phase.
fn terminal_phase(result: &Result<ChatResponse, ClientError>) -> TaskPhase {
    match result {
        Ok(_) => TaskPhase::Completed,
        Err(ClientError::PollTimeout { .. }) => TaskPhase::TimedOut,
        Err(ClientError::Cancelled) => TaskPhase::Cancelled,
        Err(_) => TaskPhase::Failed,
    }
}

impl TaskHandle {
    /// The task's current phase.
    pub fn phase(&self) -> TaskPhase {
        *self.phase.borrow()
    }

    /// A watch receiver for observing phase transitions.
    pub fn phase_watch(&self) -> watch::Receiver<TaskPhase> {
        self.phase.clone()
    }

    /// Cancel this task. Its outcome resolves to
    /// [`ClientError::Cancelled`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Await the task's final outcome. Consumes the handle: the result
    /// is delivered exactly once.
    pub async fn outcome(self) -> Result<ChatResponse, ClientError> {
        match self.join.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(ClientError::Cancelled),
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        }
    }
}
