//! Task submission and polling client for the Prometheus generation
//! backend.
//!
//! Generation runs out of process and can take longer than a sensible
//! synchronous HTTP timeout, so the backend enqueues work and hands
//! back a task id. This crate drives that contract end to end:
//! [`GenerationApi`] wraps the two HTTP endpoints, resolving the
//! enqueue response once into [`SubmitOutcome`]; [`poll_until_done`]
//! runs the fixed-interval status loop with attempt and wall-clock
//! ceilings; [`GenerationSession`] ties both together behind a
//! last-request-wins handle with an observable phase.

pub mod api;
pub mod error;
pub mod poll;
pub mod session;

pub use api::{GenerationApi, SubmitOutcome};
pub use error::ClientError;
pub use poll::{poll_until_done, PollConfig};
pub use session::{GenerationSession, TaskHandle, TaskPhase};
