//! Generation backends.
//!
//! The task service talks to its model through the [`Generator`]
//! trait: production uses [`GeminiGenerator`], tests substitute stubs.

pub mod extract;
pub mod gemini;
pub mod prompts;

pub use gemini::{GeminiGenerator, RetryConfig};

use async_trait::async_trait;

use prometheus_core::chat::{ChatRequest, ChatResponse};
use prometheus_core::seeds::Seed;

/// Errors from a generation backend.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// The HTTP request never got a usable response (network, DNS,
    /// timeout), including after retries.
    #[error("Model request failed: {0}")]
    Transport(String),

    /// The model API returned a non-success status that is not worth
    /// retrying (or retries ran out).
    #[error("Model API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The response arrived but did not contain usable content.
    #[error("Model response malformed: {0}")]
    Malformed(String),
}

/// A generation backend able to answer one request for one seed.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        request: &ChatRequest,
        seed: &Seed,
    ) -> Result<ChatResponse, GeneratorError>;
}
