//! Gemini `generateContent` backend.
//!
//! One HTTP call per generation, with a bounded retry-with-backoff
//! loop for throttling and transient server errors. The model's text
//! is salvaged into a [`ChatResponse`] via
//! [`extract_response`](super::extract::extract_response), then
//! seed-level fallbacks are applied (canonical sigil on closing turns
//! when the model failed to produce one).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use prometheus_core::chat::{ChatRequest, ChatResponse, OutputText};
use prometheus_core::seeds::Seed;

use super::extract::extract_response;
use super::prompts::{self, GenerationConfig, PromptKind};
use super::{Generator, GeneratorError};

/// Statuses worth retrying: throttling and transient server failures.
const RETRYABLE_STATUSES: &[u16] = &[429, 500, 502, 503, 504];

/// Per-request timeout for the model API.
const MODEL_TIMEOUT: Duration = Duration::from_secs(45);

/// Tunable parameters for the retry strategy.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_backoff: Duration,
    /// Upper bound on the delay between attempts.
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(10),
        }
    }
}

/// Generation backend calling the Gemini REST API.
pub struct GeminiGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    retry: RetryConfig,
}

impl GeminiGenerator {
    /// Create a generator for a `generateContent` endpoint. The key is
    /// passed as the `key` query parameter, as the hosted API expects.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_retry(endpoint, api_key, RetryConfig::default())
    }

    pub fn with_retry(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            retry,
        }
    }

    /// Send one prompt, retrying on retryable failures, and return the
    /// first candidate's text.
    async fn call_model(
        &self,
        prompt: &str,
        config: GenerationConfig,
    ) -> Result<String, GeneratorError> {
        let body = GeminiRequest {
            contents: [GeminiContent {
                parts: [GeminiPart { text: prompt }],
            }],
            generation_config: config,
        };
        let url = format!("{}?key={}", self.endpoint, self.api_key);

        let mut backoff = self.retry.initial_backoff;
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            match self
                .client
                .post(&url)
                .timeout(MODEL_TIMEOUT)
                .json(&body)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let parsed: GeminiResponse = response.json().await.map_err(|e| {
                            GeneratorError::Malformed(format!("invalid JSON from model API: {e}"))
                        })?;
                        return first_candidate_text(parsed);
                    }

                    let retryable = RETRYABLE_STATUSES.contains(&status.as_u16());
                    if !retryable || attempt >= self.retry.max_attempts {
                        let body = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "<unreadable body>".to_string());
                        return Err(GeneratorError::Api {
                            status: status.as_u16(),
                            body,
                        });
                    }
                    tracing::warn!(
                        attempt,
                        status = status.as_u16(),
                        "Model API returned retryable status",
                    );
                }
                Err(e) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(GeneratorError::Transport(e.to_string()));
                    }
                    tracing::warn!(attempt, error = %e, "Model request failed, retrying");
                }
            }

            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(self.retry.max_backoff);
        }
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(
        &self,
        request: &ChatRequest,
        seed: &Seed,
    ) -> Result<ChatResponse, GeneratorError> {
        let kind = prompts::prompt_kind(request);
        let prompt = prompts::build_prompt(request, seed);
        let config = prompts::generation_config(kind);

        tracing::debug!(seed_id = %request.seed_id, ?kind, "Calling model");
        let text = self.call_model(&prompt, config).await?;
        tracing::trace!(raw = %text, "Raw model text");

        let mut response = extract_response(&text);
        finalize(&mut response, kind, seed);
        Ok(response)
    }
}

/// Seed-level fallbacks applied after extraction.
///
/// Sigils belong only to closing turns and echoes; when the model
/// fails to produce one there, the seed's canonical sigil stands in.
/// Echo responses carry no main output by contract.
fn finalize(response: &mut ChatResponse, kind: PromptKind, seed: &Seed) {
    match kind {
        PromptKind::Opening | PromptKind::Intermediate => {
            response.sigil = None;
        }
        PromptKind::Closing => {
            if response.sigil.is_none() {
                response.sigil = seed.sigil.clone();
            }
        }
        PromptKind::FreeWritingEcho => {
            response.output = OutputText::default();
            if response.sigil.is_none() {
                response.sigil = seed.sigil.clone();
            }
            if response.closing_phrase.is_empty() {
                response.closing_phrase = seed.closing_phrase.clone();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: [GeminiContent<'a>; 1],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: [GeminiPart<'a>; 1],
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: String,
}

/// Extract the first candidate's text, rejecting empty responses.
fn first_candidate_text(response: GeminiResponse) -> Result<String, GeneratorError> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .map(|p| p.text.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| GeneratorError::Malformed("response carried no candidate text".into()))
}
