//! Seams to the upstream services. The OpenAI implementation lives in `ai`;
//! tests plug in scripted backends.

use std::future::Future;
use std::time::Duration;

use crate::chat::ChatTurn;
use crate::error::AIError;

// One request to the text-generation backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub preamble: String,
    pub history: Vec<ChatTurn>, // Prior turns, oldest first.
    pub prompt: String,
    pub json_mode: bool, // Ask for a machine-parseable JSON object.
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(preamble: impl Into<String>, prompt: impl Into<String>) -> Self {
        CompletionRequest {
            preamble: preamble.into(),
            history: Vec::new(),
            prompt: prompt.into(),
            json_mode: false,
            temperature: 0.0,
        }
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn history(mut self, history: &[ChatTurn]) -> Self {
        self.history = history.to_vec();
        self
    }
}

pub trait CompletionBackend: Send + Sync {
    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<String, AIError>> + Send;
}

pub trait EmbeddingBackend: Send + Sync {
    // One vector per text, same order.
    fn embed(
        &self,
        texts: Vec<String>,
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, AIError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        RetryPolicy {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    // Exponential: base, 2*base, 4*base...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1 << attempt.min(16))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
        }
    }
}

// Runs `operation`, retrying only transient failures.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, label: &str, mut operation: F) -> Result<T, AIError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AIError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                attempt += 1;
                log::warn!(
                    "{} failed ({}), retry {}/{} in {:?}",
                    label,
                    e,
                    attempt,
                    policy.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
