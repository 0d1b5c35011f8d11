//! Bounded-retry generation with a deterministic fallback answer

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use super::ChatBackend;
use super::ChatMessage;
use super::GenerationClient;
use crate::errors::Result;

/// Tagged outcome of the retry loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Trimmed, non-empty answer text
    Success(String),
    /// All attempts failed, or the model replied with an empty body
    Exhausted,
}

/// Generation service wrapping the model call with retries and fallback.
///
/// `generate` never fails: the caller is a live chat turn that must receive
/// some response, so exhaustion yields the configured apology string.
pub struct LlmService {
    backend: Arc<dyn ChatBackend>,
    max_attempts: u32,
    retry_delay: Duration,
    fallback_answer: String,
}

impl LlmService {
    /// Create a service backed by the configured generation model
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        let client = GenerationClient::from_config(&config.llm)?;
        Ok(Self {
            backend: Arc::new(client),
            max_attempts: config.llm.max_attempts,
            retry_delay: Duration::from_millis(config.llm.retry_delay_ms),
            fallback_answer: config.llm.fallback_answer.clone(),
        })
    }

    /// Create a service over an injected backend (used by tests)
    pub fn with_backend(
        backend: Arc<dyn ChatBackend>,
        max_attempts: u32,
        retry_delay: Duration,
        fallback_answer: String,
    ) -> Self {
        Self {
            backend,
            max_attempts,
            retry_delay,
            fallback_answer,
        }
    }

    /// Generate an answer for the prompt messages.
    ///
    /// Always returns an answer string: on success the trimmed model output,
    /// otherwise the fallback answer.
    pub async fn generate(&self, messages: &[ChatMessage]) -> String {
        match self.try_generate(messages).await {
            GenerationOutcome::Success(answer) => answer,
            GenerationOutcome::Exhausted => self.fallback_answer.clone(),
        }
    }

    /// Run the bounded retry loop and report the tagged outcome
    pub async fn try_generate(&self, messages: &[ChatMessage]) -> GenerationOutcome {
        for attempt in 1..=self.max_attempts {
            match self.backend.chat(messages).await {
                Ok(answer) => {
                    let trimmed = answer.trim();
                    if trimmed.is_empty() {
                        // An empty body is a model answer, not a transport
                        // failure; substituting the fallback, no retry.
                        warn!("Generation returned an empty answer");
                        return GenerationOutcome::Exhausted;
                    }
                    return GenerationOutcome::Success(trimmed.to_string());
                }
                Err(e) => {
                    warn!("Generation attempt {}/{} failed: {}", attempt, self.max_attempts, e);
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        GenerationOutcome::Exhausted
    }

    /// The configured fallback answer
    pub fn fallback_answer(&self) -> &str {
        &self.fallback_answer
    }
}
