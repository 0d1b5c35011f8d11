//! LLM generation module
//!
//! Calls the external generation model with fixed decoding options and a
//! bounded-retry policy. A chat turn must always receive some response, so
//! generation failures never escape [`LlmService::generate`] - exhaustion
//! maps to a configured fallback answer.

pub mod client;
pub mod service;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

pub use client::GenerationClient;
pub use service::GenerationOutcome;
pub use service::LlmService;

use crate::errors::Result;

/// One prompt message sent to the generation model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String, // "system", "user" or "assistant"
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Fixed decoding options passed to the model on every call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub num_ctx: u32,
    pub num_predict: u32,
    pub top_k: u32,
    pub top_p: f32,
    pub repeat_penalty: f32,
}

impl GenerationOptions {
    pub fn from_config(config: &crate::config::LlmConfig) -> Self {
        Self {
            temperature: config.temperature,
            num_ctx: config.num_ctx,
            num_predict: config.num_predict,
            top_k: config.top_k,
            top_p: config.top_p,
            repeat_penalty: config.repeat_penalty,
        }
    }
}

/// Backend capable of one generation round trip.
///
/// Production backends call the model server; tests substitute scripted or
/// always-failing fakes.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send the prompt messages and return the raw answer body (may be empty)
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String>;
}
