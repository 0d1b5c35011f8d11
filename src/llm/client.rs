//! Generation model client (Ollama chat API)

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::ChatBackend;
use super::ChatMessage;
use super::GenerationOptions;
use crate::errors::DocRagError;
use crate::errors::Result;

/// Client for the generation model
pub struct GenerationClient {
    model: String,
    endpoint: String,
    options: GenerationOptions,
    client: Client,
}

impl GenerationClient {
    /// Create a new generation client
    pub fn new(
        model: String,
        endpoint: String,
        options: GenerationOptions,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DocRagError::GenerationFailed(e.to_string()))?;

        Ok(Self {
            model,
            endpoint,
            options,
            client,
        })
    }

    /// Create a client from the llm configuration section
    pub fn from_config(config: &crate::config::LlmConfig) -> Result<Self> {
        Self::new(
            config.model.clone(),
            config.endpoint.clone(),
            GenerationOptions::from_config(config),
            config.timeout_secs,
        )
    }
}

#[async_trait]
impl ChatBackend for GenerationClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        #[derive(Serialize)]
        struct OllamaChatRequest<'a> {
            model: &'a str,
            messages: &'a [ChatMessage],
            stream: bool,
            options: &'a GenerationOptions,
        }

        #[derive(Deserialize)]
        struct OllamaChatResponse {
            #[serde(default)]
            message: Option<ResponseMessage>,
        }

        #[derive(Deserialize)]
        struct ResponseMessage {
            #[serde(default)]
            content: String,
        }

        let url = format!("{}/api/chat", self.endpoint);
        debug!("Calling generation API: {} ({} messages)", url, messages.len());

        let request = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: &self.options,
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| DocRagError::GenerationFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DocRagError::GenerationFailed(format!(
                "generation API error ({status}): {error_text}"
            )));
        }

        let result: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| DocRagError::GenerationFailed(format!("Failed to parse response: {e}")))?;

        Ok(result.message.map(|m| m.content).unwrap_or_default())
    }
}
