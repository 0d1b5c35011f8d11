//! Embedding generation service with batching and dimension enforcement

use std::sync::Arc;

use tracing::debug;

use super::client::EmbeddingBackend;
use super::client::EmbeddingClient;
use crate::errors::DocRagError;
use crate::errors::Result;

/// Service for generating embeddings on top of a pluggable backend.
///
/// Enforces the installation's fixed vector dimension: every stored vector
/// must share it, so a backend returning anything else is an invariant
/// violation surfaced as an error.
pub struct EmbeddingService {
    backend: Arc<dyn EmbeddingBackend>,
    dimension: usize,
    batch_size: usize,
}

impl EmbeddingService {
    /// Create a service backed by the configured model server
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        let client = EmbeddingClient::from_config(&config.embeddings)?;
        Ok(Self {
            backend: Arc::new(client),
            dimension: config.embeddings.dimension,
            batch_size: config.embeddings.batch_size,
        })
    }

    /// Create a service over an injected backend (used by tests)
    pub fn with_backend(backend: Arc<dyn EmbeddingBackend>, dimension: usize) -> Self {
        Self {
            backend,
            dimension,
            batch_size: 100,
        }
    }

    /// Encode a single text
    pub async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.backend.embed(text).await?;
        self.check_dimension(&embedding)?;
        Ok(embedding)
    }

    /// Encode multiple texts in one logical batch call, preserving order
    pub async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Encoding batch of {} texts", texts.len());

        let mut embeddings = if texts.len() <= self.batch_size {
            self.backend.embed_batch(texts).await?
        } else {
            // Model servers cap request sizes; sub-batch transparently
            let mut all = Vec::with_capacity(texts.len());
            for chunk in texts.chunks(self.batch_size) {
                all.extend(self.backend.embed_batch(chunk).await?);
            }
            all
        };

        if embeddings.len() != texts.len() {
            return Err(DocRagError::EmbeddingUnavailable(format!(
                "backend returned {} vectors for {} inputs",
                embeddings.len(),
                texts.len()
            )));
        }
        for embedding in &mut embeddings {
            self.check_dimension(embedding)?;
        }

        Ok(embeddings)
    }

    /// Get the embedding dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.dimension {
            return Err(DocRagError::EmbeddingDimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }
        Ok(())
    }
}
