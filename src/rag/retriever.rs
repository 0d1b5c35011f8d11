//! Retrieval engine for semantic chunk search

use std::sync::Arc;

use tracing::debug;

use crate::database::VectorStore;
use crate::embeddings::EmbeddingService;
use crate::errors::Result;
use crate::models::RetrievedChunk;

/// Retriever turning a query into ranked, threshold-filtered chunks
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    embeddings: Arc<EmbeddingService>,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(store: Arc<dyn VectorStore>, embeddings: Arc<EmbeddingService>) -> Self {
        Self { store, embeddings }
    }

    /// Embed the query and search for similar chunks.
    ///
    /// An empty result means no chunk cleared the threshold; callers proceed
    /// without retrieved context. Embedding failures propagate: a query that
    /// cannot be embedded cannot be retrieved against.
    pub async fn retrieve(
        &self,
        query_text: &str,
        limit: usize,
        similarity_threshold: f32,
    ) -> Result<Vec<RetrievedChunk>> {
        debug!("Retrieving chunks for query: {}", query_text);

        let query_embedding = self.embeddings.encode(query_text).await?;
        self.retrieve_with_embedding(&query_embedding, limit, similarity_threshold)
            .await
    }

    /// Search with a precomputed query embedding
    pub async fn retrieve_with_embedding(
        &self,
        query_embedding: &[f32],
        limit: usize,
        similarity_threshold: f32,
    ) -> Result<Vec<RetrievedChunk>> {
        let results = self
            .store
            .similarity_search(query_embedding, limit as i64, similarity_threshold)
            .await?;

        debug!("Retrieved {} chunks above threshold", results.len());
        Ok(results)
    }
}
