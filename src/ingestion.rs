//! Document ingestion pipeline
//!
//! Document -> chunks -> one batch embedding call -> one transactional batch
//! write. The unit of work is all-or-nothing: any failure leaves no partial
//! document visible.

use std::sync::Arc;

use tracing::info;

use crate::chunking::ChunkSplitter;
use crate::database::VectorStore;
use crate::embeddings::EmbeddingService;
use crate::errors::DocRagError;
use crate::errors::Result;
use crate::models::IngestDocumentRequest;
use crate::models::NewChunk;
use crate::models::NewDocument;

/// Ingestion pipeline over the storage boundary
pub struct IngestionPipeline {
    store: Arc<dyn VectorStore>,
    embeddings: Arc<EmbeddingService>,
    splitter: ChunkSplitter,
}

impl IngestionPipeline {
    /// Create a new ingestion pipeline with the installation's chunking
    pub fn new(
        store: Arc<dyn VectorStore>,
        embeddings: Arc<EmbeddingService>,
        splitter: ChunkSplitter,
    ) -> Self {
        Self {
            store,
            embeddings,
            splitter,
        }
    }

    /// Ingest one document; returns the new document id.
    ///
    /// Any failure - unreadable or empty content, embedding failure, storage
    /// failure - surfaces as `IngestionFailed` carrying the cause, and the
    /// whole unit of work rolls back.
    pub async fn ingest(&self, request: IngestDocumentRequest) -> Result<i64> {
        let content = request.source.read_text().map_err(DocRagError::ingestion)?;
        if content.trim().is_empty() {
            return Err(DocRagError::ingestion(DocRagError::EmptyContent));
        }

        let chunk_texts = self.splitter.split(&content);
        info!(
            "Ingesting '{}': {} chunks of up to {} chars",
            request.title,
            chunk_texts.len(),
            self.splitter.chunk_size()
        );

        // One batch call per document, not one call per chunk
        let embeddings = self
            .embeddings
            .encode_batch(&chunk_texts)
            .await
            .map_err(DocRagError::ingestion)?;

        let chunks: Vec<NewChunk> = chunk_texts
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(index, (text, embedding))| NewChunk {
                text,
                index: index as i32,
                embedding,
                metadata: request.metadata.clone(),
            })
            .collect();

        let document = NewDocument {
            title: request.title,
            source_type: request.source_type,
            source_url: request.source_url,
            metadata: request.metadata,
        };

        self.store
            .create_document(document, chunks)
            .await
            .map_err(DocRagError::ingestion)
    }
}
