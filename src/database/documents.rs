use crate::embeddings::vector_literal;
use crate::models::NewChunk;
use crate::models::NewDocument;
use crate::models::RetrievedChunk;
use crate::Result;

use super::Database;

impl Database {
    /// Insert a document and its chunks inside one transaction
    pub(super) async fn insert_document_with_chunks(
        &self,
        document: NewDocument,
        chunks: Vec<NewChunk>,
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let document_id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO documents (title, source_type, source_url, metadata)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&document.title)
        .bind(&document.source_type)
        .bind(&document.source_url)
        .bind(&document.metadata)
        .fetch_one(&mut *tx)
        .await?;

        // Chunk rows go in as batch statements, all inside the document's
        // transaction; 500 rows per statement keeps bind counts bounded
        for batch in chunks.chunks(500) {
            let mut query_builder = sqlx::QueryBuilder::new(
                "INSERT INTO document_chunks (document_id, chunk_text, chunk_index, embedding, metadata) ",
            );

            query_builder.push_values(batch, |mut b, chunk| {
                b.push_bind(document_id)
                    .push_bind(&chunk.text)
                    .push_bind(chunk.index)
                    .push_bind(vector_literal(&chunk.embedding))
                    .push_unseparated("::vector")
                    .push_bind(&chunk.metadata);
            });

            query_builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        tracing::info!(
            "Document '{}' stored with {} chunks (id {})",
            document.title,
            chunks.len(),
            document_id
        );

        Ok(document_id)
    }

    /// Similarity search over chunk embeddings.
    ///
    /// Cosine similarity is `1 - (embedding <=> query)`; larger means more
    /// similar. Results come back similarity-descending, capped at `limit`.
    pub(super) async fn search_similar_chunks(
        &self,
        query_embedding: &[f32],
        limit: i64,
        similarity_threshold: f32,
    ) -> Result<Vec<RetrievedChunk>> {
        #[derive(sqlx::FromRow)]
        struct RawResult {
            chunk_id: i64,
            chunk_text: String,
            document_id: i64,
            document_title: String,
            metadata: serde_json::Value,
            similarity: f64, // PostgreSQL returns FLOAT8 from the distance operator
        }

        let raw_results = sqlx::query_as::<_, RawResult>(
            r"
            SELECT
                c.id AS chunk_id,
                c.chunk_text,
                c.document_id,
                d.title AS document_title,
                c.metadata,
                1 - (c.embedding <=> $1::vector) AS similarity
            FROM document_chunks c
            INNER JOIN documents d ON d.id = c.document_id
            WHERE 1 - (c.embedding <=> $1::vector) >= $2
            ORDER BY c.embedding <=> $1::vector
            LIMIT $3
            ",
        )
        .bind(vector_literal(query_embedding))
        .bind(f64::from(similarity_threshold))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(raw_results
            .into_iter()
            .map(|r| RetrievedChunk {
                chunk_id: r.chunk_id,
                chunk_text: r.chunk_text,
                document_id: r.document_id,
                document_title: r.document_title,
                metadata: r.metadata,
                similarity: r.similarity as f32,
            })
            .collect())
    }
}
