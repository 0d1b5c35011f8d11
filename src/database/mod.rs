use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::Message;
use crate::models::NewChunk;
use crate::models::NewDocument;
use crate::models::NewMessage;
use crate::models::RetrievedChunk;
use crate::Result;

mod conversations;
mod documents;
mod schema;

/// Storage boundary consumed by ingestion, retrieval and conversation memory.
///
/// The production implementation is the PostgreSQL [`Database`]; tests
/// substitute an in-memory store. Implementations must honor the atomicity
/// and ordering contracts documented per method.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Persist a document and all of its chunks as one atomic unit of work.
    /// On any failure nothing is left visible. Returns the new document id.
    async fn create_document(&self, document: NewDocument, chunks: Vec<NewChunk>) -> Result<i64>;

    /// Chunks ranked by similarity descending, truncated to `limit`, filtered
    /// to `similarity >= similarity_threshold`
    async fn similarity_search(
        &self,
        query_embedding: &[f32],
        limit: i64,
        similarity_threshold: f32,
    ) -> Result<Vec<RetrievedChunk>>;

    /// Atomic find-or-insert by session id; concurrent calls with the same
    /// session id observe one conversation
    async fn get_or_create_conversation(&self, session_id: &str) -> Result<i64>;

    /// Insert a message; fails with `ConversationNotFound` for an invalid
    /// conversation id
    async fn insert_message(&self, message: NewMessage) -> Result<i64>;

    /// The most recent `limit` messages of a conversation in chronological
    /// (oldest-first) order
    async fn recent_messages(&self, conversation_id: i64, limit: i64) -> Result<Vec<Message>>;
}

/// Database connection pool wrapper
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new database instance from configuration
    pub async fn from_config(config: &crate::config::AppConfig) -> Result<Self> {
        let pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections())
            .min_connections(config.min_connections())
            .acquire_timeout(std::time::Duration::from_secs(config.connection_timeout()));

        let pool = pool_options.connect(config.database_url()).await?;

        tracing::info!(
            "Database pool configured: max_connections={}, min_connections={}",
            config.max_connections(),
            config.min_connections()
        );

        Ok(Self::new(pool))
    }

    /// Get a reference to the database pool for raw queries
    pub fn pool(&self) -> &sqlx::PgPool {
        &self.pool
    }
}

#[async_trait]
impl VectorStore for Database {
    async fn create_document(&self, document: NewDocument, chunks: Vec<NewChunk>) -> Result<i64> {
        self.insert_document_with_chunks(document, chunks).await
    }

    async fn similarity_search(
        &self,
        query_embedding: &[f32],
        limit: i64,
        similarity_threshold: f32,
    ) -> Result<Vec<RetrievedChunk>> {
        self.search_similar_chunks(query_embedding, limit, similarity_threshold)
            .await
    }

    async fn get_or_create_conversation(&self, session_id: &str) -> Result<i64> {
        self.find_or_create_conversation(session_id).await
    }

    async fn insert_message(&self, message: NewMessage) -> Result<i64> {
        self.store_message(message).await
    }

    async fn recent_messages(&self, conversation_id: i64, limit: i64) -> Result<Vec<Message>> {
        self.fetch_recent_messages(conversation_id, limit).await
    }
}

/// Serialize chunk ids for the storage boundary.
///
/// Brace-delimited comma-separated integer literal, e.g. `{1,4,7}`.
pub(crate) fn chunk_ids_literal(ids: &[i64]) -> String {
    let mut out = String::with_capacity(ids.len() * 4 + 2);
    out.push('{');
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&id.to_string());
    }
    out.push('}');
    out
}
