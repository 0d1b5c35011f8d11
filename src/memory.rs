//! Per-session conversation memory
//!
//! An ordered message log per conversation. Every message is embedded at
//! write time so history is searchable semantically alongside chunks.

use std::sync::Arc;

use tracing::debug;

use crate::database::VectorStore;
use crate::embeddings::EmbeddingService;
use crate::errors::Result;
use crate::models::Message;
use crate::models::MessageRole;
use crate::models::NewMessage;

/// Conversation memory over the storage boundary
pub struct ConversationMemory {
    store: Arc<dyn VectorStore>,
    embeddings: Arc<EmbeddingService>,
}

impl ConversationMemory {
    /// Create a new conversation memory
    pub fn new(store: Arc<dyn VectorStore>, embeddings: Arc<EmbeddingService>) -> Self {
        Self { store, embeddings }
    }

    /// Look up or create the conversation for a session id.
    ///
    /// Idempotent and race-tolerant: concurrent calls with the same session
    /// id resolve to the same conversation.
    pub async fn get_or_create(&self, session_id: &str) -> Result<i64> {
        let id = self.store.get_or_create_conversation(session_id).await?;
        debug!("Session {} resolved to conversation {}", session_id, id);
        Ok(id)
    }

    /// Append a message, computing and storing its embedding.
    ///
    /// Fails with `ConversationNotFound` for an invalid conversation id;
    /// embedding failures propagate since an un-embedded message cannot be
    /// stored under this installation's invariants.
    pub async fn append(
        &self,
        conversation_id: i64,
        role: MessageRole,
        content: &str,
        relevant_chunk_ids: Option<Vec<i64>>,
    ) -> Result<i64> {
        let embedding = self.embeddings.encode(content).await?;

        self.store
            .insert_message(NewMessage {
                conversation_id,
                role,
                content: content.to_string(),
                relevant_chunk_ids,
                embedding,
            })
            .await
    }

    /// The most recent `limit` messages, chronological oldest-first
    pub async fn recent(&self, conversation_id: i64, limit: usize) -> Result<Vec<Message>> {
        self.store
            .recent_messages(conversation_id, limit as i64)
            .await
    }
}
