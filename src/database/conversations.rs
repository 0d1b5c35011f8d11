use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;

use crate::embeddings::vector_literal;
use crate::models::Message;
use crate::models::MessageRole;
use crate::models::NewMessage;
use crate::DocRagError;
use crate::Result;

use super::chunk_ids_literal;
use super::Database;

impl Database {
    /// Atomic find-or-insert of a conversation by session id.
    ///
    /// The unique constraint on `session_id` makes the insert race-tolerant:
    /// when a concurrent insert wins, the follow-up select observes its row.
    pub(super) async fn find_or_create_conversation(&self, session_id: &str) -> Result<i64> {
        let inserted: Option<i64> = sqlx::query_scalar(
            r"
            INSERT INTO conversations (session_id)
            VALUES ($1)
            ON CONFLICT (session_id) DO NOTHING
            RETURNING id
            ",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(id) = inserted {
            return Ok(id);
        }

        let existing: i64 =
            sqlx::query_scalar("SELECT id FROM conversations WHERE session_id = $1")
                .bind(session_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(existing)
    }

    /// Insert a message with its embedding and cited chunk ids
    pub(super) async fn store_message(&self, message: NewMessage) -> Result<i64> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM conversations WHERE id = $1")
            .bind(message.conversation_id)
            .fetch_optional(&self.pool)
            .await?;

        if exists.is_none() {
            return Err(DocRagError::ConversationNotFound(message.conversation_id));
        }

        let chunk_ids = message
            .relevant_chunk_ids
            .as_deref()
            .map(chunk_ids_literal);

        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO messages (conversation_id, role, content, relevant_chunk_ids, embedding)
            VALUES ($1, $2, $3, $4::bigint[], $5::vector)
            RETURNING id
            ",
        )
        .bind(message.conversation_id)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(chunk_ids)
        .bind(vector_literal(&message.embedding))
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// The most recent `limit` messages, re-ordered to chronological.
    ///
    /// The store returns newest-first (that is how the window is cut); the
    /// rows are reversed here so callers always see oldest-first.
    pub(super) async fn fetch_recent_messages(
        &self,
        conversation_id: i64,
        limit: i64,
    ) -> Result<Vec<Message>> {
        #[derive(sqlx::FromRow)]
        struct RawMessage {
            id: i64,
            conversation_id: i64,
            role: String,
            content: String,
            relevant_chunk_ids: Option<Vec<i64>>,
            created_at: DateTime<Utc>,
        }

        let mut rows = sqlx::query_as::<_, RawMessage>(
            r"
            SELECT id, conversation_id, role, content, relevant_chunk_ids, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY id DESC
            LIMIT $2
            ",
        )
        .bind(conversation_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.reverse();

        rows.into_iter()
            .map(|r| {
                let role = MessageRole::from_str(&r.role)
                    .map_err(|e| DocRagError::Config(format!("corrupt message row: {e}")))?;
                Ok(Message {
                    id: r.id,
                    conversation_id: r.conversation_id,
                    role,
                    content: r.content,
                    relevant_chunk_ids: r.relevant_chunk_ids.unwrap_or_default(),
                    created_at: r.created_at,
                })
            })
            .collect()
    }
}
