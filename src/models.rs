use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::ContentSource;

/// Role of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("unknown message role: {other}")),
        }
    }
}

/// New document to persist (id assigned by storage)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
    pub title: String,
    pub source_type: Option<String>,
    pub source_url: Option<String>,
    pub metadata: serde_json::Value,
}

/// New chunk to persist alongside its document
#[derive(Debug, Clone)]
pub struct NewChunk {
    pub text: String,
    /// 0-based position among the document's chunks
    pub index: i32,
    pub embedding: Vec<f32>,
    /// Copied from the parent document at ingestion time
    pub metadata: serde_json::Value,
}

/// Stored conversation message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub role: MessageRole,
    pub content: String,
    /// Chunk ids cited by an assistant answer; empty for user turns
    pub relevant_chunk_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
}

/// New message to persist (embedding computed at write time)
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: i64,
    pub role: MessageRole,
    pub content: String,
    pub relevant_chunk_ids: Option<Vec<i64>>,
    pub embedding: Vec<f32>,
}

/// Chunk returned by similarity search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk_id: i64,
    pub chunk_text: String,
    pub document_id: i64,
    pub document_title: String,
    pub metadata: serde_json::Value,
    pub similarity: f32,
}

/// Ingestion request: one document plus its provenance metadata
#[derive(Debug, Clone)]
pub struct IngestDocumentRequest {
    pub title: String,
    pub source: ContentSource,
    pub source_type: Option<String>,
    pub source_url: Option<String>,
    pub metadata: serde_json::Value,
}
