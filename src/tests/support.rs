//! Deterministic test doubles for the external collaborators

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::TimeZone;
use chrono::Utc;

use crate::database::VectorStore;
use crate::embeddings::cosine_similarity;
use crate::embeddings::EmbeddingBackend;
use crate::embeddings::EmbeddingService;
use crate::errors::DocRagError;
use crate::errors::Result;
use crate::llm::ChatBackend;
use crate::llm::ChatMessage;
use crate::llm::LlmService;
use crate::models::Message;
use crate::models::NewChunk;
use crate::models::NewDocument;
use crate::models::NewMessage;
use crate::models::RetrievedChunk;

/// Dimension of the fake embedding space (one bucket per letter or digit)
pub const FAKE_DIM: usize = 36;

/// Embeds text as a bag of first characters: buckets 0-25 count tokens
/// starting with each letter, 26-35 tokens starting with each digit.
/// Deterministic and cheap, with enough signal that token overlap drives
/// cosine similarity.
pub struct FakeEmbedding;

fn letter_bag(text: &str) -> Vec<f32> {
    let mut v = vec![0.0_f32; FAKE_DIM];
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        let first = token.chars().next().unwrap().to_ascii_lowercase();
        if first.is_ascii_alphabetic() {
            v[(first as u8 - b'a') as usize] += 1.0;
        } else if first.is_ascii_digit() {
            v[26 + (first as u8 - b'0') as usize] += 1.0;
        }
    }
    v
}

#[async_trait]
impl EmbeddingBackend for FakeEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(letter_bag(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| letter_bag(t)).collect())
    }
}

/// Embedding backend whose model server is down
pub struct FailingEmbedding;

#[async_trait]
impl EmbeddingBackend for FailingEmbedding {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(DocRagError::EmbeddingUnavailable(
            "embedding model offline".to_string(),
        ))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(DocRagError::EmbeddingUnavailable(
            "embedding model offline".to_string(),
        ))
    }
}

/// Chat backend returning a fixed answer and recording each prompt it saw
pub struct ScriptedChat {
    pub answer: String,
    pub prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChat {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_prompt(&self) -> Option<Vec<ChatMessage>> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ChatBackend for ScriptedChat {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        Ok(self.answer.clone())
    }
}

/// Chat backend whose model server is down
pub struct FailingChat;

#[async_trait]
impl ChatBackend for FailingChat {
    async fn chat(&self, _messages: &[ChatMessage]) -> Result<String> {
        Err(DocRagError::GenerationFailed(
            "generation model offline".to_string(),
        ))
    }
}

#[derive(Debug, Clone)]
struct StoredChunk {
    id: i64,
    document_id: i64,
    text: String,
    index: i32,
    embedding: Vec<f32>,
    metadata: serde_json::Value,
}

#[derive(Debug, Default)]
struct StoreState {
    document_titles: Vec<String>,
    chunks: Vec<StoredChunk>,
    sessions: Vec<String>,
    messages: Vec<Message>,
}

/// In-memory [`VectorStore`] with the same contracts as the PostgreSQL
/// implementation: atomic document+chunks writes, unique sessions,
/// chronological recent-message windows, cosine similarity search.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    /// When set, similarity search fails (simulates a storage outage)
    pub fail_similarity_search: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing_search() -> Self {
        Self {
            state: Mutex::default(),
            fail_similarity_search: true,
        }
    }

    pub fn document_count(&self) -> usize {
        self.state.lock().unwrap().document_titles.len()
    }

    pub fn chunk_count(&self) -> usize {
        self.state.lock().unwrap().chunks.len()
    }

    /// Chunk indices stored for a document, in insertion order
    pub fn chunk_indices(&self, document_id: i64) -> Vec<i32> {
        self.state
            .lock()
            .unwrap()
            .chunks
            .iter()
            .filter(|c| c.document_id == document_id)
            .map(|c| c.index)
            .collect()
    }

    pub fn message_count(&self) -> usize {
        self.state.lock().unwrap().messages.len()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state.lock().unwrap().messages.clone()
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn create_document(&self, document: NewDocument, chunks: Vec<NewChunk>) -> Result<i64> {
        let mut state = self.state.lock().unwrap();
        let document_id = state.document_titles.len() as i64 + 1;
        state.document_titles.push(document.title);

        let mut next_chunk_id = state.chunks.len() as i64 + 1;
        for chunk in chunks {
            state.chunks.push(StoredChunk {
                id: next_chunk_id,
                document_id,
                text: chunk.text,
                index: chunk.index,
                embedding: chunk.embedding,
                metadata: chunk.metadata,
            });
            next_chunk_id += 1;
        }

        Ok(document_id)
    }

    async fn similarity_search(
        &self,
        query_embedding: &[f32],
        limit: i64,
        similarity_threshold: f32,
    ) -> Result<Vec<RetrievedChunk>> {
        if self.fail_similarity_search {
            return Err(DocRagError::Config(
                "similarity search unavailable".to_string(),
            ));
        }

        let state = self.state.lock().unwrap();
        let mut results: Vec<RetrievedChunk> = state
            .chunks
            .iter()
            .map(|chunk| RetrievedChunk {
                chunk_id: chunk.id,
                chunk_text: chunk.text.clone(),
                document_id: chunk.document_id,
                document_title: state.document_titles[chunk.document_id as usize - 1].clone(),
                metadata: chunk.metadata.clone(),
                similarity: cosine_similarity(query_embedding, &chunk.embedding),
            })
            .filter(|r| r.similarity >= similarity_threshold)
            .collect();

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit as usize);
        Ok(results)
    }

    async fn get_or_create_conversation(&self, session_id: &str) -> Result<i64> {
        let mut state = self.state.lock().unwrap();
        if let Some(pos) = state.sessions.iter().position(|s| s == session_id) {
            return Ok(pos as i64 + 1);
        }
        state.sessions.push(session_id.to_string());
        Ok(state.sessions.len() as i64)
    }

    async fn insert_message(&self, message: NewMessage) -> Result<i64> {
        let mut state = self.state.lock().unwrap();
        if message.conversation_id < 1 || message.conversation_id > state.sessions.len() as i64 {
            return Err(DocRagError::ConversationNotFound(message.conversation_id));
        }

        let id = state.messages.len() as i64 + 1;
        state.messages.push(Message {
            id,
            conversation_id: message.conversation_id,
            role: message.role,
            content: message.content,
            relevant_chunk_ids: message.relevant_chunk_ids.unwrap_or_default(),
            created_at: Utc.timestamp_opt(1_700_000_000 + id, 0).unwrap(),
        });
        Ok(id)
    }

    async fn recent_messages(&self, conversation_id: i64, limit: i64) -> Result<Vec<Message>> {
        let state = self.state.lock().unwrap();
        let of_conversation: Vec<Message> = state
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();

        let start = of_conversation.len().saturating_sub(limit as usize);
        Ok(of_conversation[start..].to_vec())
    }
}

/// Embedding service over the deterministic fake backend
pub fn fake_embeddings() -> Arc<EmbeddingService> {
    Arc::new(EmbeddingService::with_backend(
        Arc::new(FakeEmbedding),
        FAKE_DIM,
    ))
}

/// Generation service over a scripted backend with a short retry loop
pub fn scripted_llm(backend: Arc<dyn ChatBackend>) -> Arc<LlmService> {
    Arc::new(LlmService::with_backend(
        backend,
        2,
        std::time::Duration::from_millis(0),
        "Sorry, I could not find a clear answer.".to_string(),
    ))
}

/// Test config with the fake embedding dimension and permissive retrieval
pub fn test_config() -> crate::config::AppConfig {
    let mut config = crate::config::AppConfig::default();
    config.embeddings.dimension = FAKE_DIM;
    config.retrieval.limit = 5;
    config.retrieval.similarity_threshold = 0.1;
    config
}
