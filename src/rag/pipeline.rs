//! Per-turn chat pipeline: remember -> retrieve -> assemble -> generate

use std::sync::Arc;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::AppConfig;
use crate::database::VectorStore;
use crate::embeddings::EmbeddingService;
use crate::errors::Result;
use crate::llm::LlmService;
use crate::memory::ConversationMemory;
use crate::models::MessageRole;
use crate::models::RetrievedChunk;
use crate::rag::ContextAssembler;
use crate::rag::Retriever;

/// One completed chat turn
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub conversation_id: i64,
    pub answer: String,
    /// Chunks that contributed to the answer, similarity-descending
    pub sources: Vec<RetrievedChunk>,
}

/// Chat service orchestrating a full conversational turn
pub struct ChatService {
    memory: ConversationMemory,
    retriever: Retriever,
    assembler: ContextAssembler,
    llm: Arc<LlmService>,
    retrieval_limit: usize,
    similarity_threshold: f32,
    history_limit: usize,
}

impl ChatService {
    /// Create a chat service from shared service handles
    pub fn new(
        store: Arc<dyn VectorStore>,
        embeddings: Arc<EmbeddingService>,
        llm: Arc<LlmService>,
        config: &AppConfig,
    ) -> Self {
        let memory = ConversationMemory::new(store.clone(), embeddings.clone());
        let retriever = Retriever::new(store, embeddings);
        let assembler = ContextAssembler::from_config(&config.context);

        Self {
            memory,
            retriever,
            assembler,
            llm,
            retrieval_limit: config.retrieval.limit,
            similarity_threshold: config.retrieval.similarity_threshold,
            history_limit: config.context.history_window,
        }
    }

    /// Execute one chat turn for a session.
    ///
    /// Retrieval failures degrade to an empty context; the turn still
    /// produces an answer. Memory failures propagate: a turn that cannot be
    /// recorded is a hard error for the caller to handle.
    pub async fn chat(&self, session_id: &str, question: &str) -> Result<ChatTurn> {
        info!("Processing chat turn for session {}", session_id);

        let conversation_id = self.memory.get_or_create(session_id).await?;

        // History is read before this turn's user message is appended, so the
        // query appears in the prompt exactly once (as the final user turn).
        let history = self.memory.recent(conversation_id, self.history_limit).await?;

        self.memory
            .append(conversation_id, MessageRole::User, question, None)
            .await?;

        let chunks = match self
            .retriever
            .retrieve(question, self.retrieval_limit, self.similarity_threshold)
            .await
        {
            Ok(chunks) => chunks,
            Err(e) => {
                // Degraded, not fatal: answer without retrieved context
                warn!("Retrieval degraded for session {}: {}", session_id, e);
                Vec::new()
            }
        };
        debug!("Retrieved {} chunks", chunks.len());

        let prompt = self.assembler.build(&chunks, &history, question);
        let answer = self.llm.generate(&prompt).await;

        let relevant_chunk_ids: Vec<i64> = chunks.iter().map(|c| c.chunk_id).collect();
        self.memory
            .append(
                conversation_id,
                MessageRole::Assistant,
                &answer,
                Some(relevant_chunk_ids),
            )
            .await?;

        info!("Chat turn completed for session {}", session_id);

        Ok(ChatTurn {
            conversation_id,
            answer,
            sources: chunks,
        })
    }

    /// Get retriever reference
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Get conversation memory reference
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }
}
