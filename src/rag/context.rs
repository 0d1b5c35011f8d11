//! Context assembly from retrieved chunks and conversation history
//!
//! The assembler is pure and deterministic: identical inputs always produce
//! the identical prompt. That property carries most of the test burden for
//! the prompt shape.

use crate::llm::ChatMessage;
use crate::models::Message;
use crate::models::RetrievedChunk;

/// Marker substituted when retrieval produced no usable chunks
const NO_CONTEXT_MARKER: &str = "No context available.";

/// Marker appended when the context region is cut at the length bound
const TRUNCATION_MARKER: &str = "...";

/// Assembler for building the prompt sent to the generation model
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    max_context_length: usize,
    history_window: usize,
}

impl ContextAssembler {
    /// Create a new context assembler
    pub fn new(max_context_length: usize, history_window: usize) -> Self {
        Self {
            max_context_length,
            history_window,
        }
    }

    /// Create an assembler from the context configuration section
    pub fn from_config(config: &crate::config::ContextConfig) -> Self {
        Self::new(config.max_context_length, config.history_window)
    }

    /// Build the prompt messages: instruction template with the (bounded)
    /// retrieved context substituted in, the most recent history turns, and
    /// the current query as the final user turn.
    pub fn build(
        &self,
        retrieved_chunks: &[RetrievedChunk],
        history_messages: &[Message],
        query: &str,
    ) -> Vec<ChatMessage> {
        let context_text = self.assemble_context(retrieved_chunks);

        let mut messages = Vec::with_capacity(self.history_window + 2);
        messages.push(ChatMessage::system(build_system_prompt(&context_text)));

        // Only the most recent window of turns, chronological, and only
        // entries that actually carry content
        let window_start = history_messages.len().saturating_sub(self.history_window);
        for message in &history_messages[window_start..] {
            if message.content.is_empty() {
                continue;
            }
            messages.push(ChatMessage {
                role: message.role.as_str().to_string(),
                content: message.content.clone(),
            });
        }

        messages.push(ChatMessage::user(query));
        messages
    }

    /// Concatenate chunk texts in retrieval order, bounded to the configured
    /// maximum character length
    fn assemble_context(&self, retrieved_chunks: &[RetrievedChunk]) -> String {
        if retrieved_chunks.is_empty() {
            return NO_CONTEXT_MARKER.to_string();
        }

        let joined = retrieved_chunks
            .iter()
            .map(|c| c.chunk_text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        if joined.chars().count() <= self.max_context_length {
            return joined;
        }

        let mut truncated: String = joined.chars().take(self.max_context_length).collect();
        truncated.push_str(TRUNCATION_MARKER);
        truncated
    }

    pub fn max_context_length(&self) -> usize {
        self.max_context_length
    }

    pub fn history_window(&self) -> usize {
        self.history_window
    }
}

/// Fixed instruction template; only the context region varies
fn build_system_prompt(context_text: &str) -> String {
    format!(
        r"You are a knowledgeable and analytical system assistant who understands this system thoroughly.
Your task is to analyze, summarize, and accurately answer user questions based strictly on the provided information.

Guidelines:
1. Base every answer only on the given context, conversation history, or explicitly provided data.
2. Do not invent or assume information that is not in the context.
3. Perform analysis or reasoning if needed to form a clear and insightful conclusion.
4. Maintain a formal, clear, accurate, and polite tone at all times.

Context:
{context_text}

Answer Format:
- Always reply in the same language as the question.
- If the answer is short, reply in one concise and polite sentence.
- If the answer is longer, use a numbered list (1., 2., 3.) for readability.
- If the question cannot be answered from the context, politely state that the information is not available.
- When token length is limited, summarize the core analysis first, then optional details."
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::models::MessageRole;

    fn chunk(id: i64, text: &str, similarity: f32) -> RetrievedChunk {
        RetrievedChunk {
            chunk_id: id,
            chunk_text: text.to_string(),
            document_id: 1,
            document_title: "doc".to_string(),
            metadata: serde_json::json!({}),
            similarity,
        }
    }

    fn message(id: i64, role: MessageRole, content: &str) -> Message {
        Message {
            id,
            conversation_id: 1,
            role,
            content: content.to_string(),
            relevant_chunk_ids: Vec::new(),
            created_at: Utc.timestamp_opt(1_700_000_000 + id, 0).unwrap(),
        }
    }

    #[test]
    fn test_build_is_pure() {
        let assembler = ContextAssembler::new(100, 2);
        let chunks = vec![chunk(1, "alpha", 0.9), chunk(2, "beta", 0.8)];
        let history = vec![message(1, MessageRole::User, "hi")];

        let a = assembler.build(&chunks, &history, "question?");
        let b = assembler.build(&chunks, &history, "question?");
        assert_eq!(a, b);
    }

    #[test]
    fn test_chunks_joined_in_retrieval_order() {
        let assembler = ContextAssembler::new(100, 2);
        let chunks = vec![chunk(1, "first", 0.9), chunk(2, "second", 0.8)];

        let messages = assembler.build(&chunks, &[], "q");
        assert!(messages[0].content.contains("first\nsecond"));
    }

    #[test]
    fn test_no_context_marker() {
        let assembler = ContextAssembler::new(100, 2);
        let messages = assembler.build(&[], &[], "q");
        assert!(messages[0].content.contains(NO_CONTEXT_MARKER));
    }

    #[test]
    fn test_context_region_is_bounded() {
        let assembler = ContextAssembler::new(10, 2);
        let chunks = vec![chunk(1, "abcdefghijklmnopqrstuvwxyz", 0.9)];

        let messages = assembler.build(&chunks, &[], "q");
        let prompt = &messages[0].content;

        // The truncated prefix plus marker appears; the tail does not
        assert!(prompt.contains(&format!("abcdefghij{TRUNCATION_MARKER}")));
        assert!(!prompt.contains("abcdefghijk"));
        // The instruction template around the context region stays intact
        assert!(prompt.contains("Answer Format:"));
    }

    #[test]
    fn test_history_window_keeps_most_recent() {
        let assembler = ContextAssembler::new(100, 2);
        let history = vec![
            message(1, MessageRole::User, "oldest"),
            message(2, MessageRole::Assistant, "middle"),
            message(3, MessageRole::User, "newest"),
        ];

        let messages = assembler.build(&[], &history, "q");
        // system + 2 history turns + query
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].content, "middle");
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[2].content, "newest");
        assert_eq!(messages[3].content, "q");
        assert_eq!(messages[3].role, "user");
    }

    #[test]
    fn test_empty_history_entries_skipped() {
        let assembler = ContextAssembler::new(100, 3);
        let history = vec![
            message(1, MessageRole::User, "kept"),
            message(2, MessageRole::Assistant, ""),
        ];

        let messages = assembler.build(&[], &history, "q");
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].content, "kept");
    }

    #[test]
    fn test_query_is_final_user_turn() {
        let assembler = ContextAssembler::new(100, 2);
        let messages = assembler.build(&[], &[], "what now?");
        let last = messages.last().unwrap();
        assert_eq!(last.role, "user");
        assert_eq!(last.content, "what now?");
    }
}
