//! RAG (Retrieval-Augmented Generation) module
//!
//! End-to-end functionality for answering questions over ingested documents:
//! - Semantic retrieval using vector embeddings
//! - Context assembly from retrieved chunks and conversation history
//! - LLM-based answer generation with graceful degradation
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use docrag::config::AppConfig;
//! use docrag::database::Database;
//! use docrag::embeddings::EmbeddingService;
//! use docrag::llm::LlmService;
//! use docrag::rag::ChatService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let database = Arc::new(Database::from_config(&config).await?);
//!     let embeddings = Arc::new(EmbeddingService::new(&config)?);
//!     let llm = Arc::new(LlmService::new(&config)?);
//!
//!     let service = ChatService::new(database, embeddings, llm, &config);
//!     let turn = service.chat("session-1", "What does the manual say about setup?").await?;
//!     println!("Answer: {}", turn.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod pipeline;
pub mod retriever;

pub use context::ContextAssembler;
pub use pipeline::ChatService;
pub use pipeline::ChatTurn;
pub use retriever::Retriever;
