use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocRagError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Embedding model unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    EmbeddingDimensionMismatch { expected: usize, actual: usize },

    #[error("Ingestion failed: {0}")]
    IngestionFailed(#[source] Box<DocRagError>),

    #[error("Document content is empty")]
    EmptyContent,

    #[error("Conversation not found: id {0}")]
    ConversationNotFound(i64),

    #[error("Generation request failed: {0}")]
    GenerationFailed(String),

    #[error("Invalid chunking parameters: chunk_size={chunk_size}, overlap={overlap}")]
    InvalidChunking { chunk_size: usize, overlap: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DocRagError {
    /// Wrap any failure of the ingestion unit of work.
    pub fn ingestion(cause: DocRagError) -> Self {
        DocRagError::IngestionFailed(Box::new(cause))
    }
}

pub type Result<T> = std::result::Result<T, DocRagError>;
