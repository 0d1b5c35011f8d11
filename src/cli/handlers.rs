//! Command handlers wiring configuration into library services

use std::path::PathBuf;
use std::sync::Arc;

use crate::chunking::ChunkSplitter;
use crate::config::AppConfig;
use crate::content::ContentSource;
use crate::database::Database;
use crate::database::VectorStore;
use crate::embeddings::EmbeddingService;
use crate::eval::EvalMode;
use crate::eval::QualityEvaluator;
use crate::ingestion::IngestionPipeline;
use crate::llm::LlmService;
use crate::models::IngestDocumentRequest;
use crate::rag::ChatService;
use crate::rag::Retriever;
use crate::DocRagError;
use crate::Result;

/// Initialize the database schema
pub async fn handle_init(config: &AppConfig) -> Result<()> {
    let database = Database::from_config(config).await?;
    database.init_schema(config).await?;
    println!("Database schema initialized.");
    Ok(())
}

/// Ingest one document
#[allow(clippy::too_many_arguments)]
pub async fn handle_ingest(
    config: &AppConfig,
    title: String,
    file: Option<PathBuf>,
    content: Option<String>,
    source_type: Option<String>,
    source_url: Option<String>,
    category: Option<String>,
    version: Option<String>,
) -> Result<()> {
    let source = match (file, content) {
        (Some(path), None) => ContentSource::FilePath(path),
        (None, Some(text)) => ContentSource::Inline(text),
        _ => {
            return Err(DocRagError::Config(
                "provide exactly one of --file or --content".to_string(),
            ))
        }
    };

    let database = Database::from_config(config).await?;
    database.verify_schema_or_error().await?;

    let store: Arc<dyn VectorStore> = Arc::new(database);
    let embeddings = Arc::new(EmbeddingService::new(config)?);
    let splitter = ChunkSplitter::from_config(&config.chunking)?;
    let pipeline = IngestionPipeline::new(store, embeddings, splitter);

    let metadata = serde_json::json!({
        "category": category,
        "version": version,
    });

    let document_id = pipeline
        .ingest(IngestDocumentRequest {
            title,
            source,
            source_type,
            source_url,
            metadata,
        })
        .await?;

    println!("Document ingested with id {document_id}");
    Ok(())
}

/// Run one chat turn
pub async fn handle_ask(config: &AppConfig, question: String, session: Option<String>) -> Result<()> {
    let session_id = session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let database = Database::from_config(config).await?;
    database.verify_schema_or_error().await?;

    let store: Arc<dyn VectorStore> = Arc::new(database);
    let embeddings = Arc::new(EmbeddingService::new(config)?);
    let llm = Arc::new(LlmService::new(config)?);
    let service = ChatService::new(store, embeddings, llm, config);

    let turn = service.chat(&session_id, &question).await?;

    println!("{}", turn.answer);
    if !turn.sources.is_empty() {
        println!();
        println!("Sources ({} chunks):", turn.sources.len());
        for source in &turn.sources {
            println!(
                "  [{}] {} (similarity {:.3})",
                source.chunk_id, source.document_title, source.similarity
            );
        }
    }
    println!();
    println!("session: {session_id}");
    Ok(())
}

/// Evaluate a dataset and print or persist the report
pub async fn handle_eval(
    config: &AppConfig,
    dataset_path: PathBuf,
    mode: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let mode: EvalMode = mode
        .parse()
        .map_err(DocRagError::Config)?;
    let dataset = crate::eval::load_dataset(&dataset_path)?;

    let embeddings = Arc::new(EmbeddingService::new(config)?);
    let llm = Arc::new(LlmService::new(config)?);
    let retriever = if mode == EvalMode::Rag {
        let database = Database::from_config(config).await?;
        database.verify_schema_or_error().await?;
        let store: Arc<dyn VectorStore> = Arc::new(database);
        Some(Retriever::new(store, embeddings.clone()))
    } else {
        None
    };

    let evaluator = QualityEvaluator::new(retriever, llm, embeddings, config);
    let report = evaluator.evaluate(&dataset, mode).await?;

    println!("Evaluated {} samples ({} mode)", report.summary.count, report.mode);
    println!("  exact match:      {:.3}", report.summary.exact_match);
    println!("  token F1:         {:.3}", report.summary.token_f1);
    println!("  embedding cosine: {:.3}", report.summary.embedding_cosine);
    println!("  avg latency:      {:.3}s", report.summary.avg_latency_sec);

    if let Some(path) = output {
        crate::eval::save_report(&report, &path)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}
