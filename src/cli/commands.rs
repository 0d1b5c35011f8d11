use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "docrag")]
#[command(about = "RAG pipeline tool: ingest documents, chat over them, evaluate quality")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database schema
    Init,

    /// Ingest a document from a file or inline content
    Ingest {
        /// Document title
        #[arg(long)]
        title: String,
        /// Path to a plain-text file
        #[arg(long, conflicts_with = "content")]
        file: Option<PathBuf>,
        /// Inline document content
        #[arg(long)]
        content: Option<String>,
        /// Source type label (e.g. manual, faq)
        #[arg(long)]
        source_type: Option<String>,
        /// Source URL for provenance
        #[arg(long)]
        source_url: Option<String>,
        /// Document category stored in metadata
        #[arg(long)]
        category: Option<String>,
        /// Document version stored in metadata
        #[arg(long)]
        version: Option<String>,
    },

    /// Ask a question (one chat turn)
    Ask {
        /// The question to ask
        question: String,
        /// Session id; a fresh one is generated when omitted
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Evaluate answer quality against a labeled dataset
    Eval {
        /// Path to a JSON dataset of {id, question, reference_answer} samples
        dataset: PathBuf,
        /// Evaluation mode: llm or rag
        #[arg(short, long, default_value = "llm")]
        mode: String,
        /// Write the JSON report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
