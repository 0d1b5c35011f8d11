//! Quality evaluation harness
//!
//! Batch-runs the retrieval and generation pipeline against a labeled
//! dataset and reports aggregate quality and latency metrics. Persistence is
//! bypassed: samples drive the retriever and generator directly.

pub mod evaluator;
pub mod metrics;

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

pub use evaluator::QualityEvaluator;
pub use metrics::TokenF1;

use crate::Result;

/// Evaluation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvalMode {
    /// Generation only, no retrieval
    Llm,
    /// Retrieval-augmented generation
    Rag,
}

impl EvalMode {
    pub fn as_str(self) -> &'static str {
        match self {
            EvalMode::Llm => "llm",
            EvalMode::Rag => "rag",
        }
    }
}

impl std::str::FromStr for EvalMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "llm" => Ok(EvalMode::Llm),
            "rag" => Ok(EvalMode::Rag),
            other => Err(format!("unknown eval mode: {other} (expected llm or rag)")),
        }
    }
}

/// One labeled evaluation sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSample {
    pub id: i64,
    pub question: String,
    pub reference_answer: String,
    /// Overrides the mode's default retrieval behavior for this sample
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_retrieval: Option<bool>,
}

/// Metrics for one sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleMetrics {
    pub exact_match: f64,
    pub token_f1: TokenF1,
    pub embedding_cosine: f64,
}

/// Per-sample evaluation detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleResult {
    pub id: i64,
    pub question: String,
    pub reference_answer: String,
    pub answer: String,
    pub latency_sec: f64,
    pub metrics: SampleMetrics,
}

/// Aggregate metrics over a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSummary {
    pub count: usize,
    pub exact_match: f64,
    pub token_precision: f64,
    pub token_recall: f64,
    pub token_f1: f64,
    pub embedding_cosine: f64,
    pub avg_latency_sec: f64,
}

/// Full evaluation report artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    pub mode: String,
    pub summary: EvalSummary,
    pub results: Vec<SampleResult>,
}

/// Load a JSON dataset of evaluation samples
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Vec<EvalSample>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Persist a report as pretty-printed JSON
pub fn save_report<P: AsRef<Path>>(report: &EvalReport, path: P) -> Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}
