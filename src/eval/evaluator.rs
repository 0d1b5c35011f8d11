//! Batch evaluation of the retrieval + generation pipeline

use std::sync::Arc;
use std::time::Instant;

use tracing::info;
use tracing::warn;

use super::metrics;
use super::EvalMode;
use super::EvalReport;
use super::EvalSample;
use super::EvalSummary;
use super::SampleMetrics;
use super::SampleResult;
use crate::embeddings::cosine_similarity;
use crate::embeddings::EmbeddingService;
use crate::errors::Result;
use crate::llm::LlmService;
use crate::rag::ContextAssembler;
use crate::rag::Retriever;

/// Evaluator driving the retriever and generator directly, bypassing
/// conversation persistence
pub struct QualityEvaluator {
    retriever: Option<Retriever>,
    assembler: ContextAssembler,
    llm: Arc<LlmService>,
    embeddings: Arc<EmbeddingService>,
    retrieval_limit: usize,
    similarity_threshold: f32,
}

impl QualityEvaluator {
    /// Create an evaluator; `retriever` may be omitted for LLM-only runs
    pub fn new(
        retriever: Option<Retriever>,
        llm: Arc<LlmService>,
        embeddings: Arc<EmbeddingService>,
        config: &crate::config::AppConfig,
    ) -> Self {
        Self {
            retriever,
            assembler: ContextAssembler::from_config(&config.context),
            llm,
            embeddings,
            retrieval_limit: config.retrieval.limit,
            similarity_threshold: config.retrieval.similarity_threshold,
        }
    }

    /// Evaluate a dataset and build the aggregate report.
    ///
    /// Retrieval failure for a sample degrades that sample to LLM-only and
    /// is logged; it never aborts the batch.
    pub async fn evaluate(&self, dataset: &[EvalSample], mode: EvalMode) -> Result<EvalReport> {
        info!("Evaluating {} samples in {} mode", dataset.len(), mode.as_str());

        let mut results = Vec::with_capacity(dataset.len());
        for sample in dataset {
            results.push(self.evaluate_one(sample, mode).await?);
        }

        let summary = summarize(&results);
        Ok(EvalReport {
            mode: mode.as_str().to_string(),
            summary,
            results,
        })
    }

    async fn evaluate_one(&self, sample: &EvalSample, mode: EvalMode) -> Result<SampleResult> {
        let use_retrieval = sample.use_retrieval.unwrap_or(mode == EvalMode::Rag);

        let chunks = if mode == EvalMode::Rag && use_retrieval {
            match &self.retriever {
                Some(retriever) => retriever
                    .retrieve(
                        &sample.question,
                        self.retrieval_limit,
                        self.similarity_threshold,
                    )
                    .await
                    .unwrap_or_else(|e| {
                        warn!(
                            "Retrieval failed for sample {} ({}); falling back to LLM-only",
                            sample.id, e
                        );
                        Vec::new()
                    }),
                None => Vec::new(),
            }
        } else {
            Vec::new()
        };

        // Empty history: samples are independent single turns
        let prompt = self.assembler.build(&chunks, &[], &sample.question);

        let start = Instant::now();
        let answer = self.llm.generate(&prompt).await;
        let latency_sec = start.elapsed().as_secs_f64();

        let exact = metrics::exact_match(&answer, &sample.reference_answer);
        let token_f1 = metrics::token_f1(&answer, &sample.reference_answer);
        let embedding_cosine = if sample.reference_answer.is_empty() {
            0.0
        } else {
            self.prediction_cosine(&answer, &sample.reference_answer)
                .await?
        };

        Ok(SampleResult {
            id: sample.id,
            question: sample.question.clone(),
            reference_answer: sample.reference_answer.clone(),
            answer,
            latency_sec,
            metrics: SampleMetrics {
                exact_match: exact,
                token_f1,
                embedding_cosine,
            },
        })
    }

    async fn prediction_cosine(&self, prediction: &str, reference: &str) -> Result<f64> {
        let texts = vec![prediction.to_string(), reference.to_string()];
        let vectors = self.embeddings.encode_batch(&texts).await?;
        Ok(f64::from(cosine_similarity(&vectors[0], &vectors[1])))
    }
}

/// Arithmetic means over the per-sample results
fn summarize(results: &[SampleResult]) -> EvalSummary {
    let n = results.len();
    if n == 0 {
        return EvalSummary {
            count: 0,
            exact_match: 0.0,
            token_precision: 0.0,
            token_recall: 0.0,
            token_f1: 0.0,
            embedding_cosine: 0.0,
            avg_latency_sec: 0.0,
        };
    }

    let mean = |f: &dyn Fn(&SampleResult) -> f64| -> f64 {
        results.iter().map(f).sum::<f64>() / n as f64
    };

    EvalSummary {
        count: n,
        exact_match: mean(&|r| r.metrics.exact_match),
        token_precision: mean(&|r| r.metrics.token_f1.precision),
        token_recall: mean(&|r| r.metrics.token_f1.recall),
        token_f1: mean(&|r| r.metrics.token_f1.f1),
        embedding_cosine: mean(&|r| r.metrics.embedding_cosine),
        avg_latency_sec: mean(&|r| r.latency_sec),
    }
}
