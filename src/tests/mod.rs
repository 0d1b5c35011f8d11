//! Integration tests exercising the pipeline against in-process fakes
//!
//! The storage, embedding and generation collaborators are replaced with
//! deterministic substitutes so the full ingestion -> retrieval -> context
//! -> generation flow runs without external services.

pub mod support;

mod eval_tests;
