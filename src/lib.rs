//! Satya library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! ## Pipeline
//! - [`Analyzer`], [`TextInput`], [`VerdictResult`] - End-to-end analysis
//! - [`CancelToken`] - Stops an analysis at the next stage boundary
//!
//! ## Components
//! - [`scoring`] - Sentiment, bias, sensationalism, factuality and toxicity signals
//! - [`claim`] - Claim extraction, summarization and paraphrase
//! - [`entities`] - Named entity recognition with per-language recognizers
//! - [`index`] - Fact-check similarity index with JSON snapshots
//! - [`verdict`] - Weighted verdict, confidence and explanation
//! - [`language`] - Language tag resolution and detection
//!
//! ## Models
//! - [`SentenceEncoder`], [`EncoderConfig`] - Sentence embeddings (candle BERT)
//! - [`BertTextClassifier`], [`ClassifierConfig`] - Sequence classification
//!
//! ## Server
//! - [`Config`], [`ConfigError`] - Environment configuration
//! - [`gateway`] - Axum router and handlers
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod claim;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod entities;
pub mod gateway;
pub mod index;
pub mod language;
pub mod pipeline;
pub mod scoring;
pub mod verdict;

pub use claim::{Claim, ClaimError, ClaimExtractor, GenAiSummarizer, Summarizer};
pub use config::{Config, ConfigError};
pub use embedding::{Embedder, EmbeddingError, EncoderConfig, SentenceEncoder};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;
pub use entities::{Entity, EntityError, EntityRecognizer, RecognizerRegistry};
pub use index::{
    DistanceMetric, FactCheckIndex, IndexError, SourceCandidate, SourceMetadata,
};
pub use pipeline::{Analyzer, CancelToken, PipelineError, TextInput, VerdictResult};
pub use scoring::{
    BertTextClassifier, ClassifierConfig, ModelScorer, ScoreSet, ScoringError, Sentiment,
    SentimentLabel, TextClassifier, TextScorer,
};
pub use verdict::{Verdict, VerdictOutcome, aggregate};
