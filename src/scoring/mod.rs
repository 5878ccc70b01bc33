//! Text signals: sentiment, bias, sensationalism, factuality, toxicity.
//!
//! [`TextScorer`] exposes one estimator per signal. [`score_text`] runs all of
//! them and folds any non-fatal failure into that signal's neutral default, so
//! one broken classifier never blocks a verdict.
//!
//! Sensationalism and factuality are lexical ([`heuristics`]). The other three
//! are backed by [`TextClassifier`]s inside [`ModelScorer`].

pub mod classifier;
pub mod error;
pub mod heuristics;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod scorer;
pub mod types;


pub use classifier::{BertTextClassifier, Classification, ClassifierConfig, TextClassifier};
pub use error::ScoringError;
pub use scorer::{ModelScorer, TextScorer, score_text};
pub use types::{
    DegradedSignal, ScoreReport, ScoreSet, Sentiment, SentimentLabel, Signal, SignalKind,
};
