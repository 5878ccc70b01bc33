use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum ScoringError {
    /// No model is configured for this signal.
    #[error("no {signal} model configured")]
    ModelNotConfigured { signal: &'static str },

    #[error("failed to load classifier: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("classifier inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("classifier returned an unusable value: {reason}")]
    InvalidOutput { reason: String },

    #[error("model error: {0}")]
    Model(#[from] EmbeddingError),

    /// The classification backend cannot be reached at all.
    #[error("{capability} capability unavailable: {reason}")]
    CapabilityUnavailable { capability: String, reason: String },
}

impl ScoringError {
    /// Fatal errors abort the request; everything else degrades one signal.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScoringError::CapabilityUnavailable { .. })
    }
}

impl From<candle_core::Error> for ScoringError {
    fn from(err: candle_core::Error) -> Self {
        ScoringError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}
