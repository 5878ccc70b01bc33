use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum EntityError {
    #[error("failed to load recognizer: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("recognizer inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("model error: {0}")]
    Model(#[from] EmbeddingError),

    /// The recognizer backend cannot be reached at all.
    #[error("entity recognizer unavailable: {reason}")]
    Unavailable { reason: String },
}

impl EntityError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, EntityError::Unavailable { .. })
    }
}

impl From<candle_core::Error> for EntityError {
    fn from(err: candle_core::Error) -> Self {
        EntityError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}
