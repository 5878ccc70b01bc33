use std::path::PathBuf;

use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum IndexError {
    /// `texts` and `sources` have different lengths.
    #[error("shape mismatch: {texts} texts but {sources} sources")]
    ShapeMismatch { texts: usize, sources: usize },

    #[error("invalid vector dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedder returned {actual} vectors for {expected} texts")]
    EmbeddingCountMismatch { expected: usize, actual: usize },

    #[error("k must be at least 1")]
    InvalidK,

    #[error("unknown distance metric '{value}'")]
    UnknownMetric { value: String },

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("failed to read snapshot {path}: {source}")]
    SnapshotIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot {path}: {reason}")]
    SnapshotInvalid { path: PathBuf, reason: String },
}

impl IndexError {
    /// Shape and dimension violations: the caller sent a bad batch.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            IndexError::ShapeMismatch { .. }
                | IndexError::DimensionMismatch { .. }
                | IndexError::EmbeddingCountMismatch { .. }
        )
    }
}
