use thiserror::Error;

use crate::claim::ClaimError;
use crate::entities::EntityError;
use crate::index::IndexError;
use crate::scoring::ScoringError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A required capability is down. `reason` is for logs only.
    #[error("{capability} capability unavailable: {reason}")]
    CapabilityUnavailable { capability: String, reason: String },

    #[error("index error: {0}")]
    Index(IndexError),

    #[error("claim extractor setup failed: {0}")]
    Claim(#[from] ClaimError),

    #[error("analysis cancelled")]
    Cancelled,

    /// A blocking inference task panicked or was aborted.
    #[error("analysis worker failed: {0}")]
    Worker(String),
}

impl PipelineError {
    pub fn capability(capability: &str, reason: impl std::fmt::Display) -> Self {
        PipelineError::CapabilityUnavailable {
            capability: capability.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<IndexError> for PipelineError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::Embedding(e) => PipelineError::capability("embedding", e),
            other => PipelineError::Index(other),
        }
    }
}

impl From<ScoringError> for PipelineError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::CapabilityUnavailable { capability, reason } => {
                PipelineError::CapabilityUnavailable { capability, reason }
            }
            other => PipelineError::capability("scoring", other),
        }
    }
}

impl From<EntityError> for PipelineError {
    fn from(err: EntityError) -> Self {
        PipelineError::capability("entities", err)
    }
}
