use std::path::PathBuf;

use crate::embedding::error::EmbeddingError;

/// Default sentence-encoder output dimension.
pub const ENCODER_EMBEDDING_DIM: usize = crate::constants::DEFAULT_EMBEDDING_DIM;

/// Default sentence-encoder max sequence length.
pub const ENCODER_MAX_SEQ_LEN: usize = crate::constants::DEFAULT_MAX_SEQ_LEN;

#[derive(Debug, Clone)]
/// Configuration for [`SentenceEncoder`](super::SentenceEncoder).
pub struct EncoderConfig {
    /// Model directory (config.json, model.safetensors, tokenizer.json).
    pub model_path: PathBuf,
    /// Max tokens to consider.
    pub max_seq_len: usize,
    /// Output dimension in stub mode. A loaded model reports its own hidden size.
    pub embedding_dim: usize,
    /// Scale model output to unit length.
    pub normalize: bool,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::new(),
            max_seq_len: ENCODER_MAX_SEQ_LEN,
            embedding_dim: ENCODER_EMBEDDING_DIM,
            normalize: false,
            testing_stub: false,
        }
    }
}

impl EncoderConfig {
    /// Creates a config for a model directory.
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: model_path.into(),
            ..Default::default()
        }
    }

    /// Creates a stub config (no model files; produces deterministic embeddings).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    /// Stub config with a custom output dimension.
    pub fn stub_with_dim(embedding_dim: usize) -> Self {
        Self {
            embedding_dim,
            ..Self::stub()
        }
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Validates required fields for non-stub mode.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.embedding_dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding_dim must be positive".to_string(),
            });
        }

        if self.testing_stub {
            return Ok(());
        }

        if self.model_path.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_path is required (stubbing is disabled)".to_string(),
            });
        }

        if !self.model_path.exists() {
            return Err(EmbeddingError::ModelNotFound {
                path: self.model_path.clone(),
            });
        }

        Ok(())
    }

    /// Returns `true` if the model directory holds weights, config and tokenizer.
    pub fn model_available(&self) -> bool {
        ["config.json", "model.safetensors", "tokenizer.json"]
            .iter()
            .all(|name| self.model_path.join(name).exists())
    }
}
