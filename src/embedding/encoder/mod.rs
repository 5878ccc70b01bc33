//! Sentence encoder (BERT + mean pooling).
//!
//! Use [`EncoderConfig::stub`] for tests/examples without model files.

/// Encoder configuration.
pub mod config;


pub use config::{ENCODER_EMBEDDING_DIM, ENCODER_MAX_SEQ_LEN, EncoderConfig};

use candle_core::{DType, Device, Tensor};
use tracing::{debug, info, warn};

use crate::embedding::Embedder;
use crate::embedding::bert::BertEncoder;
use crate::embedding::device::select_device;
use crate::embedding::error::EmbeddingError;
use crate::embedding::utils::{l2_normalize, load_tokenizer};

enum EncoderBackend {
    Model {
        model: BertEncoder,
        tokenizer: tokenizers::Tokenizer,
        device: Device,
    },
    Stub,
}

/// Embedding generator for fact-check retrieval (supports stub mode).
pub struct SentenceEncoder {
    backend: EncoderBackend,
    config: EncoderConfig,
    dimension: usize,
}

impl std::fmt::Debug for SentenceEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEncoder")
            .field(
                "backend",
                &match &self.backend {
                    EncoderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EncoderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("dimension", &self.dimension)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl SentenceEncoder {
    /// Loads the encoder from a config (stub mode is supported).
    pub fn load(config: EncoderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("Sentence encoder running in STUB mode (testing only)");
            return Ok(Self {
                backend: EncoderBackend::Stub,
                dimension: config.embedding_dim,
                config,
            });
        }

        if !config.model_available() {
            return Err(EmbeddingError::ModelNotFound {
                path: config.model_path.clone(),
            });
        }

        let device = select_device("encoder")?;

        let tokenizer = load_tokenizer(&config.model_path, config.max_seq_len).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        let model = BertEncoder::load(&config.model_path, &device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load encoder: {}", e),
            }
        })?;

        let dimension = model.hidden_size();

        info!(
            model_path = %config.model_path.display(),
            dimension,
            max_seq_len = config.max_seq_len,
            "Sentence encoder loaded"
        );

        Ok(Self {
            backend: EncoderBackend::Model {
                model,
                tokenizer,
                device,
            },
            config,
            dimension,
        })
    }

    /// Creates a stub encoder (deterministic embeddings, no model files).
    pub fn stub() -> Self {
        let config = EncoderConfig::stub();
        Self {
            backend: EncoderBackend::Stub,
            dimension: config.embedding_dim,
            config,
        }
    }

    /// Generates an embedding for a single string.
    pub fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match &self.backend {
            EncoderBackend::Model {
                model,
                tokenizer,
                device,
            } => self.embed_with_model(text, model, tokenizer, device),
            EncoderBackend::Stub => Ok(self.embed_stub(text)),
        }
    }

    fn embed_with_model(
        &self,
        text: &str,
        model: &BertEncoder,
        tokenizer: &tokenizers::Tokenizer,
        device: &Device,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let encoding =
            tokenizer
                .encode(text, true)
                .map_err(|e| EmbeddingError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        if encoding.get_ids().is_empty() {
            return Ok(vec![0.0; self.dimension]);
        }

        debug!(
            text_len = text.len(),
            token_count = encoding.get_ids().len(),
            "Generating embedding (encoder forward pass)"
        );

        let input_ids = Tensor::new(encoding.get_ids(), device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(encoding.get_type_ids(), device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), device)?.unsqueeze(0)?;

        // [1, seq_len, hidden]
        let hidden = model.forward(&input_ids, &type_ids, Some(&attention_mask))?;

        // Mean pooling over non-padding tokens.
        let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?;
        let pooled = summed.broadcast_div(&counts)?.squeeze(0)?;

        let mut embedding = pooled.to_vec1::<f32>()?;
        if self.config.normalize {
            l2_normalize(&mut embedding);
        }

        Ok(embedding)
    }

    fn embed_stub(&self, text: &str) -> Vec<f32> {
        let digest = blake3::hash(text.as_bytes());
        let mut seed_bytes = [0u8; 8];
        seed_bytes.copy_from_slice(&digest.as_bytes()[..8]);
        let mut state = u64::from_le_bytes(seed_bytes);

        let mut embedding = Vec::with_capacity(self.dimension);
        for _ in 0..self.dimension {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let value = ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0;
            embedding.push(value);
        }

        l2_normalize(&mut embedding);
        embedding
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EncoderBackend::Stub)
    }

    /// Returns the encoder configuration.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

impl Embedder for SentenceEncoder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed_one(text)).collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn is_stub(&self) -> bool {
        SentenceEncoder::is_stub(self)
    }
}
