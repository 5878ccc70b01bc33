use std::path::PathBuf;

use candle_core::{D, Device, Tensor};
use tracing::{debug, info};

use crate::constants::CLASSIFIER_MAX_CHARS;
use crate::embedding::bert::BertSequenceClassifier;
use crate::embedding::device::select_device;
use crate::embedding::utils::load_tokenizer;

use super::error::ScoringError;

/// Token cap applied by the classifier tokenizer.
pub const CLASSIFIER_MAX_SEQ_LEN: usize = 512;

/// Label distribution for one input, top label first.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub score: f64,
    /// Every label with its probability, in model label order.
    pub distribution: Vec<(String, f64)>,
}

impl Classification {
    /// Builds a classification from per-label probabilities.
    pub fn from_distribution(distribution: Vec<(String, f64)>) -> Option<Self> {
        let (label, score) = distribution
            .iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .cloned()?;
        Some(Self {
            label,
            score,
            distribution,
        })
    }

    /// Probability of the first label matching `predicate` (0 if none does).
    pub fn probability_of(&self, predicate: impl Fn(&str) -> bool) -> f64 {
        self.distribution
            .iter()
            .find(|(label, _)| predicate(label))
            .map(|(_, p)| *p)
            .unwrap_or(0.0)
    }
}

/// A sequence classifier over raw text (sentiment, bias, toxicity...).
pub trait TextClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Classification, ScoringError>;
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Model directory (config.json, model.safetensors, tokenizer.json).
    pub model_path: PathBuf,
    pub max_seq_len: usize,
}

impl ClassifierConfig {
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: model_path.into(),
            max_seq_len: CLASSIFIER_MAX_SEQ_LEN,
        }
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.model_path.as_os_str().is_empty() {
            return Err(ScoringError::ModelLoadFailed {
                reason: "model_path cannot be empty".to_string(),
            });
        }

        for name in ["config.json", "model.safetensors", "tokenizer.json"] {
            if !self.model_path.join(name).exists() {
                return Err(ScoringError::ModelLoadFailed {
                    reason: format!("Missing {} in {}", name, self.model_path.display()),
                });
            }
        }

        Ok(())
    }
}

/// BERT/RoBERTa sequence classifier loaded from disk.
pub struct BertTextClassifier {
    model: BertSequenceClassifier,
    tokenizer: tokenizers::Tokenizer,
    device: Device,
    name: String,
}

impl std::fmt::Debug for BertTextClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BertTextClassifier")
            .field("name", &self.name)
            .field("device", &format!("{:?}", self.device))
            .field("labels", &self.model.labels())
            .finish()
    }
}

impl BertTextClassifier {
    /// Loads a classifier; `name` is used in logs only.
    pub fn load(name: &str, config: ClassifierConfig) -> Result<Self, ScoringError> {
        config.validate()?;

        let device = select_device(name)?;

        info!(
            classifier = name,
            model_path = %config.model_path.display(),
            "Loading classifier"
        );

        let model = BertSequenceClassifier::load(&config.model_path, &device).map_err(|e| {
            ScoringError::ModelLoadFailed {
                reason: format!("Failed to load {} classifier: {}", name, e),
            }
        })?;

        let tokenizer = load_tokenizer(&config.model_path, config.max_seq_len).map_err(|e| {
            ScoringError::ModelLoadFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        info!(classifier = name, labels = ?model.labels(), "Classifier loaded");

        Ok(Self {
            model,
            tokenizer,
            device,
            name: name.to_string(),
        })
    }

    pub fn labels(&self) -> &[String] {
        self.model.labels()
    }
}

impl TextClassifier for BertTextClassifier {
    fn classify(&self, text: &str) -> Result<Classification, ScoringError> {
        let text = crate::constants::char_prefix(text, CLASSIFIER_MAX_CHARS);

        let encoding =
            self.tokenizer
                .encode(text, true)
                .map_err(|e| ScoringError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        debug!(
            classifier = %self.name,
            token_count = encoding.get_ids().len(),
            "Classifying text"
        );

        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(encoding.get_type_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let logits = self
            .model
            .forward(&input_ids, &type_ids, Some(&attention_mask))?;
        let probs = candle_nn::ops::softmax(&logits, D::Minus1)?
            .squeeze(0)?
            .to_vec1::<f32>()?;

        let distribution: Vec<(String, f64)> = self
            .model
            .labels()
            .iter()
            .cloned()
            .zip(probs.into_iter().map(f64::from))
            .collect();

        Classification::from_distribution(distribution).ok_or_else(|| {
            ScoringError::InvalidOutput {
                reason: format!("{} classifier produced no labels", self.name),
            }
        })
    }
}
