use std::path::{Path, PathBuf};

use candle_core::{D, Device, Tensor};
use tracing::{debug, info};

use crate::embedding::bert::BertTokenClassifier;
use crate::embedding::device::select_device;
use crate::embedding::utils::load_windowed_tokenizer;

use super::error::EntityError;
use super::types::{Entity, TokenTag};

/// Token cap for one NER window.
pub const RECOGNIZER_MAX_SEQ_LEN: usize = 512;

/// Tokens shared by consecutive windows of a long text.
pub const RECOGNIZER_WINDOW_STRIDE: usize = 128;

/// Finds named entities in one text.
pub trait EntityRecognizer: Send + Sync {
    /// Entities in source order. An empty vector is a valid answer.
    fn recognize(&self, text: &str) -> Result<Vec<Entity>, EntityError>;
}

/// Recognizer that never finds anything (no NER model configured).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecognizer;

impl EntityRecognizer for NullRecognizer {
    fn recognize(&self, _text: &str) -> Result<Vec<Entity>, EntityError> {
        Ok(Vec::new())
    }
}

/// Splits a BIO/BIOES label into (starts-new-entity, entity type).
fn split_label(label: &str) -> (bool, Option<&str>) {
    if label.eq_ignore_ascii_case("O") || label.is_empty() {
        return (false, None);
    }
    match label.split_once('-') {
        Some((prefix, kind)) if prefix.len() == 1 => {
            let begins = matches!(prefix, "B" | "S" | "b" | "s");
            (begins, Some(kind))
        }
        _ => (false, Some(label)),
    }
}

/// Joins per-window tags into one token sequence in source order.
///
/// Windows overlap by the tokenizer stride. A token already covered by an
/// earlier window is dropped, so each source byte is tagged once.
pub fn stitch_windows(windows: Vec<Vec<TokenTag>>) -> Vec<TokenTag> {
    let mut tags: Vec<TokenTag> = Vec::new();
    let mut covered = 0;

    for window in windows {
        for tag in window {
            if tag.start >= tag.end || tag.start < covered {
                continue;
            }
            covered = tag.end;
            tags.push(tag);
        }
    }

    tags
}

/// Groups per-token BIO tags into entity spans over `source`.
///
/// `I-` tokens extend a running entity of the same type. A `B-` token that
/// directly continues the previous token (a word piece) extends it too.
/// Tokens with empty offsets (special tokens) are ignored.
pub fn merge_bio(source: &str, tags: &[TokenTag]) -> Vec<Entity> {
    let mut entities = Vec::new();
    let mut current: Option<(usize, usize, &str)> = None;

    for tag in tags {
        if tag.start >= tag.end {
            continue;
        }

        let (begins, kind) = split_label(&tag.label);
        let Some(kind) = kind else {
            flush(source, &mut current, &mut entities);
            continue;
        };

        let extends = matches!(
            current,
            Some((_, end, running)) if running == kind && (!begins || end == tag.start)
        );
        if extends {
            if let Some(running) = current.as_mut() {
                running.1 = tag.end;
            }
        } else {
            flush(source, &mut current, &mut entities);
            current = Some((tag.start, tag.end, kind));
        }
    }
    flush(source, &mut current, &mut entities);

    entities
}

fn flush(source: &str, current: &mut Option<(usize, usize, &str)>, out: &mut Vec<Entity>) {
    if let Some((start, end, kind)) = current.take()
        && let Some(entity) = Entity::from_span(source, start, end, kind)
    {
        out.push(entity);
    }
}

/// BERT token-classification NER model.
pub struct BertEntityRecognizer {
    model: BertTokenClassifier,
    tokenizer: tokenizers::Tokenizer,
    device: Device,
    model_path: PathBuf,
}

impl std::fmt::Debug for BertEntityRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BertEntityRecognizer")
            .field("model_path", &self.model_path)
            .field("device", &format!("{:?}", self.device))
            .field("labels", &self.model.labels().len())
            .finish()
    }
}

impl BertEntityRecognizer {
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self, EntityError> {
        let model_path = model_path.as_ref();
        for name in ["config.json", "model.safetensors", "tokenizer.json"] {
            if !model_path.join(name).exists() {
                return Err(EntityError::ModelLoadFailed {
                    reason: format!("Missing {} in {}", name, model_path.display()),
                });
            }
        }

        let device = select_device("ner")?;

        info!(model_path = %model_path.display(), "Loading NER model");

        let model = BertTokenClassifier::load(model_path, &device).map_err(|e| {
            EntityError::ModelLoadFailed {
                reason: format!("Failed to load NER model: {}", e),
            }
        })?;
        let tokenizer = load_windowed_tokenizer(
            model_path,
            RECOGNIZER_MAX_SEQ_LEN,
            RECOGNIZER_WINDOW_STRIDE,
        )
        .map_err(|e| {
            EntityError::ModelLoadFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        info!(labels = model.labels().len(), "NER model loaded");

        Ok(Self {
            model,
            tokenizer,
            device,
            model_path: model_path.to_path_buf(),
        })
    }

    fn tag_tokens(&self, text: &str) -> Result<Vec<TokenTag>, EntityError> {
        let mut encoding =
            self.tokenizer
                .encode(text, true)
                .map_err(|e| EntityError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        let overflowing = encoding.take_overflowing();
        let mut windows = Vec::with_capacity(1 + overflowing.len());
        windows.push(self.tag_window(&encoding)?);
        for window in &overflowing {
            windows.push(self.tag_window(window)?);
        }

        if windows.len() > 1 {
            debug!(windows = windows.len(), "Long text tagged in overlapping windows");
        }

        Ok(stitch_windows(windows))
    }

    fn tag_window(&self, encoding: &tokenizers::Encoding) -> Result<Vec<TokenTag>, EntityError> {
        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(encoding.get_type_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let predictions = self
            .model
            .forward(&input_ids, &type_ids, Some(&attention_mask))?
            .squeeze(0)?
            .argmax(D::Minus1)?
            .to_vec1::<u32>()?;

        let labels = self.model.labels();
        let special = encoding.get_special_tokens_mask();

        let tags = encoding
            .get_offsets()
            .iter()
            .zip(predictions)
            .enumerate()
            .filter(|(i, _)| special.get(*i).copied().unwrap_or(0) == 0)
            .filter_map(|(_, (&(start, end), label_id))| {
                labels
                    .get(label_id as usize)
                    .map(|label| TokenTag::new(start, end, label.as_str()))
            })
            .collect();

        Ok(tags)
    }
}

impl EntityRecognizer for BertEntityRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<Entity>, EntityError> {
        let tags = self.tag_tokens(text)?;
        let entities = merge_bio(text, &tags);
        debug!(tokens = tags.len(), entities = entities.len(), "Entities recognized");
        Ok(entities)
    }
}
