//! BERT-family model heads on top of `candle_transformers`' encoders.
//!
//! Model directories follow the Hugging Face layout: `config.json`,
//! `model.safetensors` and `tokenizer.json`. The encoder is chosen from the
//! config's `model_type`: `bert` loads `BertModel`, while `roberta` and
//! `xlm-roberta` load `XLMRobertaModel`, which offsets position ids past the
//! padding index. Other model types are rejected.

use candle::{DType, Device, IndexOp, Result, Tensor};
use candle_core as candle;
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{self, BertModel};
use candle_transformers::models::xlm_roberta::{self, XLMRobertaModel};
use std::path::Path;

/// Encoder family named by `model_type` in `config.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    Bert,
    Roberta,
}

impl Architecture {
    /// A missing `model_type` is read as BERT.
    pub fn from_config(config: &serde_json::Value) -> Result<Self> {
        match config.get("model_type").and_then(|v| v.as_str()) {
            None | Some("bert") => Ok(Self::Bert),
            Some("roberta" | "xlm-roberta") => Ok(Self::Roberta),
            Some(other) => Err(candle::Error::Msg(format!(
                "Unsupported model_type '{}'",
                other
            ))),
        }
    }

    fn weights_prefix(self) -> &'static str {
        match self {
            Self::Bert => "bert",
            Self::Roberta => "roberta",
        }
    }
}

enum Encoder {
    Bert(BertModel),
    Roberta(XLMRobertaModel),
}

impl Encoder {
    fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        match self {
            Self::Bert(model) => model.forward(input_ids, token_type_ids, attention_mask),
            Self::Roberta(model) => {
                let mask = match attention_mask {
                    Some(mask) => mask.clone(),
                    None => input_ids.ones_like()?,
                };
                model.forward(input_ids, &mask, token_type_ids, None, None, None)
            }
        }
    }
}

enum ModelConfig {
    Bert(bert::Config),
    Roberta(xlm_roberta::Config),
}

struct ModelFiles {
    architecture: Architecture,
    config: ModelConfig,
    hidden_size: usize,
    labels: Vec<String>,
    vb: VarBuilder<'static>,
}

impl ModelFiles {
    fn open(model_dir: &Path, device: &Device) -> Result<Self> {
        let config_path = model_dir.join("config.json");
        let weights_path = model_dir.join("model.safetensors");

        let config_content = std::fs::read_to_string(config_path)?;
        let raw: serde_json::Value = serde_json::from_str(&config_content)
            .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))?;

        let architecture = Architecture::from_config(&raw)?;
        let (config, hidden_size) = match architecture {
            Architecture::Bert => {
                let config: bert::Config = serde_json::from_value(raw.clone())
                    .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))?;
                let hidden_size = config.hidden_size;
                (ModelConfig::Bert(config), hidden_size)
            }
            Architecture::Roberta => {
                let config: xlm_roberta::Config = serde_json::from_value(raw.clone())
                    .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))?;
                let hidden_size = config.hidden_size;
                (ModelConfig::Roberta(config), hidden_size)
            }
        };

        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? };

        Ok(Self {
            architecture,
            config,
            hidden_size,
            labels: parse_labels(&raw),
            vb,
        })
    }

    /// Encoder weights sit under `bert.`/`roberta.` in task checkpoints and
    /// at the root in bare encoder checkpoints.
    fn encoder(&self) -> Result<Encoder> {
        let prefix = self.architecture.weights_prefix();
        let vb = if self
            .vb
            .contains_tensor(&format!("{}.embeddings.word_embeddings.weight", prefix))
        {
            self.vb.pp(prefix)
        } else {
            self.vb.clone()
        };

        match &self.config {
            ModelConfig::Bert(config) => Ok(Encoder::Bert(BertModel::load(vb, config)?)),
            ModelConfig::Roberta(config) => {
                Ok(Encoder::Roberta(XLMRobertaModel::new(config, vb)?))
            }
        }
    }
}

/// Reads `id2label` from a model config, ordered by id.
///
/// Falls back to `LABEL_0`, `LABEL_1` when the map is missing.
pub fn parse_labels(config: &serde_json::Value) -> Vec<String> {
    let mut labels: Vec<(usize, String)> = config
        .get("id2label")
        .and_then(|v| v.as_object())
        .map(|map| {
            map.iter()
                .filter_map(|(id, label)| {
                    Some((id.parse::<usize>().ok()?, label.as_str()?.to_string()))
                })
                .collect()
        })
        .unwrap_or_default();

    if labels.is_empty() {
        return vec!["LABEL_0".to_string(), "LABEL_1".to_string()];
    }

    labels.sort_by_key(|(id, _)| *id);
    labels.into_iter().map(|(_, label)| label).collect()
}

/// Plain encoder used for sentence embeddings.
#[derive(Clone)]
pub struct BertEncoder {
    model: std::sync::Arc<Encoder>,
    hidden_size: usize,
}

impl BertEncoder {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let files = ModelFiles::open(model_dir.as_ref(), device)?;
        let model = files.encoder()?;

        Ok(Self {
            model: std::sync::Arc::new(model),
            hidden_size: files.hidden_size,
        })
    }

    /// Returns hidden states shaped `[batch, seq_len, hidden_size]`.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        self.model
            .forward(input_ids, token_type_ids, attention_mask)
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }
}

enum SequenceHead {
    /// BERT: tanh(pooler(CLS)) -> classifier.
    Pooled { pooler: Linear, classifier: Linear },
    /// RoBERTa: out_proj(tanh(dense(CLS))).
    Roberta { dense: Linear, out_proj: Linear },
    /// Classifier applied directly to CLS.
    Direct { classifier: Linear },
}

impl SequenceHead {
    fn load(files: &ModelFiles, num_labels: usize) -> Result<Self> {
        let hidden = files.hidden_size;
        let vb = &files.vb;

        if vb.contains_tensor("classifier.out_proj.weight") {
            return Ok(Self::Roberta {
                dense: candle_nn::linear(hidden, hidden, vb.pp("classifier").pp("dense"))?,
                out_proj: candle_nn::linear(hidden, num_labels, vb.pp("classifier").pp("out_proj"))?,
            });
        }

        let classifier = candle_nn::linear(hidden, num_labels, vb.pp("classifier"))?;
        if vb.contains_tensor("bert.pooler.dense.weight") {
            let pooler = candle_nn::linear(hidden, hidden, vb.pp("bert").pp("pooler").pp("dense"))?;
            Ok(Self::Pooled { pooler, classifier })
        } else {
            Ok(Self::Direct { classifier })
        }
    }

    fn forward(&self, cls: &Tensor) -> Result<Tensor> {
        match self {
            Self::Pooled { pooler, classifier } => classifier.forward(&pooler.forward(cls)?.tanh()?),
            Self::Roberta { dense, out_proj } => out_proj.forward(&dense.forward(cls)?.tanh()?),
            Self::Direct { classifier } => classifier.forward(cls),
        }
    }
}

struct SequenceClassifierImpl {
    bert: Encoder,
    head: SequenceHead,
}

/// Sequence classifier: one label distribution per input.
#[derive(Clone)]
pub struct BertSequenceClassifier {
    inner: std::sync::Arc<SequenceClassifierImpl>,
    labels: Vec<String>,
}

impl BertSequenceClassifier {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let files = ModelFiles::open(model_dir.as_ref(), device)?;
        let bert = files.encoder()?;
        let head = SequenceHead::load(&files, files.labels.len())?;

        Ok(Self {
            inner: std::sync::Arc::new(SequenceClassifierImpl { bert, head }),
            labels: files.labels,
        })
    }

    /// Returns logits shaped `[batch, num_labels]`.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        let output = self
            .inner
            .bert
            .forward(input_ids, token_type_ids, attention_mask)?;
        let cls_token = output.i((.., 0, ..))?;
        self.inner.head.forward(&cls_token)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

struct TokenClassifierImpl {
    bert: Encoder,
    classifier: Linear,
}

/// Token classifier: one label distribution per token (NER).
#[derive(Clone)]
pub struct BertTokenClassifier {
    inner: std::sync::Arc<TokenClassifierImpl>,
    labels: Vec<String>,
}

impl BertTokenClassifier {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let files = ModelFiles::open(model_dir.as_ref(), device)?;
        let bert = files.encoder()?;
        let classifier = candle_nn::linear(
            files.hidden_size,
            files.labels.len(),
            files.vb.pp("classifier"),
        )?;

        Ok(Self {
            inner: std::sync::Arc::new(TokenClassifierImpl { bert, classifier }),
            labels: files.labels,
        })
    }

    /// Returns logits shaped `[batch, seq_len, num_labels]`.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        let output = self
            .inner
            .bert
            .forward(input_ids, token_type_ids, attention_mask)?;
        self.inner.classifier.forward(&output)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels_ordered_by_id() {
        let config = serde_json::json!({
            "id2label": {"2": "positive", "0": "negative", "1": "neutral"}
        });
        assert_eq!(parse_labels(&config), vec!["negative", "neutral", "positive"]);
    }

    #[test]
    fn test_parse_labels_default() {
        let config = serde_json::json!({"hidden_size": 384});
        assert_eq!(parse_labels(&config), vec!["LABEL_0", "LABEL_1"]);
    }

    #[test]
    fn test_parse_labels_skips_malformed_ids() {
        let config = serde_json::json!({
            "id2label": {"x": "junk", "0": "O", "1": "B-PER"}
        });
        assert_eq!(parse_labels(&config), vec!["O", "B-PER"]);
    }

    #[test]
    fn test_architecture_from_model_type() {
        let arch = |v| Architecture::from_config(&v).unwrap();
        assert_eq!(arch(serde_json::json!({"model_type": "bert"})), Architecture::Bert);
        assert_eq!(arch(serde_json::json!({"hidden_size": 384})), Architecture::Bert);
        assert_eq!(
            arch(serde_json::json!({"model_type": "roberta"})),
            Architecture::Roberta
        );
        assert_eq!(
            arch(serde_json::json!({"model_type": "xlm-roberta"})),
            Architecture::Roberta
        );
    }

    #[test]
    fn test_unsupported_model_type_rejected_before_weights() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"model_type": "distilbert", "dim": 768}"#,
        )
        .unwrap();

        let err = BertSequenceClassifier::load(dir.path(), &Device::Cpu)
            .err()
            .unwrap();
        assert!(err.to_string().contains("distilbert"), "{err}");
        assert!(BertTokenClassifier::load(dir.path(), &Device::Cpu).is_err());
    }

    #[test]
    fn test_load_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(BertEncoder::load(dir.path(), &Device::Cpu).is_err());
        assert!(BertSequenceClassifier::load(dir.path(), &Device::Cpu).is_err());
    }
}
