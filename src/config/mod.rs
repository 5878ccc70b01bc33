//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `SATYA_*` environment variables.
//! Unset model paths put the corresponding component in stub mode.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::constants::DEFAULT_TOP_K;
use crate::index::DistanceMetric;

/// Service configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `SATYA_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8000`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Shared secret expected in the `X-API-Key` header.
    pub api_key: Option<String>,

    /// Sentence-encoder directory (config.json, model.safetensors, tokenizer.json).
    pub embedding_model_path: Option<PathBuf>,

    /// Sentiment classifier directory.
    pub sentiment_model_path: Option<PathBuf>,

    /// Bias classifier directory.
    pub bias_model_path: Option<PathBuf>,

    /// Toxicity classifier directory. Unset means no toxicity signal.
    pub toxicity_model_path: Option<PathBuf>,

    /// Token-classification model used for English.
    pub ner_model_path: Option<PathBuf>,

    /// Token-classification model used for every other language.
    pub ner_multilingual_model_path: Option<PathBuf>,

    /// JSON snapshot used to pre-populate the fact-check index.
    pub index_snapshot_path: Option<PathBuf>,

    /// Distance used by the fact-check index. Default: euclidean.
    pub index_metric: DistanceMetric,

    /// Number of fact-check candidates returned per claim. Default: `5`.
    pub top_k: usize,

    /// Chat model used for abstractive claim summaries. Unset disables summarization.
    pub summarizer_model: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            api_key: None,
            embedding_model_path: None,
            sentiment_model_path: None,
            bias_model_path: None,
            toxicity_model_path: None,
            ner_model_path: None,
            ner_multilingual_model_path: None,
            index_snapshot_path: None,
            index_metric: DistanceMetric::default(),
            top_k: DEFAULT_TOP_K,
            summarizer_model: None,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "SATYA_PORT";
    const ENV_BIND_ADDR: &'static str = "SATYA_BIND_ADDR";
    const ENV_API_KEY: &'static str = "SATYA_API_KEY";
    const ENV_EMBEDDING_MODEL_PATH: &'static str = "SATYA_EMBEDDING_MODEL_PATH";
    const ENV_SENTIMENT_MODEL_PATH: &'static str = "SATYA_SENTIMENT_MODEL_PATH";
    const ENV_BIAS_MODEL_PATH: &'static str = "SATYA_BIAS_MODEL_PATH";
    const ENV_TOXICITY_MODEL_PATH: &'static str = "SATYA_TOXICITY_MODEL_PATH";
    const ENV_NER_MODEL_PATH: &'static str = "SATYA_NER_MODEL_PATH";
    const ENV_NER_MULTILINGUAL_MODEL_PATH: &'static str = "SATYA_NER_MULTILINGUAL_MODEL_PATH";
    const ENV_INDEX_SNAPSHOT_PATH: &'static str = "SATYA_INDEX_SNAPSHOT_PATH";
    const ENV_INDEX_METRIC: &'static str = "SATYA_INDEX_METRIC";
    const ENV_TOP_K: &'static str = "SATYA_TOP_K";
    const ENV_SUMMARIZER_MODEL: &'static str = "SATYA_SUMMARIZER_MODEL";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let api_key = Self::parse_optional_string_from_env(Self::ENV_API_KEY);
        let index_metric = Self::parse_metric_from_env(defaults.index_metric)?;
        let top_k = Self::parse_top_k_from_env(defaults.top_k)?;

        Ok(Self {
            port,
            bind_addr,
            api_key,
            embedding_model_path: Self::parse_optional_path_from_env(
                Self::ENV_EMBEDDING_MODEL_PATH,
            ),
            sentiment_model_path: Self::parse_optional_path_from_env(
                Self::ENV_SENTIMENT_MODEL_PATH,
            ),
            bias_model_path: Self::parse_optional_path_from_env(Self::ENV_BIAS_MODEL_PATH),
            toxicity_model_path: Self::parse_optional_path_from_env(Self::ENV_TOXICITY_MODEL_PATH),
            ner_model_path: Self::parse_optional_path_from_env(Self::ENV_NER_MODEL_PATH),
            ner_multilingual_model_path: Self::parse_optional_path_from_env(
                Self::ENV_NER_MULTILINGUAL_MODEL_PATH,
            ),
            index_snapshot_path: Self::parse_optional_path_from_env(Self::ENV_INDEX_SNAPSHOT_PATH),
            index_metric,
            top_k,
            summarizer_model: Self::parse_optional_string_from_env(Self::ENV_SUMMARIZER_MODEL),
        })
    }

    /// Validates paths and basic invariants.
    ///
    /// Model directories must exist. The index snapshot may be missing (the
    /// index then starts empty) but must not be a directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for path in [
            &self.embedding_model_path,
            &self.sentiment_model_path,
            &self.bias_model_path,
            &self.toxicity_model_path,
            &self.ner_model_path,
            &self.ner_multilingual_model_path,
        ]
        .into_iter()
        .flatten()
        {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if let Some(ref path) = self.index_snapshot_path
            && path.exists()
            && !path.is_file()
        {
            return Err(ConfigError::NotAFile { path: path.clone() });
        }

        if self.top_k == 0 {
            return Err(ConfigError::InvalidTopK {
                value: self.top_k.to_string(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_metric_from_env(default: DistanceMetric) -> Result<DistanceMetric, ConfigError> {
        match env::var(Self::ENV_INDEX_METRIC) {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidMetric { value }),
            Err(_) => Ok(default),
        }
    }

    fn parse_top_k_from_env(default: usize) -> Result<usize, ConfigError> {
        match env::var(Self::ENV_TOP_K) {
            Ok(value) => match value.trim().parse::<usize>() {
                Ok(k) if k > 0 => Ok(k),
                _ => Err(ConfigError::InvalidTopK { value }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        Self::parse_optional_string_from_env(var_name).map(PathBuf::from)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
