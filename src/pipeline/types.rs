use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_LANGUAGE;
use crate::entities::Entity;
use crate::index::SourceCandidate;
use crate::scoring::{DegradedSignal, ScoreSet};
use crate::verdict::Verdict;

use super::error::PipelineError;

/// One analysis request. Text is never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInput {
    text: String,
    url: Option<String>,
    language: String,
}

impl TextInput {
    /// Rejects empty and whitespace-only text.
    pub fn new(text: impl Into<String>) -> Result<Self, PipelineError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(PipelineError::InvalidInput {
                reason: "text must not be empty".to_string(),
            });
        }
        Ok(Self {
            text,
            url: None,
            language: DEFAULT_LANGUAGE.to_string(),
        })
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Language tag; `"auto"` requests detection.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

/// Final, immutable output of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictResult {
    pub claim: String,
    pub paraphrase: String,
    pub entities: Vec<Entity>,
    pub scores: ScoreSet,
    /// Best first.
    pub source_candidates: Vec<SourceCandidate>,
    pub verdict: Verdict,
    pub explanation: String,
    pub confidence: f64,
    /// Resolved language tag.
    pub language: String,
    pub source_url: Option<String>,
    pub degraded_signals: Vec<DegradedSignal>,
    pub model_version: String,
}
