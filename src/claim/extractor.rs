use std::sync::Arc;

use regex::Regex;
use tracing::{debug, warn};

use crate::constants::{
    FALLBACK_CLAIM_CHARS, MIN_SENTENCE_CLAIM_CHARS, SUMMARIZE_ABOVE_CHARS, SUMMARY_INPUT_CHARS,
    SUMMARY_MAX_TOKENS, SUMMARY_MIN_TOKENS, char_prefix,
};

use super::error::ClaimError;
use super::paraphrase::Paraphraser;
use super::summarizer::Summarizer;

/// An extracted claim and its retrieval paraphrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub claim: String,
    pub paraphrase: String,
    /// `true` when the claim came from the summarizer.
    pub summarized: bool,
}

/// Reduces raw text to one candidate claim.
pub struct ClaimExtractor {
    sentence_break: Regex,
    paraphraser: Paraphraser,
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl std::fmt::Debug for ClaimExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimExtractor")
            .field("summarizer", &self.summarizer.is_some())
            .finish()
    }
}

impl ClaimExtractor {
    /// Extractor without summarization.
    pub fn new() -> Result<Self, ClaimError> {
        Ok(Self {
            sentence_break: Regex::new(r"[.!?]+")?,
            paraphraser: Paraphraser::new()?,
            summarizer: None,
        })
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Heuristic claim: the first sentence when it is long enough, otherwise
    /// the first 200 characters of the text.
    pub fn heuristic_claim<'a>(&self, text: &'a str) -> &'a str {
        let first = self.sentence_break.split(text).next().unwrap_or_default();
        if first.chars().count() > MIN_SENTENCE_CLAIM_CHARS {
            first.trim()
        } else {
            char_prefix(text, FALLBACK_CLAIM_CHARS)
        }
    }

    /// Extracts the claim, preferring a summary for texts over 300 characters.
    ///
    /// Summarizer failures keep the heuristic claim.
    pub async fn extract_claim(&self, text: &str, _language: &str) -> (String, bool) {
        let candidate = self.heuristic_claim(text);

        let Some(summarizer) = self.summarizer.as_ref() else {
            return (candidate.to_string(), false);
        };
        if text.chars().count() <= SUMMARIZE_ABOVE_CHARS {
            return (candidate.to_string(), false);
        }

        let input = char_prefix(text, SUMMARY_INPUT_CHARS);
        match summarizer
            .summarize(input, SUMMARY_MIN_TOKENS, SUMMARY_MAX_TOKENS)
            .await
        {
            Ok(summary) if !summary.trim().is_empty() => {
                debug!(summary_chars = summary.len(), "Using summarized claim");
                (summary.trim().to_string(), true)
            }
            Ok(_) => {
                debug!("Summarizer returned empty text, keeping heuristic claim");
                (candidate.to_string(), false)
            }
            Err(e) => {
                warn!(error = %e, "Summarization failed, keeping heuristic claim");
                (candidate.to_string(), false)
            }
        }
    }

    pub fn paraphrase(&self, claim: &str, language: &str) -> String {
        self.paraphraser.paraphrase(claim, language)
    }

    /// Claim plus paraphrase in one call.
    pub async fn extract(&self, text: &str, language: &str) -> Claim {
        let (claim, summarized) = self.extract_claim(text, language).await;
        let paraphrase = self.paraphrase(&claim, language);
        Claim {
            claim,
            paraphrase,
            summarized,
        }
    }
}
