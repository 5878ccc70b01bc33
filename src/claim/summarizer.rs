use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use tracing::{debug, instrument};

use super::error::ClaimError;

/// Abstractive summarizer used to condense long inputs into one claim.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarizes `text` to roughly `min_tokens..=max_tokens` tokens.
    async fn summarize(
        &self,
        text: &str,
        min_tokens: usize,
        max_tokens: usize,
    ) -> Result<String, ClaimError>;
}

/// Chat-model summarizer through the `genai` client.
pub struct GenAiSummarizer {
    client: Client,
    model: String,
}

impl std::fmt::Debug for GenAiSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAiSummarizer")
            .field("model", &self.model)
            .finish()
    }
}

impl GenAiSummarizer {
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_client(Client::default(), model)
    }

    pub fn with_client(client: Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn system_prompt(min_tokens: usize, max_tokens: usize) -> String {
    format!(
        "Summarize the user's text as a single factual claim of {} to {} words. \
         Reply with the claim only, in the language of the text.",
        min_tokens, max_tokens
    )
}

#[async_trait]
impl Summarizer for GenAiSummarizer {
    #[instrument(skip(self, text), fields(model = %self.model, chars = text.len()))]
    async fn summarize(
        &self,
        text: &str,
        min_tokens: usize,
        max_tokens: usize,
    ) -> Result<String, ClaimError> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(system_prompt(min_tokens, max_tokens)),
            ChatMessage::user(text.to_string()),
        ]);
        // Leave headroom over the word budget; tokens run longer than words.
        let options = ChatOptions::default()
            .with_max_tokens((max_tokens * 2) as u32)
            .with_temperature(0.0);

        let response = self
            .client
            .exec_chat(&self.model, request, Some(&options))
            .await
            .map_err(|e| ClaimError::SummarizationFailed {
                reason: e.to_string(),
            })?;

        let summary = response.first_text().unwrap_or_default().trim().to_string();
        debug!(summary_chars = summary.len(), "Summary received");

        if summary.is_empty() {
            return Err(ClaimError::EmptySummary);
        }
        Ok(summary)
    }
}
