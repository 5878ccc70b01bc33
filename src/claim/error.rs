use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("summarization failed: {reason}")]
    SummarizationFailed { reason: String },

    #[error("summarizer returned an empty summary")]
    EmptySummary,

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}
