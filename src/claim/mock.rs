//! Scriptable summarizer for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::ClaimError;
use super::summarizer::Summarizer;

/// Returns a canned summary, or fails.
#[derive(Debug)]
pub struct MockSummarizer {
    summary: Option<String>,
    calls: AtomicUsize,
    last_input: Mutex<Option<String>>,
}

impl MockSummarizer {
    pub fn returning(summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            summary: None,
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Text passed to the most recent call.
    pub fn last_input(&self) -> Option<String> {
        self.last_input.lock().clone()
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(
        &self,
        text: &str,
        _min_tokens: usize,
        _max_tokens: usize,
    ) -> Result<String, ClaimError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        *self.last_input.lock() = Some(text.to_string());

        self.summary
            .clone()
            .ok_or_else(|| ClaimError::SummarizationFailed {
                reason: "mock summarizer failure".to_string(),
            })
    }
}
