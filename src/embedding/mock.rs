//! Scriptable embedder for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::encoder::SentenceEncoder;
use super::{Embedder, EmbeddingError};

/// Stub-backed embedder that can be told to fail on specific inputs.
///
/// Any text containing one of the configured triggers yields
/// [`EmbeddingError::Unavailable`]; all other texts get stub embeddings.
pub struct MockEmbedder {
    inner: SentenceEncoder,
    fail_triggers: RwLock<Vec<String>>,
    calls: AtomicUsize,
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self {
            inner: SentenceEncoder::stub(),
            fail_triggers: RwLock::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_dim(dim: usize) -> Self {
        let config = super::encoder::EncoderConfig::stub_with_dim(dim);
        Self {
            inner: SentenceEncoder::load(config).unwrap_or_else(|_| SentenceEncoder::stub()),
            fail_triggers: RwLock::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Makes every text containing `trigger` fail to embed.
    pub fn fail_on(self, trigger: impl Into<String>) -> Self {
        self.fail_triggers.write().push(trigger.into());
        self
    }

    /// Makes every call fail.
    pub fn fail_always(self) -> Self {
        self.fail_on("")
    }

    /// Number of `embed` calls served (including failed ones).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Embedder for MockEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let triggers = self.fail_triggers.read();
        if let Some(text) = texts
            .iter()
            .find(|text| triggers.iter().any(|t| text.contains(t.as_str())))
        {
            return Err(EmbeddingError::Unavailable {
                reason: format!("mock embedder refused input of {} bytes", text.len()),
            });
        }

        self.inner.embed(texts)
    }

    fn dimension(&self) -> usize {
        Embedder::dimension(&self.inner)
    }

    fn is_stub(&self) -> bool {
        true
    }
}
