//! Scriptable scorer and classifier for tests.

use parking_lot::RwLock;

use super::classifier::{Classification, TextClassifier};
use super::error::ScoringError;
use super::types::{ScoreSet, Sentiment, SignalKind};
use super::scorer::TextScorer;

/// Returns fixed scores; individual signals can be told to fail.
pub struct FixedScorer {
    scores: ScoreSet,
    failing: RwLock<Vec<SignalKind>>,
    unavailable_trigger: RwLock<Option<String>>,
}

impl Default for FixedScorer {
    fn default() -> Self {
        Self::new(ScoreSet::neutral())
    }
}

impl FixedScorer {
    pub fn new(scores: ScoreSet) -> Self {
        Self {
            scores,
            failing: RwLock::new(Vec::new()),
            unavailable_trigger: RwLock::new(None),
        }
    }

    /// Makes `signal` return a non-fatal inference error.
    pub fn fail_signal(self, signal: SignalKind) -> Self {
        self.failing.write().push(signal);
        self
    }

    /// Reports the backend unreachable for any text containing `trigger`.
    pub fn unavailable_on(self, trigger: impl Into<String>) -> Self {
        *self.unavailable_trigger.write() = Some(trigger.into());
        self
    }

    fn check(&self, signal: SignalKind, text: &str) -> Result<(), ScoringError> {
        if let Some(trigger) = self.unavailable_trigger.read().as_deref()
            && text.contains(trigger)
        {
            return Err(ScoringError::CapabilityUnavailable {
                capability: "scoring".to_string(),
                reason: "mock backend offline".to_string(),
            });
        }
        if self.failing.read().contains(&signal) {
            return Err(ScoringError::InferenceFailed {
                reason: format!("mock {signal} failure"),
            });
        }
        Ok(())
    }
}

impl TextScorer for FixedScorer {
    fn sentiment(&self, text: &str, _language: &str) -> Result<Sentiment, ScoringError> {
        self.check(SignalKind::Sentiment, text)?;
        Ok(self.scores.sentiment)
    }

    fn bias(&self, text: &str, _language: &str) -> Result<f64, ScoringError> {
        self.check(SignalKind::Bias, text)?;
        Ok(self.scores.bias)
    }

    fn sensationalism(&self, text: &str, _language: &str) -> Result<f64, ScoringError> {
        self.check(SignalKind::Sensationalism, text)?;
        Ok(self.scores.sensationalism)
    }

    fn factuality(&self, text: &str, _language: &str) -> Result<f64, ScoringError> {
        self.check(SignalKind::Factuality, text)?;
        Ok(self.scores.factuality)
    }

    fn toxicity(&self, text: &str, _language: &str) -> Result<f64, ScoringError> {
        self.check(SignalKind::Toxicity, text)?;
        Ok(self.scores.toxicity)
    }
}

/// Always returns the same label distribution.
#[derive(Debug, Clone)]
pub struct FixedClassifier {
    distribution: Vec<(String, f64)>,
}

impl FixedClassifier {
    pub fn new(distribution: &[(&str, f64)]) -> Self {
        Self {
            distribution: distribution
                .iter()
                .map(|(label, p)| (label.to_string(), *p))
                .collect(),
        }
    }
}

impl TextClassifier for FixedClassifier {
    fn classify(&self, _text: &str) -> Result<Classification, ScoringError> {
        Classification::from_distribution(self.distribution.clone()).ok_or_else(|| {
            ScoringError::InvalidOutput {
                reason: "empty mock distribution".to_string(),
            }
        })
    }
}
