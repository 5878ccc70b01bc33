use std::sync::Arc;

use tracing::{debug, warn};

use crate::constants::{
    NEUTRAL_BIAS, NEUTRAL_FACTUALITY, NEUTRAL_SENSATIONALISM, NEUTRAL_TOXICITY,
};

use super::classifier::TextClassifier;
use super::error::ScoringError;
use super::heuristics;
use super::types::{
    DegradedSignal, ScoreReport, ScoreSet, Sentiment, SentimentLabel, Signal, SignalKind,
};

/// One estimator per signal. Each method is independent; a failure in one
/// never affects the others.
///
/// Sensationalism and factuality default to the lexical heuristics.
pub trait TextScorer: Send + Sync {
    fn sentiment(&self, text: &str, language: &str) -> Result<Sentiment, ScoringError>;

    fn bias(&self, text: &str, language: &str) -> Result<f64, ScoringError>;

    fn sensationalism(&self, text: &str, _language: &str) -> Result<f64, ScoringError> {
        Ok(heuristics::sensationalism(text))
    }

    fn factuality(&self, text: &str, _language: &str) -> Result<f64, ScoringError> {
        Ok(heuristics::factuality(text))
    }

    /// `Ok(0.0)` must only mean "not toxic" when a model actually ran; a
    /// scorer without a toxicity model should return an error instead.
    fn toxicity(&self, text: &str, language: &str) -> Result<f64, ScoringError>;
}

/// Runs every estimator and folds failures into neutral defaults.
///
/// Only fatal errors ([`ScoringError::is_fatal`]) are returned.
pub fn score_text(
    scorer: &dyn TextScorer,
    text: &str,
    language: &str,
) -> Result<ScoreReport, ScoringError> {
    let sentiment = Signal::absorb(scorer.sentiment(text, language), Sentiment::neutral())?;
    let sentiment = match sentiment {
        Signal::Measured(s) if !s.is_consistent() => Signal::Degraded {
            value: Sentiment::neutral(),
            reason: format!("inconsistent sentiment {:?} {}", s.label, s.polarity),
        },
        other => other,
    };
    let bias = Signal::absorb(scorer.bias(text, language), NEUTRAL_BIAS)?.unit(NEUTRAL_BIAS);
    let sensationalism = Signal::absorb(
        scorer.sensationalism(text, language),
        NEUTRAL_SENSATIONALISM,
    )?
    .unit(NEUTRAL_SENSATIONALISM);
    let factuality = Signal::absorb(scorer.factuality(text, language), NEUTRAL_FACTUALITY)?
        .unit(NEUTRAL_FACTUALITY);
    let toxicity = Signal::absorb(scorer.toxicity(text, language), NEUTRAL_TOXICITY)?
        .unit(NEUTRAL_TOXICITY);

    let mut degraded = Vec::new();
    collect_degraded(&mut degraded, SignalKind::Sentiment, &sentiment);
    collect_degraded(&mut degraded, SignalKind::Bias, &bias);
    collect_degraded(&mut degraded, SignalKind::Sensationalism, &sensationalism);
    collect_degraded(&mut degraded, SignalKind::Factuality, &factuality);
    collect_degraded(&mut degraded, SignalKind::Toxicity, &toxicity);

    let scores = ScoreSet {
        sentiment: sentiment.into_value(),
        bias: bias.into_value(),
        sensationalism: sensationalism.into_value(),
        factuality: factuality.into_value(),
        toxicity: toxicity.into_value(),
    };

    debug!(
        polarity = scores.sentiment.polarity,
        bias = scores.bias,
        sensationalism = scores.sensationalism,
        factuality = scores.factuality,
        toxicity = scores.toxicity,
        degraded = degraded.len(),
        "Text scored"
    );

    Ok(ScoreReport { scores, degraded })
}

fn collect_degraded<T>(out: &mut Vec<DegradedSignal>, signal: SignalKind, value: &Signal<T>) {
    if let Some(reason) = value.degraded_reason() {
        // Absent toxicity models are the normal configuration.
        if signal == SignalKind::Toxicity {
            debug!(signal = %signal, reason, "Signal using neutral default");
        } else {
            warn!(signal = %signal, reason, "Signal degraded to neutral default");
        }
        out.push(DegradedSignal {
            signal,
            reason: reason.to_string(),
        });
    }
}

/// Classifier-backed scorer. Missing classifiers degrade their signal.
#[derive(Clone, Default)]
pub struct ModelScorer {
    sentiment: Option<Arc<dyn TextClassifier>>,
    bias: Option<Arc<dyn TextClassifier>>,
    toxicity: Option<Arc<dyn TextClassifier>>,
}

impl std::fmt::Debug for ModelScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelScorer")
            .field("sentiment", &self.sentiment.is_some())
            .field("bias", &self.bias.is_some())
            .field("toxicity", &self.toxicity.is_some())
            .finish()
    }
}

impl ModelScorer {
    /// A scorer with no classifiers: heuristics only.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sentiment(mut self, classifier: Arc<dyn TextClassifier>) -> Self {
        self.sentiment = Some(classifier);
        self
    }

    pub fn with_bias(mut self, classifier: Arc<dyn TextClassifier>) -> Self {
        self.bias = Some(classifier);
        self
    }

    pub fn with_toxicity(mut self, classifier: Arc<dyn TextClassifier>) -> Self {
        self.toxicity = Some(classifier);
        self
    }

    fn classifier<'a>(
        slot: &'a Option<Arc<dyn TextClassifier>>,
        signal: &'static str,
    ) -> Result<&'a Arc<dyn TextClassifier>, ScoringError> {
        slot.as_ref()
            .ok_or(ScoringError::ModelNotConfigured { signal })
    }
}

fn is_biased_label(label: &str) -> bool {
    label.eq_ignore_ascii_case("biased") || label.eq_ignore_ascii_case("bias")
}

fn is_toxic_label(label: &str) -> bool {
    matches!(
        label.to_ascii_lowercase().as_str(),
        "toxic" | "toxicity" | "label_1"
    )
}

impl TextScorer for ModelScorer {
    fn sentiment(&self, text: &str, _language: &str) -> Result<Sentiment, ScoringError> {
        let result = Self::classifier(&self.sentiment, "sentiment")?.classify(text)?;
        let label = SentimentLabel::parse(&result.label).ok_or_else(|| {
            ScoringError::InvalidOutput {
                reason: format!("unknown sentiment label '{}'", result.label),
            }
        })?;
        Ok(Sentiment::from_label(label, result.score))
    }

    fn bias(&self, text: &str, _language: &str) -> Result<f64, ScoringError> {
        let result = Self::classifier(&self.bias, "bias")?.classify(text)?;
        Ok(if is_biased_label(&result.label) {
            result.score
        } else {
            0.0
        })
    }

    fn toxicity(&self, text: &str, _language: &str) -> Result<f64, ScoringError> {
        let result = Self::classifier(&self.toxicity, "toxicity")?.classify(text)?;
        Ok(result.probability_of(is_toxic_label))
    }
}
