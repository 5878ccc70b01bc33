use serde::{Deserialize, Serialize};

use crate::constants::{
    NEUTRAL_BIAS, NEUTRAL_FACTUALITY, NEUTRAL_POLARITY, NEUTRAL_SENSATIONALISM, NEUTRAL_TOXICITY,
};

use super::error::ScoringError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Normalizes a classifier label (`"positive"`, `"NEG"`, `"LABEL_2"`, ...).
    ///
    /// `LABEL_n` follows the negative/neutral/positive ordering used by
    /// three-way sentiment checkpoints.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" | "pos" | "label_2" => Some(Self::Positive),
            "neutral" | "neu" | "label_1" => Some(Self::Neutral),
            "negative" | "neg" | "label_0" => Some(Self::Negative),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

/// Polarity in `[-1, 1]` plus its categorical label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub polarity: f64,
    pub label: SentimentLabel,
}

impl Sentiment {
    /// Builds a sentiment from a label and its probability.
    ///
    /// Positive maps to `+p`, negative to `-p`, neutral to `0`.
    pub fn from_label(label: SentimentLabel, probability: f64) -> Self {
        let p = probability.clamp(0.0, 1.0);
        let polarity = match label {
            SentimentLabel::Positive => p,
            SentimentLabel::Negative => -p,
            SentimentLabel::Neutral => 0.0,
        };
        Self { polarity, label }
    }

    pub fn neutral() -> Self {
        Self {
            polarity: NEUTRAL_POLARITY,
            label: SentimentLabel::Neutral,
        }
    }

    /// Returns `true` if polarity is in range and agrees with the label's sign.
    pub fn is_consistent(&self) -> bool {
        if !(-1.0..=1.0).contains(&self.polarity) {
            return false;
        }
        match self.label {
            SentimentLabel::Positive => self.polarity >= 0.0,
            SentimentLabel::Negative => self.polarity <= 0.0,
            SentimentLabel::Neutral => true,
        }
    }
}

impl Default for Sentiment {
    fn default() -> Self {
        Self::neutral()
    }
}

/// The five text signals for one request. Built once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub sentiment: Sentiment,
    pub bias: f64,
    pub sensationalism: f64,
    pub factuality: f64,
    pub toxicity: f64,
}

impl ScoreSet {
    /// Every signal at its neutral default.
    pub fn neutral() -> Self {
        Self {
            sentiment: Sentiment::neutral(),
            bias: NEUTRAL_BIAS,
            sensationalism: NEUTRAL_SENSATIONALISM,
            factuality: NEUTRAL_FACTUALITY,
            toxicity: NEUTRAL_TOXICITY,
        }
    }
}

impl Default for ScoreSet {
    fn default() -> Self {
        Self::neutral()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Sentiment,
    Bias,
    Sensationalism,
    Factuality,
    Toxicity,
    Entities,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sentiment => "sentiment",
            Self::Bias => "bias",
            Self::Sensationalism => "sensationalism",
            Self::Factuality => "factuality",
            Self::Toxicity => "toxicity",
            Self::Entities => "entities",
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signal value, or the neutral default that replaced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal<T> {
    Measured(T),
    Degraded { value: T, reason: String },
}

impl<T> Signal<T> {
    /// Keeps a successful value; swaps a non-fatal error for `default`.
    ///
    /// Fatal errors ([`ScoringError::is_fatal`]) are returned unchanged.
    pub fn absorb(result: Result<T, ScoringError>, default: T) -> Result<Self, ScoringError> {
        match result {
            Ok(value) => Ok(Signal::Measured(value)),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => Ok(Signal::Degraded {
                value: default,
                reason: e.to_string(),
            }),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Signal::Measured(value) | Signal::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Signal::Measured(value) | Signal::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Signal::Degraded { .. })
    }

    pub fn degraded_reason(&self) -> Option<&str> {
        match self {
            Signal::Degraded { reason, .. } => Some(reason),
            Signal::Measured(_) => None,
        }
    }
}

impl Signal<f64> {
    /// Clamps a measured unit score into `[0, 1]`; non-finite values degrade to `default`.
    pub fn unit(self, default: f64) -> Self {
        match self {
            Signal::Measured(v) if v.is_finite() => Signal::Measured(v.clamp(0.0, 1.0)),
            Signal::Measured(v) => Signal::Degraded {
                value: default,
                reason: format!("non-finite score {v}"),
            },
            degraded => degraded,
        }
    }
}

/// A signal that fell back to its default, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradedSignal {
    pub signal: SignalKind,
    pub reason: String,
}

/// Output of [`score_text`](super::score_text): the score set plus any degraded signals.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreReport {
    pub scores: ScoreSet,
    pub degraded: Vec<DegradedSignal>,
}

impl ScoreReport {
    pub fn is_degraded(&self, signal: SignalKind) -> bool {
        self.degraded.iter().any(|d| d.signal == signal)
    }
}
