//! Cross-cutting, shared constants.
//!
//! The verdict weights and marker lists are fixed policy. Changing any of them changes
//! observable verdicts and explanation strings.

/// Version reported in every [`VerdictResult`](crate::pipeline::VerdictResult) and by `/health`.
pub const MODEL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Header carrying the shared secret on `/api` routes.
pub const API_KEY_HEADER: &str = "x-api-key";

pub const DEFAULT_LANGUAGE: &str = "en";
pub const AUTO_LANGUAGE: &str = "auto";

/// Embedding dimension used by the stub encoder (matches MiniLM-L12 sentence encoders).
pub const DEFAULT_EMBEDDING_DIM: usize = 384;
pub const DEFAULT_MAX_SEQ_LEN: usize = 256;

pub const DEFAULT_TOP_K: usize = 5;

/// Classifiers only see this many leading characters of the input.
pub const CLASSIFIER_MAX_CHARS: usize = 512;

// Claim extraction.
pub const MIN_SENTENCE_CLAIM_CHARS: usize = 10;
pub const FALLBACK_CLAIM_CHARS: usize = 200;
pub const SUMMARIZE_ABOVE_CHARS: usize = 300;
pub const SUMMARY_INPUT_CHARS: usize = 1024;
pub const SUMMARY_MIN_TOKENS: usize = 20;
pub const SUMMARY_MAX_TOKENS: usize = 60;

// Sensationalism heuristic.
pub const SENSATIONAL_KEYWORDS: &[&str] = &[
    "shocking",
    "unbelievable",
    "breaking",
    "urgent",
    "must see",
    "you won't believe",
    "exclusive",
    "revealed",
    "exposed",
    "scandal",
];
pub const SENSATIONAL_KEYWORD_WEIGHT: f64 = 0.1;
pub const CAPS_RATIO_THRESHOLD: f64 = 0.3;
pub const CAPS_WEIGHT: f64 = 0.2;
pub const EXCLAMATION_THRESHOLD: usize = 2;
pub const EXCLAMATION_WEIGHT: f64 = 0.15;

// Factuality heuristic.
pub const CERTAINTY_MARKERS: &[&str] = &[
    "confirmed",
    "verified",
    "documented",
    "official",
    "according to",
];
pub const HEDGING_MARKERS: &[&str] = &[
    "maybe",
    "possibly",
    "might",
    "could",
    "allegedly",
    "reportedly",
];
pub const FACTUALITY_BASELINE: f64 = 0.5;
pub const FACTUALITY_MARKER_WEIGHT: f64 = 0.1;

// Verdict policy.
pub const FACTUALITY_WEIGHT: f64 = 0.5;
pub const BIAS_WEIGHT: f64 = 0.2;
pub const SENSATIONALISM_WEIGHT: f64 = 0.15;
pub const TOXICITY_WEIGHT: f64 = 0.15;
pub const TOXICITY_PENALTY_THRESHOLD: f64 = 0.5;
pub const VERDICT_TRUE_THRESHOLD: f64 = 0.75;
pub const VERDICT_MISLEADING_THRESHOLD: f64 = 0.50;
pub const VERDICT_UNVERIFIED_THRESHOLD: f64 = 0.30;
pub const VERDICT_MIDPOINT: f64 = 0.5;
pub const MAX_EXPLANATION_FACTORS: usize = 3;

// Neutral defaults for degraded signals.
pub const NEUTRAL_POLARITY: f64 = 0.0;
pub const NEUTRAL_BIAS: f64 = 0.0;
pub const NEUTRAL_SENSATIONALISM: f64 = 0.0;
pub const NEUTRAL_FACTUALITY: f64 = 0.5;
pub const NEUTRAL_TOXICITY: f64 = 0.0;

/// Returns at most the first `max_chars` characters of `text` (char-boundary safe).
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
