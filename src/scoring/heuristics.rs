//! Lexical estimators for sensationalism and factuality.
//!
//! Both score a marker once no matter how often it occurs and match
//! case-insensitively. Sensational keywords match as plain substrings;
//! factuality markers only match whole words, so "officials" is not "official".

use crate::constants::{
    CAPS_RATIO_THRESHOLD, CAPS_WEIGHT, CERTAINTY_MARKERS, EXCLAMATION_THRESHOLD,
    EXCLAMATION_WEIGHT, FACTUALITY_BASELINE, FACTUALITY_MARKER_WEIGHT, HEDGING_MARKERS,
    SENSATIONAL_KEYWORD_WEIGHT, SENSATIONAL_KEYWORDS,
};

/// Number of distinct `markers` found in `lowercase_text`.
pub fn count_markers(lowercase_text: &str, markers: &[&str]) -> usize {
    markers
        .iter()
        .filter(|marker| lowercase_text.contains(*marker))
        .count()
}

/// Number of distinct `markers` found as whole words (or phrases) in `lowercase_text`.
pub fn count_words(lowercase_text: &str, markers: &[&str]) -> usize {
    markers
        .iter()
        .filter(|marker| contains_word(lowercase_text, marker))
        .count()
}

fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, m)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + m.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Share of characters that are uppercase (0 for empty text).
pub fn uppercase_ratio(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let upper = text.chars().filter(|c| c.is_uppercase()).count();
    upper as f64 / total as f64
}

/// Sensationalism in `[0, 1]`.
///
/// +0.1 per distinct keyword, +0.2 when more than 30% of characters are
/// uppercase, +0.15 for more than two exclamation marks.
pub fn sensationalism(text: &str) -> f64 {
    let lower = text.to_lowercase();

    let mut score = count_markers(&lower, SENSATIONAL_KEYWORDS) as f64 * SENSATIONAL_KEYWORD_WEIGHT;

    if uppercase_ratio(text) > CAPS_RATIO_THRESHOLD {
        score += CAPS_WEIGHT;
    }

    if text.matches('!').count() > EXCLAMATION_THRESHOLD {
        score += EXCLAMATION_WEIGHT;
    }

    score.clamp(0.0, 1.0)
}

/// Factuality in `[0, 1]`: 0.5, +0.1 per certainty marker, -0.1 per hedging marker.
pub fn factuality(text: &str) -> f64 {
    let lower = text.to_lowercase();

    let certainty = count_words(&lower, CERTAINTY_MARKERS) as f64;
    let hedging = count_words(&lower, HEDGING_MARKERS) as f64;

    let score = FACTUALITY_BASELINE + certainty * FACTUALITY_MARKER_WEIGHT
        - hedging * FACTUALITY_MARKER_WEIGHT;

    score.clamp(0.0, 1.0)
}
