use serde::{Deserialize, Serialize};

/// A named entity found in a source text.
///
/// `span` holds UTF-8 byte offsets `[start, end)` into that text, so
/// `&source[start..end] == text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub span: (usize, usize),
}

impl Entity {
    /// Builds an entity from a span of `source`.
    ///
    /// Returns `None` for empty, reversed or out-of-bounds spans and for
    /// offsets that fall inside a multi-byte character.
    pub fn from_span(source: &str, start: usize, end: usize, entity_type: &str) -> Option<Self> {
        if start >= end || entity_type.is_empty() {
            return None;
        }
        let text = source.get(start..end)?;
        Some(Self {
            text: text.to_string(),
            entity_type: entity_type.to_string(),
            span: (start, end),
        })
    }

    pub fn start(&self) -> usize {
        self.span.0
    }

    pub fn end(&self) -> usize {
        self.span.1
    }
}

/// One token's best label, as produced by a token classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenTag {
    /// Byte offsets into the source text.
    pub start: usize,
    pub end: usize,
    /// BIO label such as `B-PER`, `I-ORG` or `O`.
    pub label: String,
}

impl TokenTag {
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }
}
