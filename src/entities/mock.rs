//! Scriptable recognizer for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::error::EntityError;
use super::recognizer::EntityRecognizer;
use super::types::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Behavior {
    Words,
    Fail,
    Unavailable,
}

/// Tags every capitalized word with a fixed type, or fails on demand.
#[derive(Debug)]
pub struct MockRecognizer {
    entity_type: String,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl MockRecognizer {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            behavior: Behavior::Words,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call returns a non-fatal inference error.
    pub fn failing() -> Self {
        Self {
            behavior: Behavior::Fail,
            ..Self::new("MISC")
        }
    }

    /// Every call reports the backend unreachable.
    pub fn unavailable() -> Self {
        Self {
            behavior: Behavior::Unavailable,
            ..Self::new("MISC")
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl EntityRecognizer for MockRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<Entity>, EntityError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        match self.behavior {
            Behavior::Fail => Err(EntityError::InferenceFailed {
                reason: "mock recognizer failure".to_string(),
            }),
            Behavior::Unavailable => Err(EntityError::Unavailable {
                reason: "mock recognizer offline".to_string(),
            }),
            Behavior::Words => Ok(capitalized_words(text, &self.entity_type)),
        }
    }
}

fn capitalized_words(text: &str, entity_type: &str) -> Vec<Entity> {
    let mut entities = Vec::new();
    let mut word_start = None;

    let boundaries = text.char_indices().chain(std::iter::once((text.len(), ' ')));
    for (i, c) in boundaries {
        if !c.is_whitespace() {
            word_start.get_or_insert(i);
            continue;
        }
        if let Some(start) = word_start.take()
            && text[start..].starts_with(char::is_uppercase)
            && let Some(entity) = Entity::from_span(text, start, i, entity_type)
        {
            entities.push(entity);
        }
    }

    entities
}
