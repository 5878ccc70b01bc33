use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::language::primary_subtag;

use super::error::EntityError;
use super::recognizer::EntityRecognizer;
use super::types::Entity;

/// Result of [`RecognizerRegistry::extract`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extraction {
    pub entities: Vec<Entity>,
    /// Set when the recognizer failed and the result was replaced by `[]`.
    pub degraded: Option<String>,
}

/// Language-keyed recognizers with a multilingual fallback.
#[derive(Clone, Default)]
pub struct RecognizerRegistry {
    by_language: HashMap<String, Arc<dyn EntityRecognizer>>,
    fallback: Option<Arc<dyn EntityRecognizer>>,
}

impl std::fmt::Debug for RecognizerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut languages: Vec<&String> = self.by_language.keys().collect();
        languages.sort();
        f.debug_struct("RecognizerRegistry")
            .field("languages", &languages)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl RecognizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a recognizer for `language` (lowercased primary subtag).
    pub fn with_language(
        mut self,
        language: &str,
        recognizer: Arc<dyn EntityRecognizer>,
    ) -> Self {
        let key = primary_subtag(language.trim()).to_ascii_lowercase();
        self.by_language.insert(key, recognizer);
        self
    }

    /// Recognizer used for every language without a dedicated one.
    pub fn with_fallback(mut self, recognizer: Arc<dyn EntityRecognizer>) -> Self {
        self.fallback = Some(recognizer);
        self
    }

    /// Builds the registry from an English model and an optional
    /// multilingual one. Without a multilingual model the English
    /// recognizer also serves every other language.
    pub fn from_models(
        english: Option<Arc<dyn EntityRecognizer>>,
        multilingual: Option<Arc<dyn EntityRecognizer>>,
    ) -> Self {
        let mut registry = Self::new();
        if let Some(english) = &english {
            registry = registry.with_language("en", english.clone());
        }
        match multilingual.or(english) {
            Some(fallback) => registry.with_fallback(fallback),
            None => registry,
        }
    }

    /// Picks the recognizer for `language`: exact tag, then primary subtag,
    /// then the fallback.
    pub fn recognizer_for(&self, language: &str) -> Option<&Arc<dyn EntityRecognizer>> {
        let tag = language.trim().to_ascii_lowercase();
        self.by_language
            .get(&tag)
            .or_else(|| self.by_language.get(primary_subtag(&tag)))
            .or(self.fallback.as_ref())
    }

    /// Extracts entities, replacing non-fatal recognizer failures with `[]`.
    pub fn extract(&self, text: &str, language: &str) -> Result<Extraction, EntityError> {
        let Some(recognizer) = self.recognizer_for(language) else {
            debug!(language, "No recognizer for language");
            return Ok(Extraction::default());
        };

        match recognizer.recognize(text) {
            Ok(entities) => Ok(Extraction {
                entities,
                degraded: None,
            }),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(language, error = %e, "Entity extraction degraded to empty result");
                Ok(Extraction {
                    entities: Vec::new(),
                    degraded: Some(e.to_string()),
                })
            }
        }
    }
}
