//! Named-entity extraction.
//!
//! A [`RecognizerRegistry`] maps language tags to [`EntityRecognizer`]s and
//! falls back to a multilingual one. Recognizer failures yield an empty entity
//! list unless the backend is unreachable.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod recognizer;
pub mod registry;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::EntityError;
pub use recognizer::{
    BertEntityRecognizer, EntityRecognizer, NullRecognizer, merge_bio, stitch_windows,
};
pub use registry::{Extraction, RecognizerRegistry};
pub use types::{Entity, TokenTag};
