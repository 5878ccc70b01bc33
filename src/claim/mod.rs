//! Claim extraction and paraphrasing.

pub mod error;
pub mod extractor;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod paraphrase;
pub mod summarizer;


pub use error::ClaimError;
pub use extractor::{Claim, ClaimExtractor};
pub use paraphrase::Paraphraser;
pub use summarizer::{GenAiSummarizer, Summarizer};
