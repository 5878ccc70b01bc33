//! Embedding + model utilities.
//!
//! - [`Embedder`] is the capability the fact-check index embeds through.
//! - [`encoder`] provides the BERT sentence encoder behind it.
//! - [`bert`] holds the classifier heads used by [`crate::scoring`] and [`crate::entities`].

/// BERT encoder and classifier heads.
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// Sentence encoder (fact-check embeddings).
pub mod encoder;
mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
/// Tokenizer loading and vector helpers.
pub mod utils;

pub use encoder::{ENCODER_EMBEDDING_DIM, ENCODER_MAX_SEQ_LEN, EncoderConfig, SentenceEncoder};
pub use error::EmbeddingError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;

/// Turns text into fixed-dimension vectors.
///
/// Implementations must be deterministic: the same text always yields the same
/// vector, otherwise stored fact-checks and queries stop lining up.
pub trait Embedder: Send + Sync {
    /// Embeds each text, preserving order.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Output dimension of every vector this embedder produces.
    fn dimension(&self) -> usize;

    /// Returns `true` for deterministic test backends.
    fn is_stub(&self) -> bool {
        false
    }
}
