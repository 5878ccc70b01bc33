//! Fact-check similarity index.
//!
//! [`FactCheckIndex`] stores embeddings of verified fact-checks next to their
//! [`SourceMetadata`] and answers top-k queries with [`SourceCandidate`]s.
//! The vector dimension is fixed by the first insert; any later vector of a
//! different size is rejected, never truncated.

pub mod error;
pub mod snapshot;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::IndexError;
pub use snapshot::{IndexSnapshot, SNAPSHOT_VERSION};
pub use store::FactCheckIndex;
pub use types::{DistanceMetric, IndexEntry, SourceCandidate, SourceMetadata};
