use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, instrument};

use crate::embedding::Embedder;

use super::error::IndexError;
use super::types::{DistanceMetric, IndexEntry, SourceCandidate, SourceMetadata};

/// Vectors and metadata, index-aligned.
#[derive(Debug, Default)]
pub(super) struct IndexState {
    pub(super) dimension: Option<usize>,
    pub(super) vectors: Vec<Vec<f32>>,
    pub(super) sources: Vec<SourceMetadata>,
}

impl IndexState {
    /// Checks a batch against the current dimension without mutating anything.
    ///
    /// Returns the dimension the index will have after the batch.
    pub(super) fn check_batch(&self, vectors: &[Vec<f32>]) -> Result<Option<usize>, IndexError> {
        let Some(first) = vectors.first() else {
            return Ok(self.dimension);
        };
        let expected = self.dimension.unwrap_or(first.len());
        if expected == 0 {
            return Err(IndexError::DimensionMismatch {
                expected: 1,
                actual: 0,
            });
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
            return Err(IndexError::DimensionMismatch {
                expected,
                actual: bad.len(),
            });
        }
        Ok(Some(expected))
    }
}

/// In-memory nearest-neighbor index over fact-check embeddings.
///
/// Exhaustive search. Writes take the exclusive lock only after embedding,
/// so readers never observe a half-applied insert.
pub struct FactCheckIndex {
    embedder: Arc<dyn Embedder>,
    metric: DistanceMetric,
    pub(super) state: RwLock<IndexState>,
}

impl std::fmt::Debug for FactCheckIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("FactCheckIndex")
            .field("metric", &self.metric)
            .field("dimension", &state.dimension)
            .field("entries", &state.vectors.len())
            .finish()
    }
}

impl FactCheckIndex {
    /// Creates an empty index. The dimension is fixed by the first insert.
    pub fn new(embedder: Arc<dyn Embedder>, metric: DistanceMetric) -> Self {
        Self {
            embedder,
            metric,
            state: RwLock::new(IndexState::default()),
        }
    }

    /// Dimension the embedder produces, if it reports one.
    pub(super) fn embedder_dimension(&self) -> Option<usize> {
        Some(self.embedder.dimension()).filter(|d| *d > 0)
    }

    pub fn is_embedder_stub(&self) -> bool {
        self.embedder.is_stub()
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn len(&self) -> usize {
        self.state.read().vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `None` until something has been inserted.
    pub fn dimension(&self) -> Option<usize> {
        self.state.read().dimension
    }

    /// Embeds `texts` and appends them with their `sources`.
    ///
    /// Returns the entry count after the insert. On error the index is unchanged.
    #[instrument(skip_all, fields(count = texts.len()))]
    pub fn insert(&self, texts: &[&str], sources: Vec<SourceMetadata>) -> Result<usize, IndexError> {
        if texts.len() != sources.len() {
            return Err(IndexError::ShapeMismatch {
                texts: texts.len(),
                sources: sources.len(),
            });
        }
        if texts.is_empty() {
            return Ok(self.len());
        }

        let vectors = self.embedder.embed(texts)?;
        if vectors.len() != texts.len() {
            return Err(IndexError::EmbeddingCountMismatch {
                expected: texts.len(),
                actual: vectors.len(),
            });
        }

        self.insert_vectors(vectors, sources)
    }

    /// Appends precomputed vectors. Same atomicity rules as [`insert`](Self::insert).
    pub fn insert_vectors(
        &self,
        vectors: Vec<Vec<f32>>,
        sources: Vec<SourceMetadata>,
    ) -> Result<usize, IndexError> {
        if vectors.len() != sources.len() {
            return Err(IndexError::ShapeMismatch {
                texts: vectors.len(),
                sources: sources.len(),
            });
        }

        let mut state = self.state.write();
        let dimension = state.check_batch(&vectors)?;
        if let (Some(actual), Some(expected)) = (dimension, self.embedder_dimension())
            && actual != expected
        {
            return Err(IndexError::DimensionMismatch { expected, actual });
        }

        let inserted = vectors.len();
        state.dimension = dimension;
        state.vectors.extend(vectors);
        state.sources.extend(sources);
        let total = state.vectors.len();
        drop(state);

        if inserted > 0 {
            info!(inserted, total, "Fact-checks indexed");
        }
        Ok(total)
    }

    /// Nearest fact-checks for `query`, best first, at most `k`.
    ///
    /// An empty index yields an empty vector without calling the embedder.
    #[instrument(skip_all, fields(k = k))]
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SourceCandidate>, IndexError> {
        if k == 0 {
            return Err(IndexError::InvalidK);
        }
        if self.is_empty() {
            debug!("Search on empty index");
            return Ok(Vec::new());
        }

        let mut vectors = self.embedder.embed(&[query])?;
        let query_vector = vectors.pop().ok_or(IndexError::EmbeddingCountMismatch {
            expected: 1,
            actual: 0,
        })?;

        self.search_vector(&query_vector, k)
    }

    /// Like [`search`](Self::search) with a precomputed query vector.
    pub fn search_vector(&self, query: &[f32], k: usize) -> Result<Vec<SourceCandidate>, IndexError> {
        if k == 0 {
            return Err(IndexError::InvalidK);
        }

        let state = self.state.read();
        let Some(dimension) = state.dimension else {
            return Ok(Vec::new());
        };
        if query.len() != dimension {
            return Err(IndexError::DimensionMismatch {
                expected: dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = state
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, self.metric.distance(query, v)))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);

        let candidates: Vec<SourceCandidate> = scored
            .into_iter()
            .filter_map(|(i, distance)| {
                state.sources.get(i).map(|source| SourceCandidate {
                    source_name: source.source_name.clone(),
                    url: source.url.clone(),
                    confidence: 1.0 / (1.0 + distance),
                })
            })
            .collect();

        debug!(
            candidates = candidates.len(),
            best = candidates.first().map(|c| c.confidence),
            "Index searched"
        );
        Ok(candidates)
    }

    /// Copy of every entry, in insertion order.
    pub fn entries(&self) -> Vec<IndexEntry> {
        let state = self.state.read();
        state
            .vectors
            .iter()
            .zip(&state.sources)
            .map(|(embedding, source)| IndexEntry {
                embedding: embedding.clone(),
                source: source.clone(),
            })
            .collect()
    }
}
