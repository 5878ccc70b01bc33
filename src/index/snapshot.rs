use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::embedding::Embedder;

use super::error::IndexError;
use super::store::{FactCheckIndex, IndexState};
use super::types::{DistanceMetric, IndexEntry};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable copy of an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub metric: DistanceMetric,
    pub dimension: Option<usize>,
    #[serde(default)]
    pub entries: Vec<IndexEntry>,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

impl IndexSnapshot {
    fn into_state(self) -> Result<IndexState, IndexError> {
        let mut vectors = Vec::with_capacity(self.entries.len());
        let mut sources = Vec::with_capacity(self.entries.len());
        for entry in self.entries {
            vectors.push(entry.embedding);
            sources.push(entry.source);
        }

        let mut state = IndexState {
            dimension: self.dimension,
            ..IndexState::default()
        };
        let dimension = state.check_batch(&vectors)?;
        state.dimension = dimension;
        state.vectors = vectors;
        state.sources = sources;
        Ok(state)
    }
}

impl FactCheckIndex {
    /// Builds an index pre-populated from `snapshot`.
    pub fn from_snapshot(
        embedder: Arc<dyn Embedder>,
        metric: DistanceMetric,
        snapshot: IndexSnapshot,
    ) -> Result<Self, IndexError> {
        let index = Self::new(embedder, metric);
        index.restore(snapshot)?;
        Ok(index)
    }

    pub fn snapshot(&self) -> IndexSnapshot {
        IndexSnapshot {
            version: SNAPSHOT_VERSION,
            metric: self.metric(),
            dimension: self.dimension(),
            entries: self.entries(),
        }
    }

    /// Replaces the index contents with `snapshot`. On error nothing changes.
    pub fn restore(&self, snapshot: IndexSnapshot) -> Result<usize, IndexError> {
        if snapshot.metric != self.metric() {
            warn!(
                snapshot_metric = %snapshot.metric,
                index_metric = %self.metric(),
                "Snapshot was built with a different metric"
            );
        }
        let state = snapshot.into_state()?;
        if let Some(expected) = self.embedder_dimension()
            && let Some(actual) = state.dimension
            && expected != actual
        {
            return Err(IndexError::DimensionMismatch { expected, actual });
        }

        let total = state.vectors.len();
        *self.state.write() = state;
        Ok(total)
    }

    /// Loads a JSON snapshot from `path`, replacing the current contents.
    pub fn load_snapshot(&self, path: &Path) -> Result<usize, IndexError> {
        let bytes = std::fs::read(path).map_err(|source| IndexError::SnapshotIo {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot: IndexSnapshot =
            serde_json::from_slice(&bytes).map_err(|e| IndexError::SnapshotInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let total = self.restore(snapshot).map_err(|e| match e {
            IndexError::DimensionMismatch { .. } => IndexError::SnapshotInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
            other => other,
        })?;

        info!(path = %path.display(), entries = total, "Index snapshot loaded");
        Ok(total)
    }

    /// Writes a JSON snapshot to `path` (via a temporary file and rename).
    pub fn save_snapshot(&self, path: &Path) -> Result<usize, IndexError> {
        let snapshot = self.snapshot();
        let bytes = serde_json::to_vec(&snapshot).map_err(|e| IndexError::SnapshotInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let tmp = path.with_extension("json.tmp");
        let io_err = |source| IndexError::SnapshotIo {
            path: path.to_path_buf(),
            source,
        };
        std::fs::write(&tmp, bytes).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)?;

        info!(
            path = %path.display(),
            entries = snapshot.entries.len(),
            "Index snapshot saved"
        );
        Ok(snapshot.entries.len())
    }
}
