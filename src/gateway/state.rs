use std::sync::Arc;

use crate::index::FactCheckIndex;
use crate::pipeline::Analyzer;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,

    /// Hash of the shared secret; `None` rejects every `/api` request.
    api_key_hash: Option<blake3::Hash>,
}

impl AppState {
    pub fn new(analyzer: Arc<Analyzer>, api_key: Option<&str>) -> Self {
        let api_key_hash = api_key
            .filter(|key| !key.is_empty())
            .map(|key| blake3::hash(key.as_bytes()));
        Self {
            analyzer,
            api_key_hash,
        }
    }

    pub fn index(&self) -> &Arc<FactCheckIndex> {
        self.analyzer.index()
    }

    /// Compares hashes so the check does not leak key prefixes through timing.
    pub fn api_key_matches(&self, presented: Option<&str>) -> bool {
        match (self.api_key_hash, presented) {
            (Some(expected), Some(presented)) => expected == blake3::hash(presented.as_bytes()),
            _ => false,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key_hash.is_some()
    }
}
