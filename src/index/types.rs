use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::IndexError;

fn unknown_source() -> String {
    "Unknown".to_string()
}

/// Provenance of one stored fact-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    #[serde(default = "unknown_source", alias = "source")]
    pub source_name: String,
    #[serde(default)]
    pub url: String,
}

impl SourceMetadata {
    pub fn new(source_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            url: url.into(),
        }
    }
}

impl Default for SourceMetadata {
    fn default() -> Self {
        Self {
            source_name: unknown_source(),
            url: String::new(),
        }
    }
}

/// A search hit. `confidence = 1 / (1 + distance)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCandidate {
    pub source_name: String,
    pub url: String,
    pub confidence: f32,
}

/// One stored vector with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub embedding: Vec<f32>,
    #[serde(flatten)]
    pub source: SourceMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    /// Squared L2, as reported by flat L2 indexes.
    SquaredEuclidean,
    /// `1 - cos(a, b)`; zero vectors are at distance 1.
    Cosine,
}

impl DistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::SquaredEuclidean => "squared_euclidean",
            Self::Cosine => "cosine",
        }
    }

    /// Distance between two vectors of equal length.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::Euclidean => squared_l2(a, b).sqrt(),
            Self::SquaredEuclidean => squared_l2(a, b),
            Self::Cosine => {
                let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    return 1.0;
                }
                (1.0 - dot / (norm_a * norm_b)).max(0.0)
            }
        }
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl FromStr for DistanceMetric {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(Self::Euclidean),
            "squared_euclidean" | "l2_squared" => Ok(Self::SquaredEuclidean),
            "cosine" => Ok(Self::Cosine),
            _ => Err(IndexError::UnknownMetric {
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
