use std::sync::Arc;

use crate::embedding::MockEmbedder;

use super::*;

const EPS: f32 = 1e-5;

fn index_with_dim(dim: usize, metric: DistanceMetric) -> FactCheckIndex {
    FactCheckIndex::new(Arc::new(MockEmbedder::with_dim(dim)), metric)
}

fn source(name: &str) -> SourceMetadata {
    SourceMetadata::new(name, format!("https://factcheck.example/{name}"))
}

#[test]
fn test_empty_index_search_returns_empty() {
    let embedder = Arc::new(MockEmbedder::new());
    let index = FactCheckIndex::new(embedder.clone(), DistanceMetric::Euclidean);

    assert!(index.search("anything", 5).unwrap().is_empty());
    assert_eq!(embedder.call_count(), 0);
    assert!(index.is_empty());
    assert_eq!(index.dimension(), None);
}

#[test]
fn test_zero_k_rejected() {
    let index = index_with_dim(2, DistanceMetric::Euclidean);
    assert!(matches!(index.search("q", 0), Err(IndexError::InvalidK)));
    assert!(matches!(
        index.search_vector(&[0.0, 0.0], 0),
        Err(IndexError::InvalidK)
    ));
}

#[test]
fn test_insert_fixes_dimension() {
    let index = index_with_dim(384, DistanceMetric::Euclidean);
    let total = index
        .insert(&["claim one", "claim two"], vec![source("a"), source("b")])
        .unwrap();

    assert_eq!(total, 2);
    assert_eq!(index.len(), 2);
    assert_eq!(index.dimension(), Some(384));
}

#[test]
fn test_shape_mismatch_leaves_index_unchanged() {
    let embedder = Arc::new(MockEmbedder::new());
    let index = FactCheckIndex::new(embedder.clone(), DistanceMetric::Euclidean);
    index.insert(&["seed"], vec![source("seed")]).unwrap();

    let err = index
        .insert(&["a", "b"], vec![source("only one")])
        .unwrap_err();

    assert!(matches!(
        err,
        IndexError::ShapeMismatch {
            texts: 2,
            sources: 1
        }
    ));
    assert!(err.is_shape_error());
    assert_eq!(index.len(), 1);
    // Rejected before embedding.
    assert_eq!(embedder.call_count(), 1);
}

#[test]
fn test_empty_insert_is_noop() {
    let index = index_with_dim(4, DistanceMetric::Euclidean);
    assert_eq!(index.insert(&[], vec![]).unwrap(), 0);
    assert_eq!(index.dimension(), None);
}

#[test]
fn test_dimension_mismatch_rejected() {
    let index = index_with_dim(3, DistanceMetric::Euclidean);
    index
        .insert_vectors(vec![vec![1.0, 0.0, 0.0]], vec![source("a")])
        .unwrap();

    let err = index
        .insert_vectors(
            vec![vec![0.0, 1.0, 0.0], vec![1.0, 1.0]],
            vec![source("b"), source("c")],
        )
        .unwrap_err();

    assert!(matches!(
        err,
        IndexError::DimensionMismatch {
            expected: 3,
            actual: 2
        }
    ));
    assert_eq!(index.len(), 1);
}

#[test]
fn test_vectors_must_match_embedder_dimension() {
    let index = index_with_dim(3, DistanceMetric::Euclidean);
    let err = index
        .insert_vectors(vec![vec![1.0, 0.0]], vec![source("a")])
        .unwrap_err();
    assert!(matches!(err, IndexError::DimensionMismatch { .. }));
    assert!(index.is_empty());
}

#[test]
fn test_search_orders_by_distance() {
    let index = index_with_dim(2, DistanceMetric::Euclidean);
    index
        .insert_vectors(
            vec![vec![3.0, 0.0], vec![0.0, 0.0], vec![1.0, 0.0]],
            vec![source("far"), source("exact"), source("near")],
        )
        .unwrap();

    let results = index.search_vector(&[0.0, 0.0], 5).unwrap();

    let names: Vec<&str> = results.iter().map(|c| c.source_name.as_str()).collect();
    assert_eq!(names, vec!["exact", "near", "far"]);
    assert!((results[0].confidence - 1.0).abs() < EPS);
    assert!((results[1].confidence - 0.5).abs() < EPS);
    assert!((results[2].confidence - 0.25).abs() < EPS);
    assert!(results.windows(2).all(|w| w[0].confidence >= w[1].confidence));
}

#[test]
fn test_search_truncates_to_k() {
    let index = index_with_dim(2, DistanceMetric::Euclidean);
    index
        .insert_vectors(
            vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![2.0, 0.0]],
            vec![source("a"), source("b"), source("c")],
        )
        .unwrap();

    assert_eq!(index.search_vector(&[0.0, 0.0], 2).unwrap().len(), 2);
    assert_eq!(index.search_vector(&[0.0, 0.0], 10).unwrap().len(), 3);
}

#[test]
fn test_squared_euclidean_confidence() {
    let index = index_with_dim(2, DistanceMetric::SquaredEuclidean);
    index
        .insert_vectors(vec![vec![2.0, 0.0]], vec![source("a")])
        .unwrap();

    let results = index.search_vector(&[0.0, 0.0], 1).unwrap();
    assert!((results[0].confidence - 0.2).abs() < EPS);
}

#[test]
fn test_cosine_distance() {
    let metric = DistanceMetric::Cosine;
    assert!(metric.distance(&[1.0, 0.0], &[2.0, 0.0]).abs() < EPS);
    assert!((metric.distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < EPS);
    assert!((metric.distance(&[0.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < EPS);
}

#[test]
fn test_query_dimension_mismatch() {
    let index = index_with_dim(2, DistanceMetric::Euclidean);
    index
        .insert_vectors(vec![vec![0.0, 1.0]], vec![source("a")])
        .unwrap();
    let err = index.search_vector(&[0.0, 1.0, 2.0], 1).unwrap_err();
    assert!(matches!(err, IndexError::DimensionMismatch { .. }));
}

#[test]
fn test_search_with_embedder_finds_exact_text() {
    let index = index_with_dim(64, DistanceMetric::Euclidean);
    index
        .insert(
            &[
                "The dam was built in 1962",
                "Vaccines cause no harm to adults",
                "The moon is made of cheese",
            ],
            vec![source("dam"), source("vaccine"), source("moon")],
        )
        .unwrap();

    let results = index.search("Vaccines cause no harm to adults", 3).unwrap();
    assert_eq!(results[0].source_name, "vaccine");
    assert!((results[0].confidence - 1.0).abs() < EPS);
}

#[test]
fn test_search_embedder_failure_propagates() {
    let index = FactCheckIndex::new(
        Arc::new(MockEmbedder::new().fail_on("poison")),
        DistanceMetric::Euclidean,
    );
    index.insert(&["fine"], vec![source("a")]).unwrap();

    let err = index.search("poison query", 1).unwrap_err();
    assert!(matches!(err, IndexError::Embedding(_)));
    assert!(!err.is_shape_error());
}

#[test]
fn test_concurrent_readers_see_whole_batches() {
    let index = Arc::new(index_with_dim(8, DistanceMetric::Euclidean));

    let writer = {
        let index = index.clone();
        std::thread::spawn(move || {
            for batch in 0..20 {
                let texts: Vec<String> = (0..5).map(|i| format!("claim {batch}-{i}")).collect();
                let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
                let sources = (0..5).map(|i| source(&format!("{batch}-{i}"))).collect();
                index.insert(&refs, sources).unwrap();
            }
        })
    };

    for _ in 0..200 {
        let entries = index.entries();
        assert_eq!(entries.len() % 5, 0);
    }

    writer.join().unwrap();
    assert_eq!(index.len(), 100);
}

#[test]
fn test_source_metadata_defaults() {
    let meta: SourceMetadata = serde_json::from_str("{}").unwrap();
    assert_eq!(meta, SourceMetadata::default());
    assert_eq!(meta.source_name, "Unknown");
    assert_eq!(meta.url, "");

    let legacy: SourceMetadata =
        serde_json::from_str(r#"{"source": "AltNews", "url": "https://altnews.in"}"#).unwrap();
    assert_eq!(legacy.source_name, "AltNews");
}

#[test]
fn test_metric_from_str() {
    assert_eq!(
        "Euclidean".parse::<DistanceMetric>().unwrap(),
        DistanceMetric::Euclidean
    );
    assert_eq!(
        "squared_euclidean".parse::<DistanceMetric>().unwrap(),
        DistanceMetric::SquaredEuclidean
    );
    assert_eq!(
        "cosine".parse::<DistanceMetric>().unwrap(),
        DistanceMetric::Cosine
    );
    assert!(matches!(
        "manhattan".parse::<DistanceMetric>(),
        Err(IndexError::UnknownMetric { .. })
    ));
}

#[test]
fn test_snapshot_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");

    let index = index_with_dim(16, DistanceMetric::Euclidean);
    index
        .insert(&["first claim", "second claim"], vec![source("a"), source("b")])
        .unwrap();
    assert_eq!(index.save_snapshot(&path).unwrap(), 2);

    let restored = index_with_dim(16, DistanceMetric::Euclidean);
    assert_eq!(restored.load_snapshot(&path).unwrap(), 2);
    assert_eq!(restored.dimension(), Some(16));
    assert_eq!(restored.entries(), index.entries());

    let results = restored.search("second claim", 1).unwrap();
    assert_eq!(results[0].source_name, "b");
}

#[test]
fn test_load_snapshot_missing_file() {
    let index = index_with_dim(4, DistanceMetric::Euclidean);
    let err = index
        .load_snapshot(std::path::Path::new("/nonexistent/index.json"))
        .unwrap_err();
    assert!(matches!(err, IndexError::SnapshotIo { .. }));
}

#[test]
fn test_load_snapshot_rejects_ragged_vectors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");
    std::fs::write(
        &path,
        r#"{"dimension": 2, "entries": [
            {"embedding": [0.0, 1.0], "source_name": "a", "url": ""},
            {"embedding": [0.0], "source_name": "b", "url": ""}
        ]}"#,
    )
    .unwrap();

    let index = index_with_dim(2, DistanceMetric::Euclidean);
    let err = index.load_snapshot(&path).unwrap_err();
    assert!(matches!(err, IndexError::SnapshotInvalid { .. }));
    assert!(index.is_empty());
}

#[test]
fn test_load_snapshot_rejects_wrong_embedder_dimension() {
    let snapshot = IndexSnapshot {
        version: SNAPSHOT_VERSION,
        metric: DistanceMetric::Euclidean,
        dimension: Some(2),
        entries: vec![IndexEntry {
            embedding: vec![0.0, 1.0],
            source: source("a"),
        }],
    };
    let result = FactCheckIndex::from_snapshot(
        Arc::new(MockEmbedder::with_dim(8)),
        DistanceMetric::Euclidean,
        snapshot,
    );
    assert!(matches!(result, Err(IndexError::DimensionMismatch { .. })));
}

#[test]
fn test_load_snapshot_defaults_missing_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");
    std::fs::write(&path, r#"{"dimension": 2, "entries": [{"embedding": [0.5, 0.5]}]}"#).unwrap();

    let index = index_with_dim(2, DistanceMetric::Euclidean);
    index.load_snapshot(&path).unwrap();
    assert_eq!(index.entries()[0].source.source_name, "Unknown");
}
