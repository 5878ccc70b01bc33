use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::claim::mock::MockSummarizer;
use crate::embedding::MockEmbedder;
use crate::entities::RecognizerRegistry;
use crate::entities::mock::MockRecognizer;
use crate::index::{DistanceMetric, FactCheckIndex, SourceMetadata};
use crate::scoring::mock::FixedScorer;
use crate::scoring::{ModelScorer, ScoreSet, ScoringError, Sentiment, SignalKind, TextScorer};
use crate::verdict::Verdict;

use super::*;

fn index(embedder: MockEmbedder) -> Arc<FactCheckIndex> {
    Arc::new(FactCheckIndex::new(
        Arc::new(embedder),
        DistanceMetric::Euclidean,
    ))
}

fn heuristic_analyzer(index: Arc<FactCheckIndex>) -> Analyzer {
    Analyzer::new(index, Arc::new(ModelScorer::new())).unwrap()
}

#[test]
fn test_text_input_rejects_blank() {
    assert!(matches!(
        TextInput::new("   \n\t"),
        Err(PipelineError::InvalidInput { .. })
    ));
    assert!(TextInput::new("").is_err());

    let input = TextInput::new("A claim").unwrap();
    assert_eq!(input.language(), "en");
    assert_eq!(input.url(), None);
}

#[tokio::test]
async fn test_analyze_empty_index() {
    let analyzer = heuristic_analyzer(index(MockEmbedder::new()));
    let input = TextInput::new("BREAKING: Officials confirmed the event!!!")
        .unwrap()
        .with_url("https://news.example/story");

    let result = analyzer.analyze(&input).await.unwrap();

    assert_eq!(result.claim, "BREAKING: Officials confirmed the event");
    assert!(result.source_candidates.is_empty());
    assert!((result.scores.sensationalism - 0.25).abs() < 1e-9);
    assert!((result.scores.factuality - 0.6).abs() < 1e-9);
    assert_eq!(result.source_url.as_deref(), Some("https://news.example/story"));
    assert_eq!(result.language, "en");
    assert_eq!(result.model_version, crate::constants::MODEL_VERSION);
    // base = 0.30 - 0.0375 = 0.2625
    assert_eq!(result.verdict, Verdict::False);
    assert!(result.explanation.starts_with("Verdict 'false' based on: "));
}

#[tokio::test]
async fn test_analyze_retrieves_with_claim() {
    let index = index(MockEmbedder::new());
    index
        .insert(
            &[
                "The new metro line opens in March",
                "Drinking seawater cures fever",
            ],
            vec![
                SourceMetadata::new("Metro Authority", "https://metro.example"),
                SourceMetadata::new("Health Desk", "https://health.example"),
            ],
        )
        .unwrap();

    let analyzer = heuristic_analyzer(index);
    let input = TextInput::new("Drinking seawater cures fever. Share this widely!").unwrap();
    let result = analyzer.analyze(&input).await.unwrap();

    assert_eq!(result.source_candidates.len(), 2);
    assert_eq!(result.source_candidates[0].source_name, "Health Desk");
    assert!((result.source_candidates[0].confidence - 1.0).abs() < 1e-5);
}

#[tokio::test]
async fn test_top_k_limits_candidates() {
    let index = index(MockEmbedder::new());
    let texts: Vec<String> = (0..8).map(|i| format!("fact check number {i}")).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let sources = (0..8).map(|i| SourceMetadata::new(format!("s{i}"), "")).collect();
    index.insert(&refs, sources).unwrap();

    let default_k = heuristic_analyzer(index.clone());
    let input = TextInput::new("fact check number 3 is wrong").unwrap();
    assert_eq!(default_k.analyze(&input).await.unwrap().source_candidates.len(), 5);

    let small_k = heuristic_analyzer(index).with_top_k(2);
    assert_eq!(small_k.analyze(&input).await.unwrap().source_candidates.len(), 2);
}

#[tokio::test]
async fn test_degraded_signals_still_produce_verdict() {
    let scorer = FixedScorer::new(ScoreSet::neutral())
        .fail_signal(SignalKind::Bias)
        .fail_signal(SignalKind::Factuality);
    let recognizers = RecognizerRegistry::new().with_fallback(Arc::new(MockRecognizer::failing()));
    let analyzer = Analyzer::new(index(MockEmbedder::new()), Arc::new(scorer))
        .unwrap()
        .with_recognizers(recognizers);

    let result = analyzer
        .analyze(&TextInput::new("Some claim about Delhi").unwrap())
        .await
        .unwrap();

    let kinds: Vec<SignalKind> = result.degraded_signals.iter().map(|d| d.signal).collect();
    assert!(kinds.contains(&SignalKind::Bias));
    assert!(kinds.contains(&SignalKind::Factuality));
    assert!(kinds.contains(&SignalKind::Entities));
    assert!(result.entities.is_empty());
    assert_eq!(result.scores.factuality, 0.5);
}

#[tokio::test]
async fn test_scorer_unavailable_fails_request() {
    let scorer = FixedScorer::default().unavailable_on("offline");
    let analyzer = Analyzer::new(index(MockEmbedder::new()), Arc::new(scorer)).unwrap();

    let err = analyzer
        .analyze(&TextInput::new("scoring backend offline now").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::CapabilityUnavailable { ref capability, .. } if capability == "scoring"
    ));
}

#[tokio::test]
async fn test_recognizer_unavailable_fails_request() {
    let recognizers =
        RecognizerRegistry::new().with_fallback(Arc::new(MockRecognizer::unavailable()));
    let analyzer = heuristic_analyzer(index(MockEmbedder::new())).with_recognizers(recognizers);

    let err = analyzer
        .analyze(&TextInput::new("Ravi met Priya in Pune").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::CapabilityUnavailable { ref capability, .. } if capability == "entities"
    ));
}

#[tokio::test]
async fn test_entities_use_language_recognizer() {
    let recognizers = RecognizerRegistry::new()
        .with_language("en", Arc::new(MockRecognizer::new("EN")))
        .with_fallback(Arc::new(MockRecognizer::new("XX")));
    let analyzer = heuristic_analyzer(index(MockEmbedder::new())).with_recognizers(recognizers);

    let input = TextInput::new("Ravi met Priya in Pune today").unwrap();
    let result = analyzer.analyze(&input).await.unwrap();

    let names: Vec<&str> = result.entities.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(names, vec!["Ravi", "Priya", "Pune"]);
    for entity in &result.entities {
        assert_eq!(entity.entity_type, "EN");
        assert_eq!(&input.text()[entity.start()..entity.end()], entity.text);
    }

    let hindi = input.clone().with_language("hi");
    let result = analyzer.analyze(&hindi).await.unwrap();
    assert!(result.entities.iter().all(|e| e.entity_type == "XX"));
}

#[tokio::test]
async fn test_auto_language_is_resolved() {
    let analyzer = heuristic_analyzer(index(MockEmbedder::new()));
    let input = TextInput::new(
        "The health ministry confirmed that the vaccination drive will continue next week.",
    )
    .unwrap()
    .with_language("auto");

    let result = analyzer.analyze(&input).await.unwrap();
    assert_eq!(result.language, "en");
}

#[tokio::test]
async fn test_long_text_uses_summarizer() {
    let summarizer = Arc::new(MockSummarizer::returning("Water supply will be cut"));
    let analyzer =
        heuristic_analyzer(index(MockEmbedder::new())).with_summarizer(summarizer.clone());

    let text = "Residents were told today that the water supply is going to be cut. ".repeat(6);
    let result = analyzer.analyze(&TextInput::new(text).unwrap()).await.unwrap();

    assert_eq!(result.claim, "Water supply will be cut");
    assert_eq!(summarizer.call_count(), 1);
}

#[tokio::test]
async fn test_paraphrase_returned() {
    let analyzer = heuristic_analyzer(index(MockEmbedder::new()));
    let result = analyzer
        .analyze(&TextInput::new("The dam is full and has cracks. Evacuate now").unwrap())
        .await
        .unwrap();

    assert_eq!(result.claim, "The dam is full and has cracks");
    assert_eq!(
        result.paraphrase,
        "The dam appears to be full and reportedly has cracks"
    );
}

#[tokio::test]
async fn test_cancelled_before_retrieval() {
    let embedder_index = index(MockEmbedder::new());
    embedder_index
        .insert(&["seed"], vec![SourceMetadata::default()])
        .unwrap();
    let analyzer = heuristic_analyzer(embedder_index);

    let cancel = CancelToken::new();
    cancel.cancel();

    let err = analyzer
        .analyze_with_cancel(&TextInput::new("Some claim text here").unwrap(), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Cancelled));
}

#[tokio::test]
async fn test_batch_isolates_failures() {
    let index = index(MockEmbedder::new().fail_on("poison"));
    index
        .insert(&["a verified claim"], vec![SourceMetadata::default()])
        .unwrap();
    let analyzer = heuristic_analyzer(index);

    let inputs = vec![
        TextInput::new("The first claim is fine.").unwrap(),
        TextInput::new("The poison claim breaks the embedder.").unwrap(),
        TextInput::new("The third claim is fine too.").unwrap(),
    ];
    let results = analyzer.analyze_batch(&inputs).await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(PipelineError::CapabilityUnavailable { ref capability, .. }) if capability == "embedding"
    ));
    assert!(results[2].is_ok());
    assert_eq!(
        results[2].as_ref().unwrap().claim,
        "The third claim is fine too"
    );
}

/// Sleeps inside sentiment scoring and records how many calls overlap.
#[derive(Default)]
struct SlowScorer {
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl TextScorer for SlowScorer {
    fn sentiment(&self, _text: &str, _language: &str) -> Result<Sentiment, ScoringError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(100));
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(Sentiment::neutral())
    }

    fn bias(&self, _text: &str, _language: &str) -> Result<f64, ScoringError> {
        Ok(0.0)
    }

    fn sensationalism(&self, _text: &str, _language: &str) -> Result<f64, ScoringError> {
        Ok(0.0)
    }

    fn factuality(&self, _text: &str, _language: &str) -> Result<f64, ScoringError> {
        Ok(0.5)
    }

    fn toxicity(&self, _text: &str, _language: &str) -> Result<f64, ScoringError> {
        Ok(0.0)
    }
}

#[tokio::test]
async fn test_batch_items_score_in_parallel() {
    let scorer = Arc::new(SlowScorer::default());
    let analyzer = Analyzer::new(index(MockEmbedder::new()), scorer.clone()).unwrap();

    let inputs: Vec<TextInput> = (0..4)
        .map(|i| TextInput::new(format!("Claim number {i} about the monsoon")).unwrap())
        .collect();
    let results = analyzer.analyze_batch(&inputs).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert!(
        scorer.peak.load(Ordering::SeqCst) >= 2,
        "batch items were scored one at a time"
    );
}

#[tokio::test]
async fn test_empty_batch() {
    let analyzer = heuristic_analyzer(index(MockEmbedder::new()));
    assert!(analyzer.analyze_batch(&[]).await.is_empty());
}

#[tokio::test]
async fn test_verdict_result_serializes() {
    let analyzer = heuristic_analyzer(index(MockEmbedder::new()));
    let result = analyzer
        .analyze(&TextInput::new("Officials confirmed the bridge is safe").unwrap())
        .await
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["verdict"], result.verdict.as_str());
    assert!(json["scores"]["sentiment"]["label"].is_string());
    assert!(json["degraded_signals"].is_array());
    assert!(json["source_url"].is_null());
}
