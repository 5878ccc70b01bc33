use std::sync::Arc;

use super::mock::MockRecognizer;
use super::*;

fn tags(spec: &[(usize, usize, &str)]) -> Vec<TokenTag> {
    spec.iter()
        .map(|(start, end, label)| TokenTag::new(*start, *end, *label))
        .collect()
}

#[test]
fn test_merge_bio_groups_inside_tokens() {
    let text = "Narendra Modi visited New Delhi";
    let entities = merge_bio(
        text,
        &tags(&[
            (0, 0, "O"),
            (0, 8, "B-PER"),
            (9, 13, "I-PER"),
            (14, 21, "O"),
            (22, 25, "B-LOC"),
            (26, 31, "I-LOC"),
            (0, 0, "O"),
        ]),
    );

    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0].text, "Narendra Modi");
    assert_eq!(entities[0].entity_type, "PER");
    assert_eq!(entities[0].span, (0, 13));
    assert_eq!(entities[1].text, "New Delhi");
    assert_eq!(entities[1].entity_type, "LOC");
}

#[test]
fn test_merge_bio_begin_splits_adjacent_entities() {
    let text = "Paris London";
    let entities = merge_bio(text, &tags(&[(0, 5, "B-LOC"), (6, 12, "B-LOC")]));
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[1].text, "London");
}

#[test]
fn test_merge_bio_joins_word_pieces() {
    // "Bengaluru" tokenized as "Ben" "##gal" "##uru", each tagged B-LOC.
    let text = "in Bengaluru today";
    let entities = merge_bio(
        text,
        &tags(&[(3, 6, "B-LOC"), (6, 9, "B-LOC"), (9, 12, "B-LOC")]),
    );
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].text, "Bengaluru");
}

#[test]
fn test_merge_bio_type_change_starts_new_entity() {
    let text = "Google Inc";
    let entities = merge_bio(text, &tags(&[(0, 6, "B-ORG"), (7, 10, "I-MISC")]));
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[1].entity_type, "MISC");
}

#[test]
fn test_stitched_windows_keep_entities_from_every_window() {
    let text = "Dr Asha Rao spoke in Mumbai and then Pune";
    let first = tags(&[
        (0, 2, "O"),
        (3, 7, "B-PER"),
        (8, 11, "I-PER"),
        (12, 17, "O"),
        (18, 20, "O"),
        (21, 27, "B-LOC"),
    ]);
    let second = tags(&[
        (12, 17, "O"),
        (18, 20, "O"),
        (21, 27, "B-LOC"),
        (28, 31, "O"),
        (32, 36, "O"),
        (37, 41, "B-LOC"),
    ]);

    let stitched = stitch_windows(vec![first, second]);
    assert_eq!(stitched.len(), 9);
    assert!(stitched.windows(2).all(|w| w[0].end <= w[1].start));

    let entities = merge_bio(text, &stitched);
    let names: Vec<&str> = entities.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(names, vec!["Asha Rao", "Mumbai", "Pune"]);
}

#[test]
fn test_stitched_windows_join_entity_across_boundary() {
    // The first window ends inside "Mumbai"; the second repeats that piece.
    let text = "flights to Mumbai resumed";
    let first = tags(&[(0, 7, "O"), (8, 10, "O"), (11, 14, "B-LOC")]);
    let second = tags(&[(11, 14, "B-LOC"), (14, 17, "B-LOC"), (18, 25, "O")]);

    let entities = merge_bio(text, &stitch_windows(vec![first, second]));
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].text, "Mumbai");
    assert_eq!(entities[0].span, (11, 17));
}

#[test]
fn test_stitch_single_window_is_unchanged() {
    let window = tags(&[(0, 5, "B-LOC"), (6, 12, "B-LOC")]);
    assert_eq!(stitch_windows(vec![window.clone()]), window);
    assert!(stitch_windows(Vec::new()).is_empty());
}

#[test]
fn test_merge_bio_unprefixed_labels() {
    let text = "Reserve Bank said";
    let entities = merge_bio(text, &tags(&[(0, 7, "ORG"), (8, 12, "ORG"), (13, 17, "O")]));
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].text, "Reserve Bank");
}

#[test]
fn test_merge_bio_invalid_offsets_dropped() {
    let text = "short";
    let entities = merge_bio(text, &tags(&[(2, 40, "B-PER")]));
    assert!(entities.is_empty());
}

#[test]
fn test_entity_span_invariant_multibyte() {
    let text = "मोदी ने कहा";
    // "मोदी" is 12 bytes.
    let entity = Entity::from_span(text, 0, 12, "PER").unwrap();
    assert_eq!(entity.text, "मोदी");
    assert_eq!(&text[entity.start()..entity.end()], entity.text);

    // Offset inside a character.
    assert!(Entity::from_span(text, 0, 5, "PER").is_none());
    assert!(Entity::from_span(text, 3, 3, "PER").is_none());
}

#[test]
fn test_entity_serializes_type_and_span() {
    let entity = Entity::from_span("Delhi", 0, 5, "GPE").unwrap();
    let json = serde_json::to_value(&entity).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"text": "Delhi", "type": "GPE", "span": [0, 5]})
    );
}

#[test]
fn test_registry_routes_by_language() {
    let english = Arc::new(MockRecognizer::new("EN"));
    let multilingual = Arc::new(MockRecognizer::new("XX"));
    let registry = RecognizerRegistry::new()
        .with_language("en", english.clone())
        .with_fallback(multilingual.clone());

    let en = registry.extract("Ravi met Priya", "en-US").unwrap();
    assert!(en.entities.iter().all(|e| e.entity_type == "EN"));
    assert_eq!(en.entities.len(), 2);

    let hi = registry.extract("Ravi met Priya", "hi").unwrap();
    assert!(hi.entities.iter().all(|e| e.entity_type == "XX"));

    assert_eq!(english.call_count(), 1);
    assert_eq!(multilingual.call_count(), 1);
}

#[test]
fn test_registry_english_model_covers_other_languages() {
    let english = Arc::new(MockRecognizer::new("EN"));
    let registry = RecognizerRegistry::from_models(Some(english.clone()), None);

    let hindi = registry.extract("Ravi met Priya in Pune", "hi").unwrap();
    assert!(!hindi.entities.is_empty());
    assert!(hindi.entities.iter().all(|e| e.entity_type == "EN"));
    assert!(hindi.degraded.is_none());
    assert_eq!(english.call_count(), 1);

    let multilingual = RecognizerRegistry::from_models(
        Some(english),
        Some(Arc::new(MockRecognizer::new("XX"))),
    );
    let hindi = multilingual.extract("Ravi met Priya in Pune", "hi").unwrap();
    assert!(hindi.entities.iter().all(|e| e.entity_type == "XX"));
    let english = multilingual.extract("Ravi met Priya in Pune", "en").unwrap();
    assert!(english.entities.iter().all(|e| e.entity_type == "EN"));

    let empty = RecognizerRegistry::from_models(None, None);
    assert!(empty.recognizer_for("hi").is_none());
}

#[test]
fn test_registry_without_recognizers_returns_empty() {
    let extraction = RecognizerRegistry::new().extract("Ravi met Priya", "en").unwrap();
    assert!(extraction.entities.is_empty());
    assert!(extraction.degraded.is_none());
}

#[test]
fn test_registry_failure_degrades_to_empty() {
    let registry = RecognizerRegistry::new().with_fallback(Arc::new(MockRecognizer::failing()));
    let extraction = registry.extract("Ravi met Priya", "en").unwrap();
    assert!(extraction.entities.is_empty());
    assert!(extraction.degraded.is_some());
}

#[test]
fn test_registry_unavailable_is_fatal() {
    let registry =
        RecognizerRegistry::new().with_fallback(Arc::new(MockRecognizer::unavailable()));
    let err = registry.extract("Ravi met Priya", "en").unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn test_null_recognizer() {
    assert!(NullRecognizer.recognize("Ravi met Priya").unwrap().is_empty());
}

#[test]
fn test_bert_recognizer_missing_model() {
    let err = BertEntityRecognizer::load("/nonexistent/ner").unwrap_err();
    assert!(matches!(err, EntityError::ModelLoadFailed { .. }));
}
