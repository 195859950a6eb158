//! End-to-end single-document extraction tests.
//!
//! Covers ranking determinism, stop-word exclusion, domain boosting,
//! per-call options and category coverage.

use pretty_assertions::assert_eq;

use e2e_tests::{create_document, has_category, terms, TestHarness};
use topic_extraction::{is_stop_word, EventKind, ExtractionOptions, TopicEvent, TopicsError};
use topic_types::Category;

#[tokio::test]
async fn test_extracts_topics_from_simple_document() {
    let harness = TestHarness::new();
    let doc = create_document(
        "doc-1",
        "The AOMA system handles asset management and metadata validation. AOMA processes audio submissions through the ingestion workflow.",
    );

    let topics = harness.engine.process_document(doc).await.unwrap();

    assert!(!topics.is_empty());
    assert_eq!(topics[0].term, "aoma");
    for pair in topics.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_extraction_is_deterministic() {
    let harness = TestHarness::new();
    let text = "Metadata validation rejects the audio asset. The validation workflow retries the asset ingestion.";
    let options = ExtractionOptions::default().with_ngrams(2);

    let first = harness
        .engine
        .process_document_with(create_document("det-1", text), &options)
        .await
        .unwrap();
    harness.engine.clear_cache().await;
    let second = harness
        .engine
        .process_document_with(create_document("det-1", text), &options)
        .await
        .unwrap();

    assert_eq!(terms(&first), terms(&second));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_stop_words_never_become_topics() {
    let harness = TestHarness::new();
    let doc = create_document(
        "doc-3",
        "The system is working and it has been updated. This is the way we do things.",
    );

    let topics = harness
        .engine
        .process_document_with(doc, &ExtractionOptions::default().with_min_term_length(1))
        .await
        .unwrap();

    assert!(!topics.is_empty());
    assert!(topics.iter().all(|t| !is_stop_word(&t.term)));
}

#[tokio::test]
async fn test_domain_terms_are_boosted() {
    let harness = TestHarness::new();
    let doc = create_document(
        "doc-2",
        "AOMA handles asset ingestion. The workflow processes metadata validation. Random words like banana and elephant appear too.",
    );

    let topics = harness
        .engine
        .process_document_with(doc, &ExtractionOptions::default().with_max_terms(5))
        .await
        .unwrap();

    let domain = ["aoma", "asset", "metadata", "workflow", "ingestion", "validation"];
    assert!(topics.iter().all(|t| domain.contains(&t.term.as_str())));
}

#[tokio::test]
async fn test_inflected_and_compound_domain_terms_are_boosted() {
    let harness = TestHarness::new();
    let topics = harness
        .engine
        .process_document(create_document("doc-inflected", "assets banana aoma-workflow elephant"))
        .await
        .unwrap();

    let score = |term: &str| topics.iter().find(|t| t.term == term).unwrap().score;
    assert!(score("assets") > score("banana"));
    assert!(score("aoma-workflow") > score("elephant"));
    assert!((score("assets") - 1.5 * score("banana")).abs() < 1e-9);
    assert_eq!(terms(&topics)[..2], ["aoma-workflow", "assets"]);
}

#[tokio::test]
async fn test_min_term_length() {
    let harness = TestHarness::new();
    let doc = create_document("doc-4", "API is OK but AWS S3 works great for storage");

    let topics = harness
        .engine
        .process_document_with(doc, &ExtractionOptions::default().with_min_term_length(4))
        .await
        .unwrap();

    assert_eq!(terms(&topics), vec!["great", "storage", "works"]);
    assert!(topics.iter().all(|t| t.is_ngram() || t.term.chars().count() >= 4));
}

#[tokio::test]
async fn test_ngram_extraction() {
    let harness = TestHarness::new();
    let doc = create_document(
        "doc-5",
        "The error handling system catches validation errors. Error handling is important.",
    );

    let topics = harness
        .engine
        .process_document_with(doc, &ExtractionOptions::default().with_ngrams(2))
        .await
        .unwrap();

    let bigrams: Vec<&str> = topics
        .iter()
        .filter(|t| t.is_ngram())
        .map(|t| t.term.as_str())
        .collect();
    assert!(bigrams.contains(&"error handling"));
}

#[tokio::test]
async fn test_topics_carry_document_id() {
    let harness = TestHarness::new();
    harness
        .engine
        .process_document(create_document("other", "Testing unrelated extraction"))
        .await
        .unwrap();

    let topics = harness
        .engine
        .process_document(create_document("doc-unique-id", "Testing document topic extraction"))
        .await
        .unwrap();

    assert!(!topics.is_empty());
    assert!(topics.iter().all(|t| t.has_document("doc-unique-id")));
}

#[tokio::test]
async fn test_max_terms_limits_output() {
    let harness = TestHarness::new();
    let doc = create_document(
        "doc-6",
        "Alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu nu xi omicron pi rho sigma tau upsilon phi chi psi omega",
    );

    let topics = harness
        .engine
        .process_document_with(doc, &ExtractionOptions::default().with_max_terms(5))
        .await
        .unwrap();

    assert_eq!(topics.len(), 5);
    // Truncation keeps the head of the ranking; lambda is a domain term.
    assert_eq!(topics[0].term, "lambda");
    // Document frequencies still see every term.
    assert!(harness.engine.stats().await.term_count > 5);
}

#[tokio::test]
async fn test_category_coverage() {
    let cases = [
        (
            "System error occurred during validation. The bug causes failures in production. Issue reported by users.",
            Category::Error,
        ),
        (
            "API endpoint integration with third-party services. The REST API connects to external systems.",
            Category::Integration,
        ),
        (
            "Performance optimization improved speed by 50%. Query optimization reduced latency.",
            Category::Performance,
        ),
        (
            "Authentication system uses OAuth. Authorization checks permission levels.",
            Category::Security,
        ),
        (
            "New feature enhancement adds upload capability. Feature request for bulk import.",
            Category::Feature,
        ),
        (
            "The workflow process handles submissions. Standard procedure for ingestion.",
            Category::Process,
        ),
        (
            "Lambda function handles data transformation. Database schema updated.",
            Category::Technical,
        ),
    ];

    for (i, (content, category)) in cases.iter().enumerate() {
        let harness = TestHarness::new();
        let topics = harness
            .engine
            .process_document(create_document(&format!("cat-{i}"), content))
            .await
            .unwrap();
        assert!(
            has_category(&topics, *category),
            "expected a {category} topic in {:?}",
            terms(&topics)
        );
    }
}

#[tokio::test]
async fn test_unmatched_terms_default_to_technical() {
    let harness = TestHarness::new();
    let topics = harness
        .engine
        .process_document(create_document(
            "tech",
            "Lambda function handles data transformation. Database schema updated.",
        ))
        .await
        .unwrap();

    assert!(topics.iter().all(|t| t.category == Category::Technical));
}

#[tokio::test]
async fn test_degenerate_documents() {
    let harness = TestHarness::new();

    let empty = harness
        .engine
        .process_document(create_document("empty", ""))
        .await
        .unwrap();
    assert!(empty.is_empty());

    let stop_only = harness
        .engine
        .process_document(create_document("stop", "the and is of to"))
        .await
        .unwrap();
    assert!(stop_only.is_empty());

    let single = harness
        .engine
        .process_document(create_document("single", "glacier"))
        .await
        .unwrap();
    assert_eq!(terms(&single), vec!["glacier"]);
    assert!(single[0].score.is_finite());
}

#[tokio::test]
async fn test_invalid_options_are_rejected() {
    let harness = TestHarness::new();
    let invalid = [
        ExtractionOptions::default().with_max_terms(0),
        ExtractionOptions::default().with_min_score(f64::NAN),
        ExtractionOptions::default().with_ngrams(1),
    ];

    for options in invalid {
        let result = harness
            .engine
            .process_document_with(create_document("bad", "aspera upload"), &options)
            .await;
        assert!(matches!(result, Err(TopicsError::InvalidConfig(_))));
    }

    assert_eq!(harness.engine.stats().await.document_count, 0);
    assert_eq!(harness.events.count(EventKind::TopicsExtracted), 0);
}

#[tokio::test]
async fn test_topics_extracted_event() {
    let harness = TestHarness::new();
    let topics = harness
        .engine
        .process_document(create_document("event-1", "Event test content"))
        .await
        .unwrap();

    let events = harness.events.of_kind(EventKind::TopicsExtracted);
    assert_eq!(
        events,
        vec![TopicEvent::TopicsExtracted {
            document_id: "event-1".to_string(),
            topics,
        }]
    );
}
