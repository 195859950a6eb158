//! End-to-end test infrastructure for the topic extraction engine.
//!
//! Provides a shared TestHarness and helper functions for E2E tests
//! covering the full document-to-query pipeline.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use topic_extraction::{EventKind, TopicEvent, TopicExtractor};
use topic_types::{Category, Document, DocumentType, ExtractedTopic};

/// Shared test harness for E2E tests.
///
/// Owns an engine with an event recorder attached and a temp directory for
/// snapshot and document files.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Engine under test
    pub engine: Arc<TopicExtractor>,
    /// Every event the engine emitted
    pub events: EventRecorder,
    /// Path for snapshot files
    pub snapshot_path: PathBuf,
}

impl TestHarness {
    /// Create a harness with a default engine.
    pub fn new() -> Self {
        Self::with_engine(TopicExtractor::new())
    }

    /// Create a harness around an existing engine.
    pub fn with_engine(engine: TopicExtractor) -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let snapshot_path = temp_dir.path().join("topics.json");
        let engine = Arc::new(engine);
        let events = EventRecorder::attach(&engine);

        Self {
            _temp_dir: temp_dir,
            engine,
            events,
            snapshot_path,
        }
    }

    /// Write documents as a JSON array into the temp dir.
    pub fn write_documents(&self, name: &str, documents: &[Document]) -> PathBuf {
        let path = self._temp_dir.path().join(name);
        let json = serde_json::to_string_pretty(documents).expect("Failed to serialize documents");
        std::fs::write(&path, json).expect("Failed to write documents");
        path
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Records every event an engine emits.
#[derive(Clone, Default)]
pub struct EventRecorder {
    seen: Arc<Mutex<Vec<TopicEvent>>>,
}

impl EventRecorder {
    /// Subscribe to every event kind of the engine.
    pub fn attach(engine: &TopicExtractor) -> Self {
        let recorder = Self::default();
        for kind in [
            EventKind::TopicsExtracted,
            EventKind::ClusteringComplete,
            EventKind::TopicsImported,
            EventKind::CacheCleared,
            EventKind::Error,
        ] {
            let seen = Arc::clone(&recorder.seen);
            engine.subscribe(
                kind,
                Arc::new(move |event: &TopicEvent| seen.lock().expect("recorder lock").push(event.clone())),
            );
        }
        recorder
    }

    /// All recorded events in emission order.
    pub fn all(&self) -> Vec<TopicEvent> {
        self.seen.lock().expect("recorder lock").clone()
    }

    /// Recorded events of one kind.
    pub fn of_kind(&self, kind: EventKind) -> Vec<TopicEvent> {
        self.all().into_iter().filter(|e| e.kind() == kind).collect()
    }

    /// Number of recorded events of one kind.
    pub fn count(&self, kind: EventKind) -> usize {
        self.of_kind(kind).len()
    }
}

/// Fixed reference time so timestamps are reproducible.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .expect("valid base time")
}

/// Create a technical document at the reference time.
pub fn create_document(id: &str, content: &str) -> Document {
    Document::new(id, content, DocumentType::TechnicalDoc).with_timestamp(base_time())
}

/// Create a technical document the given number of seconds before the reference time.
pub fn create_document_aged(id: &str, content: &str, age_secs: i64) -> Document {
    create_document(id, content).with_timestamp(base_time() - Duration::seconds(age_secs))
}

/// Terms of a topic list in order.
pub fn terms(topics: &[ExtractedTopic]) -> Vec<String> {
    topics.iter().map(|t| t.term.clone()).collect()
}

/// Whether any topic has the given category.
pub fn has_category(topics: &[ExtractedTopic], category: Category) -> bool {
    topics.iter().any(|t| t.category == category)
}

/// Documents mixing support notes, release notes and Jira tickets.
pub fn asset_corpus() -> Vec<Document> {
    vec![
        Document::new(
            "jira-1",
            "Aspera upload error when the asset submission times out. Upload error repeats.",
            DocumentType::JiraTicket,
        )
        .with_title("Aspera upload error")
        .with_metadata("ticket_id", "AOMA-2001")
        .with_timestamp(base_time() - Duration::days(20)),
        Document::new(
            "release-1",
            "Release adds glacier archive restore and faster metadata validation.",
            DocumentType::ReleaseNote,
        )
        .with_title("Release 8.5")
        .with_timestamp(base_time() - Duration::days(10)),
        Document::new(
            "support-1",
            "Support procedure for metadata validation failures in the ingestion workflow.",
            DocumentType::SupportNote,
        )
        .with_title("Validation troubleshooting")
        .with_timestamp(base_time()),
    ]
}
