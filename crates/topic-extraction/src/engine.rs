//! Async topic extraction engine.
//!
//! [`TopicExtractor`] is an instantiable engine: it owns a [`TopicIndex`]
//! behind a `tokio::sync::RwLock` and an [`EventBus`]. Mutations hold the
//! write guard for one document's full commit (or for the rescore and
//! clustering phase of a batch), so readers see either the state before or
//! after a commit. Events are emitted only after the guard is released.

use std::collections::BTreeMap;

use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use topic_types::{Document, ExtractedTopic, TopicCluster};

use crate::config::{ExtractionOptions, TopicsConfig};
use crate::error::TopicsError;
use crate::events::{EventBus, EventHandler, EventKind, SubscriptionId, TopicEvent};
use crate::index::{IndexStats, TopicIndex};
use crate::search::DEFAULT_SEARCH_LIMIT;
use crate::snapshot::Snapshot;

/// Topic extraction engine.
#[derive(Debug)]
pub struct TopicExtractor {
    config: TopicsConfig,
    index: RwLock<TopicIndex>,
    events: EventBus,
}

impl TopicExtractor {
    /// Create an engine with default configuration.
    pub fn new() -> Self {
        let config = TopicsConfig::default();
        Self {
            index: RwLock::new(TopicIndex::new(config.clone())),
            events: EventBus::new(),
            config,
        }
    }

    /// Create an engine with the given configuration.
    pub fn with_config(config: TopicsConfig) -> Result<Self, TopicsError> {
        config.validate()?;
        Ok(Self {
            index: RwLock::new(TopicIndex::new(config.clone())),
            events: EventBus::new(),
            config,
        })
    }

    /// Engine configuration.
    pub fn config(&self) -> &TopicsConfig {
        &self.config
    }

    /// Event channel of this engine.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe to one kind of engine event.
    pub fn subscribe(&self, kind: EventKind, handler: EventHandler) -> SubscriptionId {
        self.events.subscribe(kind, handler)
    }

    /// Remove an event subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Extract topics from one document with the configured default options.
    pub async fn process_document(
        &self,
        document: Document,
    ) -> Result<Vec<ExtractedTopic>, TopicsError> {
        let options = self.config.extraction.clone();
        self.process_document_with(document, &options).await
    }

    /// Extract topics from one document.
    ///
    /// Updates corpus statistics, caches the document's topic list and emits
    /// `TopicsExtracted`. Invalid options or an empty document id are
    /// rejected before any state changes.
    #[instrument(skip(self, document, options), fields(document_id = %document.id))]
    pub async fn process_document_with(
        &self,
        document: Document,
        options: &ExtractionOptions,
    ) -> Result<Vec<ExtractedTopic>, TopicsError> {
        options.validate()?;
        let document_id = document.id.clone();

        let topics = {
            let mut index = self.index.write().await;
            index.index_document(document, options)?
        };

        debug!(topics = topics.len(), "Extracted topics");
        self.events.emit(&TopicEvent::TopicsExtracted {
            document_id,
            topics: topics.clone(),
        });
        Ok(topics)
    }

    /// Process a batch with the configured default options.
    pub async fn process_batch(
        &self,
        documents: Vec<Document>,
    ) -> Result<BTreeMap<String, Vec<ExtractedTopic>>, TopicsError> {
        let options = self.config.extraction.clone();
        self.process_batch_with(documents, &options).await
    }

    /// Process a batch of documents, then rebuild clusters.
    ///
    /// Each document is committed on its own. A document that fails is
    /// logged, reported as an `Error` event and left out of the result.
    /// After the loop every indexed document is rescored against the final
    /// corpus, `TopicsExtracted` is emitted for each batch document and
    /// clusters are rebuilt, followed by `ClusteringComplete`.
    #[instrument(skip(self, documents, options), fields(documents = documents.len()))]
    pub async fn process_batch_with(
        &self,
        documents: Vec<Document>,
        options: &ExtractionOptions,
    ) -> Result<BTreeMap<String, Vec<ExtractedTopic>>, TopicsError> {
        options.validate()?;

        let mut committed: Vec<String> = Vec::with_capacity(documents.len());
        for document in documents {
            let document_id = document.id.clone();
            let outcome = {
                let mut index = self.index.write().await;
                index.index_document(document, options)
            };
            match outcome {
                Ok(_) => {
                    if !committed.contains(&document_id) {
                        committed.push(document_id);
                    }
                }
                Err(e) => {
                    warn!(document_id = %document_id, error = %e, "Skipping document in batch");
                    self.events.emit(&TopicEvent::Error {
                        message: e.to_string(),
                        document_id: Some(document_id),
                    });
                }
            }
        }

        let (results, clusters) = {
            let mut index = self.index.write().await;
            index.rescore_all();
            let clusters = index.rebuild_clusters().to_vec();
            let results: BTreeMap<String, Vec<ExtractedTopic>> = committed
                .iter()
                .map(|id| (id.clone(), index.document_topics(id)))
                .collect();
            (results, clusters)
        };

        for (document_id, topics) in &results {
            self.events.emit(&TopicEvent::TopicsExtracted {
                document_id: document_id.clone(),
                topics: topics.clone(),
            });
        }

        info!(
            processed = results.len(),
            clusters = clusters.len(),
            "Batch processed"
        );
        self.events
            .emit(&TopicEvent::ClusteringComplete { clusters });
        Ok(results)
    }

    /// Topic list of a document, or empty for unknown ids.
    pub async fn get_document_topics(&self, document_id: &str) -> Vec<ExtractedTopic> {
        self.index.read().await.document_topics(document_id)
    }

    /// Clusters from the most recent batch.
    pub async fn get_clusters(&self) -> Vec<TopicCluster> {
        self.index.read().await.clusters().to_vec()
    }

    /// One record per distinct term, ranked by score.
    pub async fn get_topics(&self) -> Vec<ExtractedTopic> {
        self.index.read().await.aggregated_topics()
    }

    /// Rising topics ranked by momentum.
    pub async fn get_trending_topics(&self, limit: Option<usize>) -> Vec<ExtractedTopic> {
        let limit = limit.unwrap_or(self.config.trends.default_limit);
        self.index.read().await.trending_topics(limit)
    }

    /// Search topics by case-insensitive substring.
    pub async fn search_topics(&self, query: &str, limit: Option<usize>) -> Vec<ExtractedTopic> {
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        self.index.read().await.search_topics(query, limit)
    }

    /// Documents whose topic list has a term containing the query.
    pub async fn find_related_documents(&self, term: &str, limit: Option<usize>) -> Vec<Document> {
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        self.index.read().await.related_documents(term, limit)
    }

    /// Summary counts.
    pub async fn stats(&self) -> IndexStats {
        self.index.read().await.stats()
    }

    /// Reset all state and emit `CacheCleared`.
    pub async fn clear_cache(&self) {
        self.index.write().await.clear();
        info!("Topic cache cleared");
        self.events.emit(&TopicEvent::CacheCleared);
    }

    /// Serialize the engine state to JSON.
    pub async fn export_topics(&self) -> Result<String, TopicsError> {
        let snapshot = Snapshot::capture(&*self.index.read().await);
        snapshot.to_json()
    }

    /// Replace the engine state with a serialized snapshot.
    ///
    /// Never fails: malformed or incompatible input is logged, reported as an
    /// `Error` event, and leaves the current state untouched. Returns whether
    /// the snapshot was applied.
    #[instrument(skip(self, json), fields(bytes = json.len()))]
    pub async fn import_topics(&self, json: &str) -> bool {
        let restored = Snapshot::from_json(json).and_then(|snapshot| {
            let timestamp = snapshot.timestamp;
            snapshot
                .restore(self.config.clone())
                .map(|index| (index, timestamp))
        });

        match restored {
            Ok((index, timestamp)) => {
                let stats = index.stats();
                *self.index.write().await = index;
                info!(
                    documents = stats.document_count,
                    topic_lists = stats.topic_list_count,
                    "Imported topics"
                );
                self.events.emit(&TopicEvent::TopicsImported { timestamp });
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to import topics");
                self.events.emit(&TopicEvent::Error {
                    message: format!("Failed to import topics: {e}"),
                    document_id: None,
                });
                false
            }
        }
    }
}

impl Default for TopicExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use topic_types::DocumentType;

    fn doc(id: &str, content: &str) -> Document {
        Document::new(id, content, DocumentType::TechnicalDoc)
    }

    fn record(engine: &TopicExtractor, kind: EventKind) -> Arc<Mutex<Vec<TopicEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        engine.subscribe(
            kind,
            Arc::new(move |event: &TopicEvent| sink.lock().unwrap().push(event.clone())),
        );
        seen
    }

    #[tokio::test]
    async fn test_process_document_emits_event() {
        let engine = TopicExtractor::new();
        let events = record(&engine, EventKind::TopicsExtracted);

        let topics = engine
            .process_document(doc("d1", "Aspera upload failures in production"))
            .await
            .unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0],
            TopicEvent::TopicsExtracted {
                document_id: "d1".to_string(),
                topics,
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_options_leave_state_unchanged() {
        let engine = TopicExtractor::new();
        let options = ExtractionOptions::default().with_min_score(-1.0);

        let result = engine
            .process_document_with(doc("d1", "glacier archive"), &options)
            .await;

        assert!(matches!(result, Err(TopicsError::InvalidConfig(_))));
        assert_eq!(engine.stats().await.document_count, 0);
    }

    #[tokio::test]
    async fn test_batch_isolates_failures() {
        let engine = TopicExtractor::new();
        let errors = record(&engine, EventKind::Error);
        let completed = record(&engine, EventKind::ClusteringComplete);

        let results = engine
            .process_batch(vec![
                doc("d1", "error handling failures"),
                doc("", "orphan content"),
                doc("d2", "latency performance tuning"),
            ])
            .await
            .unwrap();

        assert_eq!(results.keys().collect::<Vec<_>>(), vec!["d1", "d2"]);
        assert_eq!(errors.lock().unwrap().len(), 1);
        assert_eq!(completed.lock().unwrap().len(), 1);
        assert!(!engine.get_clusters().await.is_empty());
    }

    #[tokio::test]
    async fn test_batch_results_match_cached_topics() {
        let engine = TopicExtractor::new();
        let results = engine
            .process_batch(vec![
                doc("d1", "common unique"),
                doc("d2", "common different"),
            ])
            .await
            .unwrap();

        assert_eq!(results["d1"], engine.get_document_topics("d1").await);
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let engine = TopicExtractor::new();
        let cleared = record(&engine, EventKind::CacheCleared);
        engine
            .process_batch(vec![doc("d1", "aspera"), doc("d2", "glacier")])
            .await
            .unwrap();

        engine.clear_cache().await;

        assert!(engine.get_document_topics("d1").await.is_empty());
        assert!(engine.get_clusters().await.is_empty());
        assert!(engine.get_topics().await.is_empty());
        assert_eq!(engine.stats().await, IndexStats::default());
        assert_eq!(cleared.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_import_malformed_keeps_state() {
        let engine = TopicExtractor::new();
        let errors = record(&engine, EventKind::Error);
        engine
            .process_document(doc("d1", "aspera glacier"))
            .await
            .unwrap();
        let before = engine.get_document_topics("d1").await;

        assert!(!engine.import_topics("{ definitely not json").await);

        assert_eq!(engine.get_document_topics("d1").await, before);
        assert_eq!(errors.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_export_import_round_trip() {
        let source = TopicExtractor::new();
        source
            .process_batch(vec![
                doc("d1", "aspera upload failures"),
                doc("d2", "metadata validation workflow"),
            ])
            .await
            .unwrap();
        let json = source.export_topics().await.unwrap();

        let target = TopicExtractor::new();
        let imported = record(&target, EventKind::TopicsImported);
        assert!(target.import_topics(&json).await);

        for id in ["d1", "d2"] {
            assert_eq!(
                target.get_document_topics(id).await,
                source.get_document_topics(id).await
            );
        }
        assert_eq!(target.get_clusters().await, source.get_clusters().await);
        assert_eq!(imported.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_handler_can_call_back_into_engine() {
        let engine = Arc::new(TopicExtractor::new());
        let inner = Arc::clone(&engine);
        let observed = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&observed);
        engine.subscribe(
            EventKind::TopicsExtracted,
            Arc::new(move |_: &TopicEvent| {
                *sink.lock().unwrap() = Some(inner.index.try_read().is_ok());
            }),
        );

        engine.process_document(doc("d1", "aspera")).await.unwrap();
        assert_eq!(*observed.lock().unwrap(), Some(true));
    }

    #[test]
    fn test_with_config_validates() {
        let mut config = TopicsConfig::default();
        config.extraction.max_terms = 0;
        assert!(TopicExtractor::with_config(config).is_err());
    }
}
