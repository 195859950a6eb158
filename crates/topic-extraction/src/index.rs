//! Cumulative topic index.
//!
//! [`TopicIndex`] owns every piece of engine state: the indexed documents
//! with their term frequencies, corpus statistics, the per-document topic
//! lists and the current clusters. It is synchronous; the engine wraps it in
//! a lock and exposes it asynchronously.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use topic_types::{Document, ExtractedTopic, TopicCluster, Trend};
use tracing::{debug, instrument};

use crate::categorizer::Categorizer;
use crate::clustering::{jaccard, ClusterBuilder};
use crate::config::{ExtractionOptions, TopicsConfig};
use crate::error::TopicsError;
use crate::lexicon::DomainLexicon;
use crate::search;
use crate::tfidf::TfIdf;
use crate::tokenizer::extract_terms;
use crate::trends::{TrendTracker, TrendWindows};

/// A document as held by the index.
///
/// Term frequencies are kept so the document can be rescored whenever the
/// corpus changes; options are the ones it was processed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub document: Document,
    pub term_frequencies: BTreeMap<String, f64>,
    #[serde(default)]
    pub options: ExtractionOptions,
}

/// Summary counts for the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Documents contributing to corpus statistics
    pub document_count: usize,
    /// Distinct terms across the corpus
    pub term_count: usize,
    /// Documents with a cached topic list
    pub topic_list_count: usize,
    /// Current clusters
    pub cluster_count: usize,
}

/// Synchronous engine state.
#[derive(Debug, Clone)]
pub struct TopicIndex {
    config: TopicsConfig,
    lexicon: DomainLexicon,
    categorizer: Categorizer,
    trends: TrendTracker,
    clusterer: ClusterBuilder,
    stats: TfIdf,
    documents: BTreeMap<String, IndexedDocument>,
    topic_cache: BTreeMap<String, Vec<ExtractedTopic>>,
    clusters: Vec<TopicCluster>,
}

impl TopicIndex {
    /// Create an empty index.
    pub fn new(config: TopicsConfig) -> Self {
        Self {
            lexicon: DomainLexicon::new(&config.scoring),
            categorizer: Categorizer::new(),
            trends: TrendTracker::new(config.trends.clone()),
            clusterer: ClusterBuilder::new(config.clustering.clone()),
            stats: TfIdf::new(),
            documents: BTreeMap::new(),
            topic_cache: BTreeMap::new(),
            clusters: Vec::new(),
            config,
        }
    }

    /// Configuration this index was built with.
    pub fn config(&self) -> &TopicsConfig {
        &self.config
    }

    /// Tokenize, count and commit a document, returning its topics.
    ///
    /// A document id that is already indexed is replaced; its previous
    /// contribution to document frequencies is retracted first. The stored
    /// timestamp is truncated to milliseconds, the precision of snapshots.
    #[instrument(skip(self, document, options), fields(document_id = %document.id))]
    pub fn index_document(
        &mut self,
        mut document: Document,
        options: &ExtractionOptions,
    ) -> Result<Vec<ExtractedTopic>, TopicsError> {
        document.validate()?;
        options.validate()?;
        document.timestamp = document.timestamp.trunc_subsecs(3);

        let terms = extract_terms(&document.content, options);
        let term_frequencies = TfIdf::term_frequencies(&terms);

        let id = document.id.clone();
        if let Some(previous) = self.documents.remove(&id) {
            debug!("Replacing previously indexed document");
            self.stats
                .remove_document(&id, previous.term_frequencies.keys());
        }
        self.stats.add_document(&id, term_frequencies.keys());
        self.documents.insert(
            id.clone(),
            IndexedDocument {
                document,
                term_frequencies,
                options: options.clone(),
            },
        );

        let windows = self.trend_windows();
        let topics = self.build_document_topics(&id, &windows);
        debug!(
            terms = terms.len(),
            topics = topics.len(),
            "Indexed document"
        );
        self.topic_cache.insert(id, topics.clone());
        Ok(topics)
    }

    /// Recompute every document's topic list against the current corpus.
    #[instrument(skip(self), fields(documents = self.documents.len()))]
    pub fn rescore_all(&mut self) {
        let windows = self.trend_windows();
        let rescored: Vec<(String, Vec<ExtractedTopic>)> = self
            .documents
            .keys()
            .map(|id| (id.clone(), self.build_document_topics(id, &windows)))
            .collect();
        self.topic_cache.extend(rescored);
    }

    /// Rebuild clusters from scratch over the aggregated topics.
    pub fn rebuild_clusters(&mut self) -> &[TopicCluster] {
        let candidates = self.aggregated_topics();
        let documents = &self.documents;
        self.clusters = self
            .clusterer
            .build(&candidates, |id| documents.get(id).map(|d| &d.document));
        &self.clusters
    }

    /// Score, filter and rank the topics of one indexed document.
    fn build_document_topics(&self, doc_id: &str, windows: &TrendWindows) -> Vec<ExtractedTopic> {
        let Some(indexed) = self.documents.get(doc_id) else {
            return Vec::new();
        };
        let options = &indexed.options;

        let mut ranked: Vec<(&String, f64, f64)> = indexed
            .term_frequencies
            .iter()
            .map(|(term, &tf)| {
                let score = self.stats.score(term, tf) * self.lexicon.boost_for(term);
                (term, score, tf)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let context = self
            .categorizer
            .context_category(indexed.term_frequencies.keys().map(String::as_str));

        ranked
            .iter()
            .filter(|(_, score, _)| *score >= options.min_score)
            .take(options.max_terms)
            .map(|&(term, score, frequency)| {
                let document_ids = self.document_ids_for(term, doc_id);
                let timestamp = indexed.document.timestamp;
                let (first_seen_at, last_seen_at) = self
                    .seen_range(&document_ids)
                    .unwrap_or((timestamp, timestamp));
                ExtractedTopic {
                    term: term.clone(),
                    score,
                    frequency,
                    category: self.categorizer.categorize_with(term, context),
                    related_terms: self.related_terms(term, &ranked),
                    trend: windows.trend_of(&document_ids),
                    document_ids,
                    first_seen_at,
                    last_seen_at,
                }
            })
            .collect()
    }

    /// Other terms of the same document whose document sets overlap the term's.
    fn related_terms(&self, term: &str, ranked: &[(&String, f64, f64)]) -> Vec<String> {
        let Some(own) = self.stats.documents_for(term) else {
            return Vec::new();
        };
        ranked
            .iter()
            .filter(|(other, _, _)| other.as_str() != term)
            .filter(|(other, _, _)| {
                self.stats
                    .documents_for(other)
                    .is_some_and(|docs| jaccard(own, docs) > self.config.related.similarity_threshold)
            })
            .take(self.config.related.max_related)
            .map(|(other, _, _)| (*other).clone())
            .collect()
    }

    fn document_ids_for(&self, term: &str, fallback: &str) -> BTreeSet<String> {
        self.stats
            .documents_for(term)
            .cloned()
            .unwrap_or_else(|| BTreeSet::from([fallback.to_string()]))
    }

    /// Earliest and latest timestamps among the given documents.
    fn seen_range(&self, document_ids: &BTreeSet<String>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        document_ids
            .iter()
            .filter_map(|id| self.documents.get(id))
            .map(|d| d.document.timestamp)
            .fold(None, |range, ts| match range {
                None => Some((ts, ts)),
                Some((first, last)) => Some((ts.min(first), ts.max(last))),
            })
    }

    fn trend_windows(&self) -> TrendWindows {
        self.trends.windows(
            self.documents
                .iter()
                .map(|(id, d)| (id.as_str(), d.document.timestamp)),
        )
    }

    /// Bring a cached topic's attribution up to date with the corpus.
    fn refresh(&self, topic: &mut ExtractedTopic) {
        let Some(ids) = self.stats.documents_for(&topic.term) else {
            return;
        };
        topic.document_ids = ids.clone();
        if let Some((first, last)) = self.seen_range(ids) {
            topic.first_seen_at = first;
            topic.last_seen_at = last;
        }
    }

    /// Topic list of a document, or empty for unknown ids.
    pub fn document_topics(&self, doc_id: &str) -> Vec<ExtractedTopic> {
        let Some(cached) = self.topic_cache.get(doc_id) else {
            return Vec::new();
        };
        cached
            .iter()
            .cloned()
            .map(|mut topic| {
                self.refresh(&mut topic);
                topic
            })
            .collect()
    }

    /// One record per distinct term across all cached topic lists.
    ///
    /// Each record carries the term's highest per-document score together
    /// with the category and related terms from that document.
    pub fn aggregated_topics(&self) -> Vec<ExtractedTopic> {
        let windows = self.trend_windows();
        let mut merged: BTreeMap<&str, ExtractedTopic> = BTreeMap::new();

        for topic in self.topic_cache.values().flatten() {
            match merged.get_mut(topic.term.as_str()) {
                Some(existing) => {
                    existing.document_ids.extend(topic.document_ids.iter().cloned());
                    existing.first_seen_at = existing.first_seen_at.min(topic.first_seen_at);
                    existing.last_seen_at = existing.last_seen_at.max(topic.last_seen_at);
                    if topic.score > existing.score {
                        existing.score = topic.score;
                        existing.frequency = topic.frequency;
                        existing.category = topic.category;
                        existing.related_terms = topic.related_terms.clone();
                    }
                }
                None => {
                    merged.insert(topic.term.as_str(), topic.clone());
                }
            }
        }

        let mut topics: Vec<ExtractedTopic> = merged
            .into_values()
            .map(|mut topic| {
                self.refresh(&mut topic);
                if windows.is_active() {
                    topic.trend = windows.trend_of(&topic.document_ids);
                }
                topic
            })
            .collect();
        topics.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.term.cmp(&b.term)));
        topics
    }

    /// Rising topics ranked by momentum, then score, then term.
    pub fn trending_topics(&self, limit: usize) -> Vec<ExtractedTopic> {
        let windows = self.trend_windows();
        if !windows.is_active() {
            return Vec::new();
        }

        let mut rising: Vec<(f64, ExtractedTopic)> = self
            .aggregated_topics()
            .into_iter()
            .filter(|t| t.trend == Trend::Rising)
            .map(|t| (windows.momentum(&t.document_ids), t))
            .collect();
        rising.sort_by(|a, b| {
            b.0.total_cmp(&a.0)
                .then_with(|| b.1.score.total_cmp(&a.1.score))
                .then_with(|| a.1.term.cmp(&b.1.term))
        });
        rising.into_iter().take(limit).map(|(_, t)| t).collect()
    }

    /// Search the aggregated topics.
    pub fn search_topics(&self, query: &str, limit: usize) -> Vec<ExtractedTopic> {
        search::search_topics(&self.aggregated_topics(), query, limit)
    }

    /// Stored documents whose topic list has a term containing the query.
    ///
    /// Documents known only from a topics-only snapshot are skipped.
    pub fn related_documents(&self, query: &str, limit: usize) -> Vec<Document> {
        search::related_document_ids(
            self.topic_cache
                .iter()
                .filter(|(id, _)| self.documents.contains_key(id.as_str())),
            query,
            limit,
        )
        .into_iter()
        .filter_map(|id| self.documents.get(id))
        .map(|d| d.document.clone())
        .collect()
    }

    /// Current clusters.
    pub fn clusters(&self) -> &[TopicCluster] {
        &self.clusters
    }

    /// Indexed documents keyed by id.
    pub fn documents(&self) -> &BTreeMap<String, IndexedDocument> {
        &self.documents
    }

    /// Cached per-document topic lists.
    pub fn topic_lists(&self) -> &BTreeMap<String, Vec<ExtractedTopic>> {
        &self.topic_cache
    }

    /// Summary counts.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            document_count: self.stats.doc_count(),
            term_count: self.stats.term_count(),
            topic_list_count: self.topic_cache.len(),
            cluster_count: self.clusters.len(),
        }
    }

    /// Drop all state.
    pub fn clear(&mut self) {
        self.stats = TfIdf::new();
        self.documents.clear();
        self.topic_cache.clear();
        self.clusters.clear();
    }

    /// Build an index from restored parts, rebuilding corpus statistics.
    pub(crate) fn restore(
        config: TopicsConfig,
        documents: Vec<IndexedDocument>,
        topic_lists: BTreeMap<String, Vec<ExtractedTopic>>,
        clusters: Vec<TopicCluster>,
    ) -> Result<Self, TopicsError> {
        let mut index = Self::new(config);
        for indexed in documents {
            indexed.document.validate()?;
            let id = indexed.document.id.clone();
            if index.documents.contains_key(&id) {
                return Err(TopicsError::InvalidInput(format!(
                    "duplicate document id in snapshot: {id}"
                )));
            }
            index.stats.add_document(&id, indexed.term_frequencies.keys());
            index.documents.insert(id, indexed);
        }
        index.topic_cache = topic_lists;
        index.clusters = clusters;
        Ok(index)
    }
}

impl Default for TopicIndex {
    fn default() -> Self {
        Self::new(TopicsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use topic_types::{Category, DocumentType};

    fn doc(id: &str, content: &str) -> Document {
        Document::new(id, content, DocumentType::TechnicalDoc)
    }

    fn terms(topics: &[ExtractedTopic]) -> Vec<&str> {
        topics.iter().map(|t| t.term.as_str()).collect()
    }

    #[test]
    fn test_index_document_attribution() {
        let mut index = TopicIndex::default();
        let topics = index
            .index_document(
                doc("d1", "Aspera uploads fail when the glacier archive is busy"),
                &ExtractionOptions::default(),
            )
            .unwrap();

        assert!(!topics.is_empty());
        for topic in &topics {
            assert!(topic.has_document("d1"));
            assert!(topic.score >= 0.0);
        }
    }

    #[test]
    fn test_empty_id_rejected_without_state_change() {
        let mut index = TopicIndex::default();
        let result = index.index_document(doc("", "content here"), &ExtractionOptions::default());
        assert!(matches!(result, Err(TopicsError::Types(_))));
        assert_eq!(index.stats().document_count, 0);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let mut index = TopicIndex::default();
        let options = ExtractionOptions::default().with_max_terms(0);
        let result = index.index_document(doc("d1", "content here"), &options);
        assert!(matches!(result, Err(TopicsError::InvalidConfig(_))));
        assert!(index.documents().is_empty());
    }

    #[test]
    fn test_max_terms_trims_output_only() {
        let mut index = TopicIndex::default();
        let options = ExtractionOptions::default().with_max_terms(2);
        let topics = index
            .index_document(
                doc("d1", "alpha bravo charlie delta echo foxtrot"),
                &options,
            )
            .unwrap();

        assert_eq!(topics.len(), 2);
        assert_eq!(index.stats().term_count, 6);
    }

    #[test]
    fn test_min_score_filters() {
        let mut index = TopicIndex::default();
        // Domain terms score 1.5 in a single-document corpus; others 1.0.
        let options = ExtractionOptions::default().with_min_score(1.2);
        let topics = index
            .index_document(doc("d1", "aspera transfer"), &options)
            .unwrap();
        assert_eq!(terms(&topics), vec!["aspera"]);
    }

    #[test]
    fn test_ranking_order_and_domain_boost() {
        let mut index = TopicIndex::default();
        let topics = index
            .index_document(
                doc("d1", "metadata schema metadata table schema metadata"),
                &ExtractionOptions::default(),
            )
            .unwrap();
        assert_eq!(terms(&topics), vec!["metadata", "schema", "table"]);
        assert!((topics[0].score - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_reprocessing_retracts_previous_terms() {
        let mut index = TopicIndex::default();
        let options = ExtractionOptions::default();
        index.index_document(doc("d1", "glacier archive"), &options).unwrap();
        index.index_document(doc("d1", "lambda deployment"), &options).unwrap();

        assert_eq!(index.stats().document_count, 1);
        assert!(index.search_topics("glacier", 10).is_empty());
        let topics = index.document_topics("d1");
        assert_eq!(terms(&topics), vec!["deployment", "lambda"]);
    }

    #[test]
    fn test_document_topics_refresh_attribution() {
        let mut index = TopicIndex::default();
        let options = ExtractionOptions::default();
        index.index_document(doc("d1", "glacier restore"), &options).unwrap();
        index.index_document(doc("d2", "glacier archive"), &options).unwrap();

        let topics = index.document_topics("d1");
        let glacier = topics.iter().find(|t| t.term == "glacier").unwrap();
        let expected: BTreeSet<String> = ["d1", "d2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(glacier.document_ids, expected);
    }

    #[test]
    fn test_timestamps_stored_at_millisecond_precision() {
        let mut index = TopicIndex::default();
        let document = Document {
            id: "d1".to_string(),
            content: "glacier archive".to_string(),
            title: String::new(),
            doc_type: DocumentType::TechnicalDoc,
            timestamp: Utc.timestamp_nanos(1_700_000_000_123_456_789),
            source: String::new(),
            metadata: Default::default(),
        };
        let topics = index
            .index_document(document, &ExtractionOptions::default())
            .unwrap();

        let expected = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(index.documents()["d1"].document.timestamp, expected);
        assert!(topics.iter().all(|t| t.first_seen_at == expected));
    }

    #[test]
    fn test_unknown_document_is_empty() {
        let index = TopicIndex::default();
        assert!(index.document_topics("nonexistent").is_empty());
    }

    #[test]
    fn test_rescore_applies_corpus_idf() {
        let mut index = TopicIndex::default();
        let options = ExtractionOptions::default();
        index.index_document(doc("d1", "common unique"), &options).unwrap();
        index.index_document(doc("d2", "common different"), &options).unwrap();
        index.index_document(doc("d3", "common another"), &options).unwrap();
        index.rescore_all();

        let topics = index.document_topics("d1");
        let score = |term: &str| topics.iter().find(|t| t.term == term).unwrap().score;
        assert!(score("unique") > score("common"));
    }

    #[test]
    fn test_related_terms_from_same_documents() {
        let mut index = TopicIndex::default();
        let options = ExtractionOptions::default();
        index.index_document(doc("d1", "oauth token refresh"), &options).unwrap();
        index.index_document(doc("d2", "oauth token expiry"), &options).unwrap();
        index.index_document(doc("d3", "quarterly report"), &options).unwrap();
        index.rescore_all();

        let topics = index.document_topics("d1");
        let oauth = topics.iter().find(|t| t.term == "oauth").unwrap();
        assert!(oauth.related_terms.contains(&"token".to_string()));
        assert!(!oauth.related_terms.contains(&"oauth".to_string()));
        assert!(oauth.related_terms.len() <= 5);
    }

    #[test]
    fn test_rebuild_clusters_partitions_candidates() {
        let mut index = TopicIndex::default();
        let options = ExtractionOptions::default();
        index
            .index_document(doc("d1", "error exception failures crash"), &options)
            .unwrap();
        index
            .index_document(doc("d2", "latency throughput performance slow"), &options)
            .unwrap();
        index.rescore_all();
        let clusters = index.rebuild_clusters().to_vec();

        assert!(!clusters.is_empty());
        let member_count: usize = clusters.iter().map(|c| c.member_terms.len()).sum();
        assert_eq!(member_count, index.aggregated_topics().len());
        assert!(clusters
            .iter()
            .any(|c| c.representative_category == Category::Error));
        assert!(clusters
            .iter()
            .any(|c| c.representative_category == Category::Performance));
    }

    #[test]
    fn test_trending_requires_time_span() {
        let mut index = TopicIndex::default();
        let options = ExtractionOptions::default();
        let now = Utc::now();
        index
            .index_document(doc("d1", "legacy mainframe").with_timestamp(now), &options)
            .unwrap();
        index
            .index_document(doc("d2", "legacy mainframe").with_timestamp(now), &options)
            .unwrap();
        assert!(index.trending_topics(10).is_empty());
    }

    #[test]
    fn test_trending_with_recency_skew() {
        let mut index = TopicIndex::default();
        let options = ExtractionOptions::default();
        let now = Utc::now();
        for (i, age_days) in [30, 29, 28].iter().enumerate() {
            index
                .index_document(
                    doc(&format!("old-{i}"), "mainframe batch report")
                        .with_timestamp(now - Duration::days(*age_days)),
                    &options,
                )
                .unwrap();
        }
        for i in 0..3 {
            index
                .index_document(
                    doc(&format!("new-{i}"), "aspera transfer")
                        .with_timestamp(now - Duration::hours(i)),
                    &options,
                )
                .unwrap();
        }
        index.rescore_all();

        let trending = index.trending_topics(10);
        let trending_terms = terms(&trending);
        assert!(trending_terms.contains(&"aspera"));
        assert!(trending_terms.contains(&"transfer"));
        assert!(!trending_terms.contains(&"mainframe"));
        assert!(index.trending_topics(1).len() == 1);
    }

    #[test]
    fn test_related_documents_skips_unstored() {
        let mut topic_lists = BTreeMap::new();
        topic_lists.insert(
            "ghost".to_string(),
            vec![ExtractedTopic {
                term: "aspera".to_string(),
                score: 1.0,
                frequency: 1.0,
                category: Category::Technical,
                related_terms: Vec::new(),
                document_ids: BTreeSet::from(["ghost".to_string()]),
                first_seen_at: Utc::now(),
                last_seen_at: Utc::now(),
                trend: Trend::Stable,
            }],
        );
        let index =
            TopicIndex::restore(TopicsConfig::default(), Vec::new(), topic_lists, Vec::new())
                .unwrap();

        assert_eq!(index.document_topics("ghost").len(), 1);
        assert!(index.related_documents("aspera", 10).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut index = TopicIndex::default();
        index
            .index_document(doc("d1", "aspera glacier"), &ExtractionOptions::default())
            .unwrap();
        index.rebuild_clusters();
        index.clear();

        assert_eq!(index.stats(), IndexStats::default());
        assert!(index.document_topics("d1").is_empty());
        assert!(index.clusters().is_empty());
    }
}
