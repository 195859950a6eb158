//! Engine state snapshots.
//!
//! A snapshot is a self-describing JSON document holding the stored
//! documents with their term frequencies, the per-document topic lists and
//! the clusters. Corpus statistics are rebuilt from the documents on import,
//! so a restored engine keeps scoring new documents consistently.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use topic_types::{ExtractedTopic, TopicCluster};

use crate::config::TopicsConfig;
use crate::error::TopicsError;
use crate::index::{IndexedDocument, TopicIndex};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serialized engine state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version
    #[serde(default = "default_version")]
    pub version: u32,

    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Stored documents; absent in topics-only snapshots
    #[serde(default)]
    pub documents: Vec<IndexedDocument>,

    /// Per-document topic lists
    pub topics: BTreeMap<String, Vec<ExtractedTopic>>,

    /// Clusters from the last batch
    pub clusters: Vec<TopicCluster>,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

impl Snapshot {
    /// Capture the state of an index.
    pub fn capture(index: &TopicIndex) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            timestamp: Utc::now(),
            documents: index.documents().values().cloned().collect(),
            topics: index.topic_lists().clone(),
            clusters: index.clusters().to_vec(),
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, TopicsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON without validating contents.
    pub fn from_json(json: &str) -> Result<Self, TopicsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the snapshot and build a fresh index from it.
    pub fn restore(self, config: TopicsConfig) -> Result<TopicIndex, TopicsError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(TopicsError::UnsupportedVersion(self.version));
        }

        for (doc_id, topics) in &self.topics {
            if doc_id.trim().is_empty() {
                return Err(TopicsError::InvalidInput(
                    "snapshot topic list has an empty document id".to_string(),
                ));
            }
            if let Some(topic) = topics
                .iter()
                .find(|t| t.term.is_empty() || !t.score.is_finite() || t.score < 0.0)
            {
                return Err(TopicsError::InvalidInput(format!(
                    "invalid topic {:?} for document {doc_id}",
                    topic.term
                )));
            }
        }

        if let Some(indexed) = self.documents.iter().find(|d| {
            d.term_frequencies
                .values()
                .any(|tf| !tf.is_finite() || *tf < 0.0)
        }) {
            return Err(TopicsError::InvalidInput(format!(
                "invalid term frequencies for document {}",
                indexed.document.id
            )));
        }

        TopicIndex::restore(config, self.documents, self.topics, self.clusters)
    }
}
